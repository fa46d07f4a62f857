//! voiceid - Speaker enrollment and live identification for the command line
//!
//! Enroll speaker profiles from the microphone, then identify who is talking
//! live and export their speech segments as WAV files.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod animation;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod output;
pub mod profile;
pub mod segment;
pub mod session;

// Core traits (capture → score → segment)
pub use audio::source::AudioSource;
pub use engine::{EnrollFeedback, EnrollmentEngine, RecognitionEngine};

// Segmentation
pub use segment::{Clock, SegmentExport, Segmenter, SegmenterConfig, SpeakerLabel, SystemClock};

// Sessions
pub use session::{run_enroll, run_test, EnrollOptions, EnrollOutcome, TestOptions, TestSummary};

// Error handling
pub use error::{Result, VoiceIdError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_has_no_whitespace() {
        assert!(!version_string().contains(char::is_whitespace));
    }
}
