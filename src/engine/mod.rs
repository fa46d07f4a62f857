//! Engine trait seams.
//!
//! The actual speaker scoring and voice enrollment live behind these traits
//! so vendor engines can be plugged in without touching the session code.
//! The crate ships an energy-based reference implementation in
//! [`energy`] and scripted test doubles in [`mock`].

pub mod energy;
pub mod mock;

use crate::error::Result;
use crate::profile::SpeakerProfile;
use crate::segment::SpeakerLabel;
use std::fmt;
use std::path::PathBuf;

/// Options for vendor engine backends, collected from the CLI and the
/// configuration file.
///
/// The built-in energy engine takes none of these; [`EngineOptions::any_set`]
/// lets callers tell the user when they are set but no vendor backend is
/// compiled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub access_key: Option<String>,
    pub model_path: Option<PathBuf>,
    pub library_path: Option<PathBuf>,
}

impl EngineOptions {
    /// Whether any vendor-specific option was given.
    pub fn any_set(&self) -> bool {
        self.access_key.is_some() || self.model_path.is_some() || self.library_path.is_some()
    }
}

/// Build the enrollment engine for the given options.
///
/// Vendor backends hook in here; the energy engine is currently the only
/// compiled-in backend and ignores the vendor options.
pub fn build_enrollment_engine(
    options: &EngineOptions,
    sample_rate: u32,
) -> Result<Box<dyn EnrollmentEngine>> {
    if options.any_set() {
        eprintln!("Vendor engine options are ignored by the built-in energy engine");
    }
    Ok(Box::new(energy::EnergyEnrollment::new(sample_rate)))
}

/// Build the recognition engine for the given options and speaker profiles.
pub fn build_recognition_engine(
    options: &EngineOptions,
    profiles: &[SpeakerProfile],
) -> Result<Box<dyn RecognitionEngine>> {
    if options.any_set() {
        eprintln!("Vendor engine options are ignored by the built-in energy engine");
    }
    Ok(Box::new(energy::EnergyRecognizer::new(profiles)?))
}

/// Feedback code returned per enrollment chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollFeedback {
    AudioOk,
    AudioTooShort,
    UnknownSpeaker,
    NoVoiceFound,
    QualityIssue,
}

impl EnrollFeedback {
    /// Human-readable description, shown next to the progress animation.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AudioOk => "Good audio",
            Self::AudioTooShort => "Insufficient audio length",
            Self::UnknownSpeaker => "Different speaker in audio",
            Self::NoVoiceFound => "No voice found in audio",
            Self::QualityIssue => "Low audio quality due to bad microphone or environment",
        }
    }
}

impl fmt::Display for EnrollFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Live speaker identification engine.
///
/// Consumes fixed-length PCM frames and returns one confidence score per
/// enrolled speaker. Scores above 0.0 mean "speaker present this frame".
pub trait RecognitionEngine: Send {
    /// Enrolled speaker labels, in the order scores are reported.
    fn labels(&self) -> &[SpeakerLabel];

    /// Samples per frame this engine expects.
    fn frame_length(&self) -> usize;

    /// Sample rate the engine expects, in Hz.
    fn sample_rate(&self) -> u32;

    /// Score one frame. Returns one score per label, in label order.
    ///
    /// May fail with [`VoiceIdError::QuotaExceeded`](crate::error::VoiceIdError::QuotaExceeded)
    /// when a vendor engine's processing quota runs out.
    fn score_frame(&mut self, pcm: &[i16]) -> Result<Vec<f32>>;
}

/// Voice profile enrollment engine.
pub trait EnrollmentEngine: Send {
    /// Minimum number of samples to feed per `enroll` call.
    fn min_enroll_samples(&self) -> usize;

    /// Sample rate the engine expects, in Hz.
    fn sample_rate(&self) -> u32;

    /// Feed an audio chunk. Returns the cumulative enrollment percentage
    /// (0 to 100) and a feedback code for the chunk.
    fn enroll(&mut self, pcm: &[i16]) -> Result<(f32, EnrollFeedback)>;

    /// Serialize the enrolled profile for storage.
    fn export_profile(&self) -> Result<Vec<u8>>;
}
