//! Command-line interface for voiceid
//!
//! Provides argument parsing using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Speaker enrollment and live identification
#[derive(Parser, Debug)]
#[command(
    name = "voiceid",
    version,
    about = "Speaker enrollment and live identification"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// List available audio input devices and exit
    #[arg(long)]
    pub show_audio_devices: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Options shared by the enroll and test commands.
#[derive(Args, Debug)]
pub struct EngineArgs {
    /// Access key for vendor engines (ignored by the built-in energy engine)
    #[arg(long, value_name = "KEY")]
    pub access_key: Option<String>,

    /// Path to a vendor engine model file
    #[arg(long, value_name = "PATH")]
    pub model_path: Option<PathBuf>,

    /// Path to a vendor engine dynamic library
    #[arg(long, value_name = "PATH")]
    pub library_path: Option<PathBuf>,

    /// Audio input device name (see --show-audio-devices)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Save all recorded session audio to the given WAV file
    #[arg(long, value_name = "PATH")]
    pub output_audio: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enroll a new speaker profile from the microphone
    Enroll {
        #[command(flatten)]
        engine: EngineArgs,

        /// Output file for the created speaker profile
        #[arg(long, value_name = "PATH")]
        output_profile: PathBuf,
    },

    /// Identify enrolled speakers live and export their speech segments
    Test {
        #[command(flatten)]
        engine: EngineArgs,

        /// Speaker profile file(s); the file stem becomes the speaker label
        #[arg(long, value_name = "PATH", num_args = 1.., required = true)]
        input_profiles: Vec<PathBuf>,

        /// Minimum duration for a speech segment to be exported.
        /// Accepts bare seconds ("4", "2.5") or humantime ("4s", "1m30s").
        /// Overrides the configuration file; the built-in default is 4s
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
        min_speech_duration: Option<Duration>,

        /// Include the frame that activates a speaker in the exported
        /// segment (historical behavior drops it)
        #[arg(long)]
        include_activation_frame: bool,

        /// Directory segment WAV files are written to
        #[arg(long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
    },
}

/// Parse a duration argument.
///
/// Supports bare numbers (seconds, fractional allowed) and any format
/// accepted by `humantime` (`30s`, `5m`, `1m30s`).
fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<f64>() {
        if !secs.is_finite() || secs < 0.0 {
            return Err("duration must be a non-negative number".to_string());
        }
        // try_from rejects values too large to represent as a Duration
        return Duration::try_from_secs_f64(secs)
            .map_err(|_| "duration is too large".to_string());
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_seconds() {
        assert_eq!(parse_duration_arg("4"), Ok(Duration::from_secs(4)));
        assert_eq!(
            parse_duration_arg("2.5"),
            Ok(Duration::from_secs_f64(2.5))
        );
    }

    #[test]
    fn parse_humantime_formats() {
        assert_eq!(parse_duration_arg("4s"), Ok(Duration::from_secs(4)));
        assert_eq!(parse_duration_arg("1m30s"), Ok(Duration::from_secs(90)));
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert!(parse_duration_arg("-1").is_err());
        assert!(parse_duration_arg("soon").is_err());
    }

    #[test]
    fn parse_rejects_durations_too_large_to_represent() {
        // Finite but beyond what Duration can hold; must error, not panic
        assert_eq!(
            parse_duration_arg("1e300"),
            Err("duration is too large".to_string())
        );
        assert!(parse_duration_arg(&f64::MAX.to_string()).is_err());
    }

    #[test]
    fn enroll_requires_output_profile() {
        let result = Cli::try_parse_from(["voiceid", "enroll"]);
        assert!(result.is_err());
    }

    #[test]
    fn enroll_parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "voiceid",
            "enroll",
            "--output-profile",
            "alice.profile",
            "--device",
            "pipewire",
            "--output-audio",
            "enroll.wav",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Enroll {
                engine,
                output_profile,
            }) => {
                assert_eq!(output_profile, PathBuf::from("alice.profile"));
                assert_eq!(engine.device.as_deref(), Some("pipewire"));
                assert_eq!(engine.output_audio, Some(PathBuf::from("enroll.wav")));
            }
            other => panic!("Expected enroll command, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_multiple_profiles_and_duration() {
        let cli = Cli::try_parse_from([
            "voiceid",
            "test",
            "--input-profiles",
            "alice.profile",
            "bob.profile",
            "--min-speech-duration",
            "2s",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Test {
                input_profiles,
                min_speech_duration,
                include_activation_frame,
                output_dir,
                ..
            }) => {
                assert_eq!(input_profiles.len(), 2);
                assert_eq!(min_speech_duration, Some(Duration::from_secs(2)));
                assert!(!include_activation_frame);
                assert_eq!(output_dir, PathBuf::from("."));
            }
            other => panic!("Expected test command, got {:?}", other),
        }
    }

    #[test]
    fn test_requires_input_profiles() {
        let result = Cli::try_parse_from(["voiceid", "test"]);
        assert!(result.is_err());
    }

    #[test]
    fn min_speech_duration_falls_back_to_config() {
        let cli = Cli::try_parse_from(["voiceid", "test", "--input-profiles", "a.profile"])
            .unwrap();
        match cli.command {
            Some(Commands::Test {
                min_speech_duration,
                ..
            }) => assert_eq!(min_speech_duration, None),
            other => panic!("Expected test command, got {:?}", other),
        }
    }

    #[test]
    fn show_audio_devices_flag_without_command() {
        let cli = Cli::try_parse_from(["voiceid", "--show-audio-devices"]).unwrap();
        assert!(cli.show_audio_devices);
        assert!(cli.command.is_none());
    }
}
