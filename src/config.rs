//! TOML configuration with environment overrides.

use crate::defaults;
use crate::error::{Result, VoiceIdError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub engine: EngineConfig,
    pub segmenter: SegmenterSettings,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// External engine configuration, forwarded to vendor engines.
///
/// The built-in energy engine ignores these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub model_path: Option<PathBuf>,
    pub library_path: Option<PathBuf>,
}

/// Speech segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterSettings {
    /// Segments must be strictly longer than this (seconds) to be exported.
    pub min_speech_duration_secs: f64,
    /// Buffer the frame that activates a speaker (historical behavior drops it).
    pub include_activation_frame: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            min_speech_duration_secs: defaults::MIN_SPEECH_DURATION_SECS,
            include_activation_frame: false,
        }
    }
}

impl SegmenterSettings {
    /// `min_speech_duration_secs` as a `Duration`.
    ///
    /// Values `validate` would reject fall back to the built-in default, so
    /// the conversion never panics.
    pub fn min_speech_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_speech_duration_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(defaults::MIN_SPEECH_DURATION_SECS))
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields take default values; invalid TOML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or return defaults when the file does not exist.
    ///
    /// An existing-but-invalid file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(VoiceIdError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Default config path: `~/.config/voiceid/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voiceid")
            .join("config.toml")
    }

    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - `VOICEID_AUDIO_DEVICE` → audio.device
    /// - `VOICEID_MODEL_PATH` → engine.model_path
    /// - `VOICEID_MIN_SPEECH_DURATION` → segmenter.min_speech_duration_secs
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("VOICEID_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(model_path) = std::env::var("VOICEID_MODEL_PATH")
            && !model_path.is_empty()
        {
            self.engine.model_path = Some(PathBuf::from(model_path));
        }

        if let Ok(duration) = std::env::var("VOICEID_MIN_SPEECH_DURATION")
            && let Ok(secs) = duration.parse::<f64>()
            && Duration::try_from_secs_f64(secs).is_ok()
        {
            self.segmenter.min_speech_duration_secs = secs;
        }

        self
    }

    fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(VoiceIdError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        // try_from rejects negative, NaN, infinite, and overflowing values
        if Duration::try_from_secs_f64(self.segmenter.min_speech_duration_secs).is_err() {
            return Err(VoiceIdError::ConfigInvalidValue {
                key: "segmenter.min_speech_duration_secs".to_string(),
                message: "must be a non-negative number of seconds that fits a duration"
                    .to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.device, None);
        assert_eq!(config.segmenter.min_speech_duration_secs, 4.0);
        assert!(!config.segmenter.include_activation_frame);
    }

    #[test]
    fn load_partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[segmenter]\nmin_speech_duration_secs = 2.5\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.segmenter.min_speech_duration_secs, 2.5);
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn load_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "audio = nope").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(VoiceIdError::Config(_))
        ));
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/voiceid.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[audio]\nsample_rate = 0\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(VoiceIdError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn negative_min_speech_duration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[segmenter]\nmin_speech_duration_secs = -1.0\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(VoiceIdError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn overflowing_min_speech_duration_is_rejected() {
        // Finite but too large for a Duration; must be a config error
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[segmenter]\nmin_speech_duration_secs = 1e300\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(VoiceIdError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn env_override_ignores_overflowing_duration() {
        unsafe { std::env::set_var("VOICEID_MIN_SPEECH_DURATION", "1e300") };
        let config = Config::default().with_env_overrides();
        unsafe { std::env::remove_var("VOICEID_MIN_SPEECH_DURATION") };

        assert_eq!(
            config.segmenter.min_speech_duration_secs,
            defaults::MIN_SPEECH_DURATION_SECS
        );
    }

    #[test]
    fn min_speech_duration_conversion_never_panics() {
        let settings = SegmenterSettings {
            min_speech_duration_secs: 2.5,
            include_activation_frame: false,
        };
        assert_eq!(settings.min_speech_duration(), Duration::from_secs_f64(2.5));

        let settings = SegmenterSettings {
            min_speech_duration_secs: 1e300,
            include_activation_frame: false,
        };
        assert_eq!(settings.min_speech_duration(), Duration::from_secs_f64(4.0));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = Config::default();
        config.audio.device = Some("pipewire".to_string());
        config.segmenter.include_activation_frame = true;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
