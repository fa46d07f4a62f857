//! Error types for voiceid.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceIdError {
    // Engine errors
    #[error("Failed to initialize engine: {message}")]
    EngineInit { message: String },

    #[error("Engine processing quota reached")]
    QuotaExceeded,

    #[error("Frame length mismatch: expected {expected} samples, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Speaker profile errors
    #[error("Failed to read speaker profile {path}: {message}")]
    ProfileRead { path: String, message: String },

    #[error("Failed to write speaker profile {path}: {message}")]
    ProfileWrite { path: String, message: String },

    #[error("Failed to parse speaker profile '{profile}': {message}")]
    ProfileParse { profile: String, message: String },

    #[error("Cannot export profile: {message}")]
    ProfileExport { message: String },

    // Segment export errors
    #[error("Failed to write segment {path}: {message}")]
    Export { path: String, message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoiceIdError>;
