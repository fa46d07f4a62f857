//! Default configuration constants for voiceid.
//!
//! Shared constants used across configuration types and engines to keep
//! the numbers in one place.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech processing and what the built-in
/// energy engine expects.
pub const SAMPLE_RATE: u32 = 16000;

/// Number of PCM samples per engine frame.
///
/// Recognition and enrollment engines consume fixed-length frames; 512
/// samples is 32ms at 16kHz.
pub const FRAME_LENGTH: usize = 512;

/// Minimum speech segment duration in seconds.
///
/// Segments shorter than this are treated as noise and discarded rather
/// than exported.
pub const MIN_SPEECH_DURATION_SECS: f64 = 4.0;

/// Audio required for a complete enrollment, in seconds.
pub const ENROLL_AUDIO_SECS: u32 = 20;

/// Minimum RMS level for a chunk to count as voiced during enrollment.
///
/// Chunks below this are reported as `NoVoiceFound` and not accumulated.
pub const MIN_VOICE_RMS: f32 = 0.01;

/// RMS level above which enrollment audio is considered clipped.
pub const CLIP_RMS: f32 = 0.35;

/// Refresh interval of the enrollment progress animation in milliseconds.
pub const ANIMATION_INTERVAL_MS: u64 = 100;
