//! Audio capture and WAV I/O.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod source;
pub mod wav;
