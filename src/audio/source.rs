//! Audio source abstraction.

use crate::error::{Result, VoiceIdError};

/// Trait for audio capture devices.
///
/// Allows swapping implementations (real microphone vs mock or file-backed
/// source in tests).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever 16-bit PCM samples the source has buffered.
    ///
    /// An empty vector means no samples are available yet (live sources) or
    /// that the source is exhausted (finite sources).
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// Whether the source eventually runs out of samples.
    ///
    /// Live microphones return false; pre-recorded sources return true so
    /// session loops know an empty read means end of input.
    fn is_finite(&self) -> bool {
        false
    }
}

/// Accumulates variable-length sample reads and hands out fixed-length
/// engine frames.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    samples: Vec<i16>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append captured samples.
    pub fn push(&mut self, samples: &[i16]) {
        self.samples.extend_from_slice(samples);
    }

    /// Take the next frame of `frame_length` samples, if enough are buffered.
    pub fn pop_frame(&mut self, frame_length: usize) -> Option<Vec<i16>> {
        if self.samples.len() < frame_length {
            return None;
        }
        let frame = self.samples.drain(..frame_length).collect();
        Some(frame)
    }

    /// Number of samples currently buffered.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Mock audio source for tests.
///
/// Plays back a fixed sample sequence in configurable read-sized chunks and
/// then reports exhaustion.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    samples: Vec<i16>,
    position: usize,
    read_size: usize,
    is_started: bool,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            position: 0,
            read_size: 512,
            is_started: false,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the samples the mock plays back.
    pub fn with_samples(mut self, samples: Vec<i16>) -> Self {
        self.samples = samples;
        self
    }

    /// Configure how many samples each read returns.
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(VoiceIdError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(VoiceIdError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }
        let end = (self.position + self.read_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }

    fn is_finite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_holds_partial_frames() {
        let mut buf = FrameBuffer::new();
        buf.push(&[1, 2, 3]);
        assert_eq!(buf.pop_frame(4), None);
        buf.push(&[4, 5]);
        assert_eq!(buf.pop_frame(4), Some(vec![1, 2, 3, 4]));
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.pop_frame(4), None);
    }

    #[test]
    fn frame_buffer_yields_consecutive_frames() {
        let mut buf = FrameBuffer::new();
        buf.push(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(buf.pop_frame(3), Some(vec![1, 2, 3]));
        assert_eq!(buf.pop_frame(3), Some(vec![4, 5, 6]));
        assert_eq!(buf.pop_frame(3), None);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn mock_source_plays_back_in_chunks() {
        let mut source = MockAudioSource::new()
            .with_samples(vec![1, 2, 3, 4, 5])
            .with_read_size(2);

        assert_eq!(source.read_samples().unwrap(), vec![1, 2]);
        assert_eq!(source.read_samples().unwrap(), vec![3, 4]);
        assert_eq!(source.read_samples().unwrap(), vec![5]);
        assert!(source.read_samples().unwrap().is_empty());
        assert!(source.is_finite());
    }

    #[test]
    fn mock_source_start_stop_state() {
        let mut source = MockAudioSource::new();
        assert!(!source.is_started());
        source.start().unwrap();
        assert!(source.is_started());
        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn mock_source_start_failure() {
        let mut source = MockAudioSource::new().with_start_failure();
        let result = source.start();
        assert!(matches!(
            result,
            Err(VoiceIdError::AudioCapture { .. })
        ));
        assert!(!source.is_started());
    }

    #[test]
    fn mock_source_read_failure() {
        let mut source = MockAudioSource::new().with_read_failure();
        assert!(source.read_samples().is_err());
    }

    #[test]
    fn audio_source_is_object_safe() {
        let mut source: Box<dyn AudioSource> =
            Box::new(MockAudioSource::new().with_samples(vec![1, 2, 3]));
        source.start().unwrap();
        assert_eq!(source.read_samples().unwrap(), vec![1, 2, 3]);
        source.stop().unwrap();
    }
}
