//! Scripted engines for deterministic session tests.

use crate::engine::{EnrollFeedback, EnrollmentEngine, RecognitionEngine};
use crate::error::{Result, VoiceIdError};
use crate::segment::SpeakerLabel;
use std::collections::VecDeque;

/// Recognition engine that replays a fixed score script.
///
/// Once the script is exhausted it returns all-zero scores, or a quota
/// error if configured to.
pub struct ScriptedRecognizer {
    labels: Vec<SpeakerLabel>,
    script: VecDeque<Vec<f32>>,
    quota_at_end: bool,
    frame_length: usize,
    sample_rate: u32,
}

impl ScriptedRecognizer {
    pub fn new(labels: Vec<SpeakerLabel>) -> Self {
        Self {
            labels,
            script: VecDeque::new(),
            quota_at_end: false,
            frame_length: 512,
            sample_rate: 16000,
        }
    }

    /// Append per-frame score vectors, consumed in order.
    pub fn with_scores(mut self, scores: impl IntoIterator<Item = Vec<f32>>) -> Self {
        self.script.extend(scores);
        self
    }

    /// Fail with a quota error once the script runs out.
    pub fn with_quota_at_end(mut self) -> Self {
        self.quota_at_end = true;
        self
    }

    pub fn with_frame_length(mut self, frame_length: usize) -> Self {
        self.frame_length = frame_length;
        self
    }
}

impl RecognitionEngine for ScriptedRecognizer {
    fn labels(&self) -> &[SpeakerLabel] {
        &self.labels
    }

    fn frame_length(&self) -> usize {
        self.frame_length
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn score_frame(&mut self, _pcm: &[i16]) -> Result<Vec<f32>> {
        match self.script.pop_front() {
            Some(scores) => Ok(scores),
            None if self.quota_at_end => Err(VoiceIdError::QuotaExceeded),
            None => Ok(vec![0.0; self.labels.len()]),
        }
    }
}

/// Enrollment engine that replays a fixed (percentage, feedback) script.
pub struct ScriptedEnrollment {
    steps: VecDeque<(f32, EnrollFeedback)>,
    profile_bytes: Vec<u8>,
    min_enroll_samples: usize,
    sample_rate: u32,
    last_percentage: f32,
}

impl ScriptedEnrollment {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            profile_bytes: b"scripted-profile".to_vec(),
            min_enroll_samples: 1024,
            sample_rate: 16000,
            last_percentage: 0.0,
        }
    }

    /// Append enrollment steps, consumed in order. After the script runs
    /// out, `enroll` keeps returning the last percentage with `AudioOk`.
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = (f32, EnrollFeedback)>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn with_profile_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.profile_bytes = bytes;
        self
    }

    pub fn with_min_enroll_samples(mut self, samples: usize) -> Self {
        self.min_enroll_samples = samples;
        self
    }
}

impl Default for ScriptedEnrollment {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrollmentEngine for ScriptedEnrollment {
    fn min_enroll_samples(&self) -> usize {
        self.min_enroll_samples
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn enroll(&mut self, _pcm: &[i16]) -> Result<(f32, EnrollFeedback)> {
        if let Some((percentage, feedback)) = self.steps.pop_front() {
            self.last_percentage = percentage;
            Ok((percentage, feedback))
        } else {
            Ok((self.last_percentage, EnrollFeedback::AudioOk))
        }
    }

    fn export_profile(&self) -> Result<Vec<u8>> {
        Ok(self.profile_bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_recognizer_replays_then_goes_silent() {
        let mut engine = ScriptedRecognizer::new(vec!["a".into()])
            .with_scores([vec![0.7], vec![0.2]]);

        assert_eq!(engine.score_frame(&[0; 512]).unwrap(), vec![0.7]);
        assert_eq!(engine.score_frame(&[0; 512]).unwrap(), vec![0.2]);
        assert_eq!(engine.score_frame(&[0; 512]).unwrap(), vec![0.0]);
    }

    #[test]
    fn scripted_recognizer_quota_at_end() {
        let mut engine = ScriptedRecognizer::new(vec!["a".into()])
            .with_scores([vec![0.7]])
            .with_quota_at_end();

        assert!(engine.score_frame(&[0; 512]).is_ok());
        assert!(matches!(
            engine.score_frame(&[0; 512]),
            Err(VoiceIdError::QuotaExceeded)
        ));
    }

    #[test]
    fn scripted_enrollment_replays_steps() {
        let mut engine = ScriptedEnrollment::new().with_steps([
            (40.0, EnrollFeedback::AudioOk),
            (80.0, EnrollFeedback::NoVoiceFound),
            (100.0, EnrollFeedback::AudioOk),
        ]);

        assert_eq!(
            engine.enroll(&[0; 1024]).unwrap(),
            (40.0, EnrollFeedback::AudioOk)
        );
        assert_eq!(
            engine.enroll(&[0; 1024]).unwrap(),
            (80.0, EnrollFeedback::NoVoiceFound)
        );
        assert_eq!(
            engine.enroll(&[0; 1024]).unwrap(),
            (100.0, EnrollFeedback::AudioOk)
        );
        // Exhausted script holds the last percentage
        assert_eq!(
            engine.enroll(&[0; 1024]).unwrap(),
            (100.0, EnrollFeedback::AudioOk)
        );
    }
}
