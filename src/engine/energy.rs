//! Energy-based reference engine.
//!
//! A deliberately simple stand-in for a proprietary speaker-recognition
//! SDK: enrollment measures a speaker's average signal energy, and
//! recognition scores a frame by how close its energy sits to that
//! signature. It is not voice biometrics — its job is to make the demo
//! binary runnable end to end and to exercise the session plumbing with a
//! real engine behind the trait seams.

use crate::defaults;
use crate::engine::{EnrollFeedback, EnrollmentEngine, RecognitionEngine};
use crate::error::{Result, VoiceIdError};
use crate::profile::SpeakerProfile;
use crate::segment::SpeakerLabel;
use serde::{Deserialize, Serialize};

const PROFILE_VERSION: u32 = 1;

/// Fraction of the enrolled mean energy within which a frame scores positive.
const ENERGY_TOLERANCE: f32 = 0.5;

/// Serialized speaker profile payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnergyProfileData {
    version: u32,
    sample_rate: u32,
    mean_rms: f32,
}

/// Root Mean Square of 16-bit samples, normalized to 0.0..=1.0.
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Enrollment side of the energy engine.
///
/// Accumulates voiced audio until [`defaults::ENROLL_AUDIO_SECS`] worth of
/// samples has been seen; the percentage is the fraction collected so far.
pub struct EnergyEnrollment {
    sample_rate: u32,
    min_enroll_samples: usize,
    required_samples: usize,
    voiced_samples: usize,
    rms_sum: f64,
    voiced_chunks: u64,
}

impl EnergyEnrollment {
    pub fn new(sample_rate: u32) -> Self {
        let required_samples = (sample_rate * defaults::ENROLL_AUDIO_SECS) as usize;
        Self {
            sample_rate,
            min_enroll_samples: required_samples / 4,
            required_samples,
            voiced_samples: 0,
            rms_sum: 0.0,
            voiced_chunks: 0,
        }
    }

    fn percentage(&self) -> f32 {
        (self.voiced_samples as f32 / self.required_samples as f32 * 100.0).min(100.0)
    }
}

impl EnrollmentEngine for EnergyEnrollment {
    fn min_enroll_samples(&self) -> usize {
        self.min_enroll_samples
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn enroll(&mut self, pcm: &[i16]) -> Result<(f32, EnrollFeedback)> {
        if pcm.len() < defaults::FRAME_LENGTH {
            return Ok((self.percentage(), EnrollFeedback::AudioTooShort));
        }

        let rms = calculate_rms(pcm);
        let feedback = if rms < defaults::MIN_VOICE_RMS {
            EnrollFeedback::NoVoiceFound
        } else if rms > defaults::CLIP_RMS {
            EnrollFeedback::QualityIssue
        } else {
            self.voiced_samples += pcm.len();
            self.rms_sum += rms as f64;
            self.voiced_chunks += 1;
            EnrollFeedback::AudioOk
        };

        Ok((self.percentage(), feedback))
    }

    fn export_profile(&self) -> Result<Vec<u8>> {
        if self.voiced_chunks == 0 {
            return Err(VoiceIdError::ProfileExport {
                message: "no voiced audio was enrolled".to_string(),
            });
        }

        let data = EnergyProfileData {
            version: PROFILE_VERSION,
            sample_rate: self.sample_rate,
            mean_rms: (self.rms_sum / self.voiced_chunks as f64) as f32,
        };
        serde_json::to_vec(&data).map_err(|e| VoiceIdError::ProfileExport {
            message: e.to_string(),
        })
    }
}

/// Recognition side of the energy engine.
pub struct EnergyRecognizer {
    labels: Vec<SpeakerLabel>,
    signatures: Vec<EnergyProfileData>,
    sample_rate: u32,
    frame_length: usize,
}

impl EnergyRecognizer {
    /// Build a recognizer from serialized speaker profiles.
    ///
    /// All profiles must agree on the sample rate.
    pub fn new(profiles: &[SpeakerProfile]) -> Result<Self> {
        if profiles.is_empty() {
            return Err(VoiceIdError::EngineInit {
                message: "at least one speaker profile is required".to_string(),
            });
        }

        let mut labels = Vec::with_capacity(profiles.len());
        let mut signatures = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let data: EnergyProfileData =
                serde_json::from_slice(&profile.bytes).map_err(|e| VoiceIdError::ProfileParse {
                    profile: profile.label.to_string(),
                    message: e.to_string(),
                })?;
            if data.version != PROFILE_VERSION {
                return Err(VoiceIdError::ProfileParse {
                    profile: profile.label.to_string(),
                    message: format!("unsupported profile version {}", data.version),
                });
            }
            labels.push(profile.label.clone());
            signatures.push(data);
        }

        let sample_rate = signatures[0].sample_rate;
        if signatures.iter().any(|s| s.sample_rate != sample_rate) {
            return Err(VoiceIdError::EngineInit {
                message: "speaker profiles were enrolled at different sample rates".to_string(),
            });
        }

        Ok(Self {
            labels,
            signatures,
            sample_rate,
            frame_length: defaults::FRAME_LENGTH,
        })
    }
}

impl RecognitionEngine for EnergyRecognizer {
    fn labels(&self) -> &[SpeakerLabel] {
        &self.labels
    }

    fn frame_length(&self) -> usize {
        self.frame_length
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn score_frame(&mut self, pcm: &[i16]) -> Result<Vec<f32>> {
        if pcm.len() != self.frame_length {
            return Err(VoiceIdError::FrameSize {
                expected: self.frame_length,
                actual: pcm.len(),
            });
        }

        let rms = calculate_rms(pcm);
        let scores = self
            .signatures
            .iter()
            .map(|sig| {
                let tolerance = (sig.mean_rms * ENERGY_TOLERANCE).max(f32::EPSILON);
                ((tolerance - (rms - sig.mean_rms).abs()) / tolerance).clamp(-1.0, 1.0)
            })
            .collect();
        Ok(scores)
    }
}
