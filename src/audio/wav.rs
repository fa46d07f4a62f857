//! WAV writing for segment exports and session recordings.

use crate::error::{Result, VoiceIdError};
use crate::segment::SegmentExport;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn mono_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write a completed speech segment to `dir`, named
/// `{label}_speech_{epoch}.wav`. Returns the path written.
pub fn write_segment(dir: &Path, export: &SegmentExport, sample_rate: u32) -> Result<PathBuf> {
    let path = dir.join(export.file_name());
    let to_export_err = |e: hound::Error| VoiceIdError::Export {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut writer = hound::WavWriter::create(&path, mono_spec(sample_rate)).map_err(to_export_err)?;
    for &sample in &export.samples {
        writer.write_sample(sample).map_err(to_export_err)?;
    }
    writer.finalize().map_err(to_export_err)?;
    Ok(path)
}

/// Incremental mono WAV sink for whole-session recordings
/// (the `--output-audio` option).
pub struct WavSink {
    writer: hound::WavWriter<BufWriter<File>>,
    path: PathBuf,
}

impl WavSink {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let writer =
            hound::WavWriter::create(path, mono_spec(sample_rate)).map_err(|e| {
                VoiceIdError::Export {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    pub fn write(&mut self, samples: &[i16]) -> Result<()> {
        for &sample in samples {
            self.writer.write_sample(sample).map_err(|e| VoiceIdError::Export {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Finish the file, patching up the WAV header.
    pub fn finalize(self) -> Result<()> {
        let path = self.path.display().to_string();
        self.writer.finalize().map_err(|e| VoiceIdError::Export {
            path,
            message: e.to_string(),
        })
    }
}

/// Simple linear interpolation resampling, used when a capture device only
/// offers a non-native rate.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx.min(samples.len().saturating_sub(1))]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SpeakerLabel;
    use std::time::Duration;

    fn sample_export() -> SegmentExport {
        SegmentExport {
            label: SpeakerLabel::from("alice"),
            started_epoch_secs: 1_700_000_123,
            duration: Duration::from_secs(5),
            samples: vec![100, -200, 300, -400],
        }
    }

    #[test]
    fn write_segment_produces_named_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let export = sample_export();

        let path = write_segment(dir.path(), &export, 16000).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "alice_speech_1700000123.wav"
        );

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, export.samples);
    }

    #[test]
    fn write_segment_to_missing_dir_fails() {
        let export = sample_export();
        let result = write_segment(Path::new("/nonexistent-dir-voiceid"), &export, 16000);
        assert!(matches!(result, Err(VoiceIdError::Export { .. })));
    }

    #[test]
    fn wav_sink_accumulates_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.wav");

        let mut sink = WavSink::create(&path, 16000).unwrap();
        sink.write(&[1, 2, 3]).unwrap();
        sink.write(&[4, 5]).unwrap();
        sink.finalize().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn resample_identity_same_rate() {
        let samples = vec![100i16, 200, 300];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn resample_halves_sample_count() {
        let samples = vec![0i16; 3200];
        assert_eq!(resample(&samples, 16000, 8000).len(), 1600);
    }

    #[test]
    fn resample_interpolates_on_upsample() {
        let resampled = resample(&[0i16, 1000], 8000, 16000);
        assert_eq!(resampled.len(), 4);
        assert_eq!(resampled[0], 0);
        assert!(resampled[1] > 0 && resampled[1] < 1000);
    }

    #[test]
    fn resample_handles_empty_input() {
        assert!(resample(&[], 16000, 8000).is_empty());
    }
}
