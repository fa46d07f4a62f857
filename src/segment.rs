//! Per-speaker speech segmentation.
//!
//! Turns a stream of per-frame, per-speaker confidence scores into discrete
//! speech segments: a speaker becomes active when their score rises above
//! zero, audio is buffered while they stay active, and when the score drops
//! back to zero the buffered segment is emitted as an export event if it
//! lasted longer than the configured minimum duration.

use crate::defaults;
use std::fmt;
use std::time::{Duration, Instant};

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant, used for duration arithmetic.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time as whole seconds since the Unix
    /// epoch, used for export file naming.
    fn epoch_secs(&self) -> u64;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Identifier for an enrolled speaker.
///
/// The set of labels is fixed for the lifetime of a session. Labels are
/// derived externally, typically from a profile file's stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeakerLabel(String);

impl SpeakerLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeakerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpeakerLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SpeakerLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Configuration for the speech segmenter.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Segments must be strictly longer than this to be exported.
    pub min_speech_duration: Duration,
    /// Whether the frame that activates a speaker is included in the
    /// segment buffer.
    ///
    /// The historical behavior is to drop that frame: the buffer is reset
    /// on the idle-to-active edge and only subsequent frames are appended.
    /// That loses one frame of audio per segment, so the corrected variant
    /// is available behind this flag. Defaults to the historical behavior
    /// for compatibility.
    pub include_activation_frame: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_speech_duration: Duration::from_secs_f64(defaults::MIN_SPEECH_DURATION_SECS),
            include_activation_frame: false,
        }
    }
}

/// A completed speech segment ready for export.
#[derive(Debug, Clone)]
pub struct SegmentExport {
    pub label: SpeakerLabel,
    /// Wall-clock start of the segment, whole seconds since the Unix epoch.
    pub started_epoch_secs: u64,
    pub duration: Duration,
    /// Buffered 16-bit PCM samples for the segment.
    pub samples: Vec<i16>,
}

impl SegmentExport {
    /// Export file name, unique per label at whole-second granularity.
    pub fn file_name(&self) -> String {
        format!("{}_speech_{}.wav", self.label, self.started_epoch_secs)
    }
}

/// Per-speaker segmentation state.
#[derive(Debug, Default)]
struct SpeakerTrack {
    active: bool,
    start: Option<Instant>,
    start_epoch_secs: u64,
    buffer: Vec<i16>,
}

/// Speech segmentation state machine.
///
/// One independent state machine per speaker label; all labels are updated
/// from the same frame but never influence each other. The segmenter
/// performs no I/O and cannot fail; it only produces [`SegmentExport`]
/// descriptors for the caller to act on.
///
/// Single-threaded by design: one `on_frame` call per captured frame,
/// strictly sequential. Still-active segments are simply abandoned if the
/// caller stops feeding frames.
pub struct Segmenter<C: Clock = SystemClock> {
    config: SegmenterConfig,
    labels: Vec<SpeakerLabel>,
    tracks: Vec<SpeakerTrack>,
    clock: C,
}

impl<C: Clock> Segmenter<C> {
    /// Creates a segmenter for a fixed set of speaker labels with the given clock.
    pub fn with_clock(labels: Vec<SpeakerLabel>, config: SegmenterConfig, clock: C) -> Self {
        let tracks = labels.iter().map(|_| SpeakerTrack::default()).collect();
        Self {
            config,
            labels,
            tracks,
            clock,
        }
    }

    /// The speaker labels this segmenter tracks, in score order.
    pub fn labels(&self) -> &[SpeakerLabel] {
        &self.labels
    }

    /// Whether the given label is currently inside a speech segment.
    pub fn is_active(&self, label: &SpeakerLabel) -> bool {
        self.labels
            .iter()
            .position(|l| l == label)
            .is_some_and(|i| self.tracks[i].active)
    }

    /// Whether any speaker is currently inside a speech segment.
    pub fn any_active(&self) -> bool {
        self.tracks.iter().any(|t| t.active)
    }

    /// Processes one frame of audio with its per-speaker confidence scores.
    ///
    /// `scores` is parallel to [`labels`](Self::labels). A score strictly
    /// greater than zero means the speaker is present this frame; exactly
    /// zero counts as silence. Returns the segments completed by this
    /// frame, which is empty for most frames.
    pub fn on_frame(&mut self, pcm: &[i16], scores: &[f32]) -> Vec<SegmentExport> {
        debug_assert_eq!(scores.len(), self.labels.len());

        let now = self.clock.now();
        let mut exports = Vec::new();

        for (idx, &score) in scores.iter().enumerate().take(self.tracks.len()) {
            let track = &mut self.tracks[idx];

            if score > 0.0 {
                if !track.active {
                    track.active = true;
                    track.start = Some(now);
                    track.start_epoch_secs = self.clock.epoch_secs();
                    track.buffer.clear();
                    if self.config.include_activation_frame {
                        track.buffer.extend_from_slice(pcm);
                    }
                } else {
                    track.buffer.extend_from_slice(pcm);
                }
            } else if track.active {
                // End-of-speech edge: deactivate unconditionally, export
                // only if the segment outlasted the minimum duration.
                let duration = track
                    .start
                    .map(|start| now.saturating_duration_since(start))
                    .unwrap_or_default();

                if duration > self.config.min_speech_duration {
                    exports.push(SegmentExport {
                        label: self.labels[idx].clone(),
                        started_epoch_secs: track.start_epoch_secs,
                        duration,
                        samples: std::mem::take(&mut track.buffer),
                    });
                } else {
                    track.buffer.clear();
                }
                track.active = false;
                track.start = None;
            }
        }

        exports
    }
}

impl Segmenter<SystemClock> {
    /// Creates a segmenter using the system clock.
    pub fn new(labels: Vec<SpeakerLabel>, config: SegmenterConfig) -> Self {
        Self::with_clock(labels, config, SystemClock)
    }
}
