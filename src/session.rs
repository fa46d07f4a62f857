//! Enrollment and live identification sessions.
//!
//! Session loops are frame-driven and single-threaded: read samples, chunk
//! them into engine frames, feed the engine, act on the result. A shared
//! stop flag (set from a Ctrl-C handler) is checked every iteration, and
//! audio sources are stopped on every exit path.

use crate::animation::EnrollmentAnimation;
use crate::audio::source::{AudioSource, FrameBuffer};
use crate::audio::wav::{self, WavSink};
use crate::engine::{EnrollmentEngine, RecognitionEngine};
use crate::error::{Result, VoiceIdError};
use crate::output;
use crate::profile;
use crate::segment::{Clock, Segmenter};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Pause between polls when the audio source has no samples ready.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Options for an enrollment session.
pub struct EnrollOptions {
    pub output_profile: PathBuf,
    pub output_audio: Option<PathBuf>,
    pub quiet: bool,
}

/// How an enrollment session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// Enrollment reached 100% and the profile was written.
    Completed,
    /// Stopped early (interrupt, quota, or exhausted source); no profile saved.
    Interrupted,
}

/// Run an enrollment session until the engine reports 100%.
pub fn run_enroll(
    engine: &mut dyn EnrollmentEngine,
    source: &mut dyn AudioSource,
    opts: &EnrollOptions,
    stop: &AtomicBool,
) -> Result<EnrollOutcome> {
    source.start()?;
    let result = enroll_loop(engine, source, opts, stop);
    let stopped = source.stop();
    let outcome = result?;
    stopped?;
    Ok(outcome)
}

fn enroll_loop(
    engine: &mut dyn EnrollmentEngine,
    source: &mut dyn AudioSource,
    opts: &EnrollOptions,
    stop: &AtomicBool,
) -> Result<EnrollOutcome> {
    let mut sink = match &opts.output_audio {
        Some(path) => Some(WavSink::create(path, engine.sample_rate())?),
        None => None,
    };
    let animation = (!opts.quiet).then(EnrollmentAnimation::start);

    let chunk_samples = engine.min_enroll_samples();
    let mut pending: Vec<i16> = Vec::with_capacity(chunk_samples);
    let mut percentage = 0.0f32;
    let mut interrupted = false;

    while percentage < 100.0 {
        if stop.load(Ordering::Relaxed) {
            interrupted = true;
            break;
        }

        let samples = source.read_samples()?;
        if samples.is_empty() {
            if source.is_finite() {
                interrupted = true;
                break;
            }
            thread::sleep(IDLE_POLL);
            continue;
        }

        if let Some(sink) = sink.as_mut() {
            sink.write(&samples)?;
        }

        pending.extend_from_slice(&samples);
        if pending.len() < chunk_samples {
            continue;
        }
        let chunk: Vec<i16> = pending.drain(..).collect();

        match engine.enroll(&chunk) {
            Ok((pct, feedback)) => {
                percentage = pct;
                if let Some(animation) = &animation {
                    animation.update(percentage, &format!(" - {}", feedback));
                }
            }
            Err(VoiceIdError::QuotaExceeded) => {
                if !opts.quiet {
                    eprintln!("\nEngine processing quota reached.");
                }
                interrupted = true;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(animation) = animation {
        animation.finish();
    }
    if let Some(sink) = sink {
        sink.finalize()?;
    }

    if interrupted {
        if !opts.quiet {
            eprintln!("\nStopping enrollment. No speaker profile is saved.");
        }
        return Ok(EnrollOutcome::Interrupted);
    }

    let bytes = engine.export_profile()?;
    profile::save_profile(&opts.output_profile, &bytes)?;
    if !opts.quiet {
        eprintln!(
            "\nSpeaker profile saved to {}",
            opts.output_profile.display().green()
        );
    }
    Ok(EnrollOutcome::Completed)
}

/// Options for a live identification session.
pub struct TestOptions {
    /// Directory segment WAV files are written to.
    pub output_dir: PathBuf,
    pub output_audio: Option<PathBuf>,
    pub quiet: bool,
}

/// Counters reported after a live identification session.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub frames_processed: u64,
    pub segments_exported: u32,
    pub exports_failed: u32,
}

/// Run a live identification session until stopped.
///
/// Scores each captured frame, feeds the segmenter, and writes completed
/// segments to WAV. A failed segment export is reported and the session
/// continues; a quota error ends the session gracefully.
pub fn run_test<C: Clock>(
    engine: &mut dyn RecognitionEngine,
    source: &mut dyn AudioSource,
    segmenter: &mut Segmenter<C>,
    opts: &TestOptions,
    stop: &AtomicBool,
) -> Result<TestSummary> {
    source.start()?;
    let result = test_loop(engine, source, segmenter, opts, stop);
    let stopped = source.stop();
    let summary = result?;
    stopped?;
    Ok(summary)
}

fn test_loop<C: Clock>(
    engine: &mut dyn RecognitionEngine,
    source: &mut dyn AudioSource,
    segmenter: &mut Segmenter<C>,
    opts: &TestOptions,
    stop: &AtomicBool,
) -> Result<TestSummary> {
    let mut sink = match &opts.output_audio {
        Some(path) => Some(WavSink::create(path, engine.sample_rate())?),
        None => None,
    };

    let frame_length = engine.frame_length();
    let mut frames = FrameBuffer::new();
    let mut summary = TestSummary::default();

    'session: while !stop.load(Ordering::Relaxed) {
        let samples = source.read_samples()?;
        if samples.is_empty() {
            if source.is_finite() {
                break;
            }
            thread::sleep(IDLE_POLL);
            continue;
        }
        frames.push(&samples);

        while let Some(frame) = frames.pop_frame(frame_length) {
            if stop.load(Ordering::Relaxed) {
                break 'session;
            }

            // Tee to the session recording while anyone is mid-segment.
            // Activity reflects the previous frame here, matching the
            // export buffers.
            if let Some(sink) = sink.as_mut()
                && segmenter.any_active()
            {
                sink.write(&frame)?;
            }

            let scores = match engine.score_frame(&frame) {
                Ok(scores) => scores,
                Err(VoiceIdError::QuotaExceeded) => {
                    if !opts.quiet {
                        output::clear_line();
                        eprintln!("Engine processing quota reached, stopping.");
                    }
                    break 'session;
                }
                Err(e) => return Err(e),
            };
            summary.frames_processed += 1;

            if !opts.quiet {
                output::print_scores(engine.labels(), &scores);
            }

            for export in segmenter.on_frame(&frame, &scores) {
                match wav::write_segment(&opts.output_dir, &export, engine.sample_rate()) {
                    Ok(path) => {
                        summary.segments_exported += 1;
                        if !opts.quiet {
                            output::clear_line();
                            output::notify_export(&export, &path);
                        }
                    }
                    Err(e) => {
                        // A single failed export must not end the session
                        summary.exports_failed += 1;
                        output::clear_line();
                        eprintln!("Failed to export segment for '{}': {}", export.label, e);
                    }
                }
            }
        }
    }

    if let Some(sink) = sink {
        sink.finalize()?;
    }
    if !opts.quiet {
        output::clear_line();
    }
    Ok(summary)
}
