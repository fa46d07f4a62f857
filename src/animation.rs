//! Enrollment progress animation.
//!
//! Renders `[ 42%] - Good audio ...` with cycling trailing dots while
//! enrollment runs. The rendering thread owns all animation state; the
//! session only sends `{percentage, feedback}` updates through a channel,
//! so there is no shared mutable state between the two threads.

use crate::defaults;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::io::{self, Write};
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [&str; 6] = [" .  ", " .. ", " ...", "  ..", "   .", "    "];

enum Message {
    Progress { percentage: f32, feedback: String },
    Stop,
}

/// Handle to the animation thread.
pub struct EnrollmentAnimation {
    tx: Sender<Message>,
    handle: Option<JoinHandle<()>>,
}

impl EnrollmentAnimation {
    /// Spawn the animation thread with the default refresh interval.
    pub fn start() -> Self {
        Self::with_interval(Duration::from_millis(defaults::ANIMATION_INTERVAL_MS))
    }

    pub fn with_interval(interval: Duration) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = std::thread::spawn(move || render_loop(rx, interval));
        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Update the rendered percentage and feedback line.
    pub fn update(&self, percentage: f32, feedback: &str) {
        let _ = self.tx.send(Message::Progress {
            percentage,
            feedback: feedback.to_string(),
        });
    }

    /// Stop the animation and wait for the thread to print its final line.
    pub fn finish(mut self) {
        self.stop_inner();
    }

    fn stop_inner(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(Message::Stop);
            let _ = handle.join();
        }
    }
}

impl Drop for EnrollmentAnimation {
    fn drop(&mut self) {
        self.stop_inner();
    }
}

fn render_loop(rx: Receiver<Message>, interval: Duration) {
    let mut percentage = 0.0f32;
    let mut feedback = String::new();
    let mut frame_idx = 0usize;

    loop {
        render(percentage, &feedback, FRAMES[frame_idx]);

        match rx.recv_timeout(interval) {
            Ok(Message::Progress {
                percentage: p,
                feedback: f,
            }) => {
                percentage = p;
                feedback = f;
            }
            Ok(Message::Stop) | Err(RecvTimeoutError::Disconnected) => {
                // Final line without the dots
                render(percentage, &feedback, "");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                frame_idx = (frame_idx + 1) % FRAMES.len();
            }
        }
    }
}

fn render(percentage: f32, feedback: &str, frame: &str) {
    // Clear line, move to column 1, then redraw
    eprint!("\x1b[2K\x1b[1G\r[{:3.0}%]{}{}", percentage, feedback, frame);
    let _ = io::stderr().flush();
}
