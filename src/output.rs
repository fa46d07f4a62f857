//! Terminal rendering for live sessions.

use crate::segment::{SegmentExport, SpeakerLabel};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::path::Path;

/// Format the live score line, e.g. ``scores -> `alice`: 0.42, `bob`: -0.10``.
pub fn format_scores(labels: &[SpeakerLabel], scores: &[f32]) -> String {
    let mut line = String::from("scores -> ");
    for (i, (label, score)) in labels.iter().zip(scores.iter()).enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        line.push_str(&format!("`{}`: {:.2}", label, score));
    }
    line
}

/// Redraw the score line in place.
pub fn print_scores(labels: &[SpeakerLabel], scores: &[f32]) {
    print!("\r{}", format_scores(labels, scores));
    let _ = io::stdout().flush();
}

/// Clear the current terminal line (used before printing full-line messages
/// over the in-place score line).
pub fn clear_line() {
    print!("\r\x1b[2K");
    let _ = io::stdout().flush();
}

/// Announce an exported speech segment.
pub fn notify_export(export: &SegmentExport, path: &Path) {
    println!(
        "Speaker '{}' talked with confidence > 0.0 for {:.2} seconds",
        export.label.green(),
        export.duration.as_secs_f64()
    );
    println!("Audio saved to: {}", path.display().green());
}
