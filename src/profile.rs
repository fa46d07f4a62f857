//! Speaker profile files.
//!
//! A profile is an opaque byte blob produced by an enrollment engine. The
//! speaker label is derived from the file stem, so `alice.profile` enrolls
//! as speaker `alice`.

use crate::error::{Result, VoiceIdError};
use crate::segment::SpeakerLabel;
use std::fs;
use std::path::Path;

/// A loaded speaker profile.
#[derive(Debug, Clone)]
pub struct SpeakerProfile {
    pub label: SpeakerLabel,
    pub bytes: Vec<u8>,
}

impl SpeakerProfile {
    /// Load a profile from disk, deriving the label from the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| VoiceIdError::ProfileRead {
                path: path.display().to_string(),
                message: "cannot derive a speaker label from the file name".to_string(),
            })?;

        let bytes = fs::read(path).map_err(|e| VoiceIdError::ProfileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            label: SpeakerLabel::from(label),
            bytes,
        })
    }

    /// Load several profiles, failing on the first unreadable one.
    pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<Self>> {
        paths.iter().map(|p| Self::load(p.as_ref())).collect()
    }
}

/// Write serialized profile bytes to disk.
pub fn save_profile(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| VoiceIdError::ProfileWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
