//! Artifact persistence with a versioned JSON envelope.
//!
//! Fitted objects (preprocessor, model) are stored as plain JSON wrapped in
//! an envelope carrying a format version and a payload kind tag, so artifacts
//! stay portable and inspectable rather than being tied to one runtime's
//! object graph. Each training run overwrites the previous artifact of the
//! same kind.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorecastError};

/// The artifact format version this build reads and writes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    format_version: u32,
    kind: String,
    payload: T,
}

/// Serializes `payload` to `path` inside a versioned envelope, creating
/// parent directories as needed.
///
/// # Arguments
///
/// * `path` - Destination file.
/// * `kind` - Payload kind tag (e.g. `"preprocessor"`, `"model"`), checked
///   on load.
/// * `payload` - The object to persist.
pub fn save_object<T: Serialize>(path: &Path, kind: &str, payload: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ScorecastError::io(parent, e))?;
        }
    }
    let envelope = Envelope {
        format_version: FORMAT_VERSION,
        kind: kind.to_string(),
        payload,
    };
    let json = serde_json::to_string_pretty(&envelope)?;
    std::fs::write(path, json).map_err(|e| ScorecastError::io(path, e))?;
    Ok(())
}

/// Loads an object of the given kind from `path`, validating the envelope's
/// format version and kind tag.
pub fn load_object<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<T> {
    if !path.exists() {
        return Err(ScorecastError::ArtifactMissing {
            path: path.to_path_buf(),
        });
    }
    let json = std::fs::read_to_string(path).map_err(|e| ScorecastError::io(path, e))?;
    let envelope: Envelope<T> = serde_json::from_str(&json)?;
    if envelope.format_version != FORMAT_VERSION {
        return Err(ScorecastError::FormatVersion {
            expected: FORMAT_VERSION,
            actual: envelope.format_version,
        });
    }
    if envelope.kind != kind {
        return Err(ScorecastError::ArtifactKind {
            expected: kind.to_string(),
            actual: envelope.kind,
        });
    }
    Ok(envelope.payload)
}
