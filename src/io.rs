//! JSON persistence for boundary artefacts.
//!
//! Peak listings, edge listings and the node-link graph form all leave the
//! crate as pretty-printed JSON files and come back the same way. The
//! helpers are generic over any serde type so callers do not repeat the
//! open/parse/annotate dance.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::WaveError;

/// Writes a value as pretty-printed JSON, creating parent directories as
/// needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), WaveError> {
    let as_io_error = |source: std::io::Error| WaveError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(as_io_error)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    log::debug!("writing {}", path.display());
    fs::write(path, text).map_err(as_io_error)
}

/// Reads a JSON file back into a value.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, WaveError> {
    log::debug!("reading {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| WaveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
