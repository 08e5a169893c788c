//! Loading and saving vehicle documents.
//!
//! A vehicle document is a serialized [`MemoryHost`]: scene snapshot, rig,
//! animation container and interaction state.

use anyhow::{Context, Result};
use carrig_bake::MemoryHost;
use std::fs;
use tracing::debug;

/// Reads and parses a vehicle document.
pub fn load(path: &str) -> Result<MemoryHost> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read document: {}", path))?;
    debug!(path, bytes = content.len(), "Loaded document");
    MemoryHost::from_json(&content).with_context(|| format!("Failed to parse document: {}", path))
}

/// Writes `host` to `out`, or back to `path` when `out` is `None`.
///
/// Returns the path written.
pub fn save<'a>(host: &MemoryHost, path: &'a str, out: Option<&'a str>) -> Result<&'a str> {
    let target = out.unwrap_or(path);
    let json = host.to_json_pretty().context("Failed to serialize document")?;
    fs::write(target, json).with_context(|| format!("Failed to write document: {}", target))?;
    debug!(path = target, "Saved document");
    Ok(target)
}
