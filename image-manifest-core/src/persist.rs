//! Manifest Persister: the JSON artifact on disk.
//!
//! The artifact is regenerated wholesale on every run. Writes go to a
//! temporary sibling file that is renamed over the destination, so readers
//! see either the previous artifact or the complete new one.

use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{error, info};

use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;

/// Default artifact location, relative to the site root.
pub const DEFAULT_MANIFEST_PATH: &str = "public/image-manifest.json";

pub fn to_pretty_json(manifest: &Manifest) -> Result<String> {
    Ok(serde_json::to_string_pretty(manifest)?)
}

/// Serializes `manifest` and replaces whatever is at `path`.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let json = to_pretty_json(manifest)?;

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| {
        error!(error = ?e, path = %parent.display(), "Failed to create manifest directory");
        ManifestError::io(parent, e)
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| {
        error!(error = ?e, path = %parent.display(), "Failed to create temporary manifest file");
        ManifestError::io(parent, e)
    })?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| {
            error!(error = ?e, path = %tmp.path().display(), "Failed to write temporary manifest file");
            ManifestError::io(tmp.path(), e)
        })?;
    tmp.persist(path).map_err(|e| {
        error!(error = ?e.error, path = %path.display(), "Failed to move manifest into place");
        ManifestError::io(path, e.error)
    })?;

    info!(
        path = %path.display(),
        bytes = json.len(),
        product_categories = manifest.products.len(),
        feature_categories = manifest.features.len(),
        "Manifest saved"
    );
    Ok(())
}

/// Reads and parses a previously written artifact.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Could not read image manifest");
        ManifestError::io(path, e)
    })?;
    serde_json::from_str(&content).map_err(|e| {
        error!(error = %e, path = %path.display(), "Image manifest is not valid JSON");
        ManifestError::Parse(e)
    })
}
