//! Secondary emission: the manifest embedded in a generated Rust module.
//!
//! The module carries the JSON document as a raw string literal plus the
//! resolver queries bound to it, for builds that should not read or fetch
//! the artifact at runtime. It is always produced from the primary JSON
//! artifact, after that artifact has been written.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::error::{ManifestError, Result};
use crate::manifest::{iso_timestamp, Manifest};
use crate::persist::{read_manifest, to_pretty_json};

pub const DEFAULT_MODULE_PATH: &str = "src/data/image_manifest.rs";

/// Outcome of [`emit_module`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitReport {
    pub feature_categories: usize,
    pub product_categories: usize,
    pub bytes: usize,
}

/// Reads the primary artifact at `manifest_path` and writes the generated
/// module to `module_path`. A missing or unparsable artifact is an error.
pub fn emit_module(
    manifest_path: &Path,
    module_path: &Path,
    generated_at: DateTime<Utc>,
) -> Result<EmitReport> {
    let manifest = read_manifest(manifest_path).map_err(|e| {
        error!(
            error = %e,
            expected = %manifest_path.display(),
            "Could not read the image manifest; generate it before emitting the module"
        );
        e
    })?;

    let source = render_module(&manifest, generated_at)?;

    if let Some(dir) = module_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| ManifestError::io(dir, e))?;
    }
    fs::write(module_path, &source).map_err(|e| {
        error!(error = ?e, path = %module_path.display(), "Failed to write manifest module");
        ManifestError::io(module_path, e)
    })?;

    let report = EmitReport {
        feature_categories: manifest.features.len(),
        product_categories: manifest.products.len(),
        bytes: source.len(),
    };
    info!(
        path = %module_path.display(),
        feature_categories = report.feature_categories,
        product_categories = report.product_categories,
        "Generated manifest module"
    );
    Ok(report)
}

/// Renders the module source for `manifest`.
pub fn render_module(manifest: &Manifest, generated_at: DateTime<Utc>) -> Result<String> {
    let json = to_pretty_json(manifest)?;
    let hashes = "#".repeat(raw_string_hashes(&json));

    Ok(format!(
        r#"// This file is auto-generated. Do not edit manually.
// Generated from image-manifest.json at: {generated_at}

use std::sync::LazyLock;

use image_manifest_core::manifest::{{ImageFile, Manifest}};
use image_manifest_core::resolve;

pub const IMAGE_MANIFEST_JSON: &str = r{hashes}"{json}"{hashes};

pub static IMAGE_MANIFEST: LazyLock<Manifest> =
    LazyLock::new(|| resolve::parse_embedded(IMAGE_MANIFEST_JSON));

pub fn find_feature_images(sub_directory: &str) -> &'static [ImageFile] {{
    resolve::find_feature_images(&IMAGE_MANIFEST, sub_directory)
}}

pub fn get_primary_image_url(images: &mut [ImageFile]) -> String {{
    resolve::get_primary_image_url(images)
}}

pub fn available_feature_paths() -> Vec<&'static str> {{
    IMAGE_MANIFEST.feature_paths().collect()
}}

pub fn available_product_paths() -> Vec<&'static str> {{
    IMAGE_MANIFEST.product_paths().collect()
}}
"#,
        generated_at = iso_timestamp(generated_at),
    ))
}

/// Number of `#` needed so that no `"#...` run inside `content` can close
/// the raw string literal early.
pub fn raw_string_hashes(content: &str) -> usize {
    let mut longest = 0;
    for (idx, _) in content.match_indices('"') {
        let run = content[idx + 1..].bytes().take_while(|b| *b == b'#').count();
        longest = longest.max(run);
    }
    longest + 1
}
