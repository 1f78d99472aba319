//! High-level pipeline: enumerate -> build -> persist (-> embed).
//!
//! Fail-fast: any listing or write failure aborts the run before the artifact
//! is touched, so the previous artifact stays in place. The optional module
//! emission runs strictly after the JSON artifact has been written, and
//! reads it back from disk.
//!
//! # Major Types
//! - [`GenerateConfig`]: prefix and output locations for one run
//! - [`GenerateReport`]: counts for the run summary

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::builder::{BuildStats, ManifestBuilder};
use crate::codegen::{emit_module, EmitReport};
use crate::contract::ObjectLister;
use crate::enumerate::object_stream;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::persist::write_manifest;

/// Root prefix all product and feature images live under.
pub const DEFAULT_PREFIX: &str = "products/";

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub prefix: String,
    pub public_base_url: String,
    pub manifest_path: PathBuf,
    /// When set, the embedded module is regenerated after the JSON artifact.
    pub module_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct GenerateReport {
    pub manifest: Manifest,
    pub stats: BuildStats,
    pub manifest_path: PathBuf,
    pub module: Option<EmitReport>,
}

impl GenerateReport {
    pub fn summary(&self) -> String {
        format!(
            "Manifest generated with {} product categories and {} feature categories: \
             {} product images, {} feature images, {} of {} objects",
            self.manifest.products.len(),
            self.manifest.features.len(),
            self.manifest.product_image_count(),
            self.manifest.feature_image_count(),
            self.stats.images,
            self.stats.entries_seen,
        )
    }
}

/// Runs the full pipeline once against `lister`.
pub async fn generate<L>(
    lister: &L,
    config: &GenerateConfig,
    now: DateTime<Utc>,
) -> Result<GenerateReport>
where
    L: ObjectLister + ?Sized,
{
    info!(prefix = %config.prefix, "Generating image manifest");

    let mut builder = ManifestBuilder::new(&config.public_base_url, now);
    let mut objects = std::pin::pin!(object_stream(lister, &config.prefix));
    while let Some(entry) = objects.try_next().await.map_err(|e| {
        error!(error = %e, "Enumeration failed; previous manifest left untouched");
        e
    })? {
        builder.push(entry);
    }
    let (manifest, stats) = builder.finish();

    for (category, images) in &manifest.products {
        debug!(category = %category, images = images.len(), "Product category");
    }
    for (path, images) in &manifest.features {
        debug!(path = %path, images = images.len(), "Feature category");
    }

    write_manifest(&config.manifest_path, &manifest)?;

    let module = match &config.module_path {
        Some(module_path) => Some(emit_module(&config.manifest_path, module_path, now)?),
        None => None,
    };

    let report = GenerateReport {
        manifest,
        stats,
        manifest_path: config.manifest_path.clone(),
        module,
    };
    info!(summary = %report.summary(), "Image manifest pipeline complete");
    Ok(report)
}
