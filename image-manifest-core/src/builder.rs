//! Manifest Builder: classifies object keys and assembles the [`Manifest`].
//!
//! Pure in-memory transformation; no network or disk I/O happens here.
//!
//! Key layout: `<root>/<category>/.../<filename>`. A key with a literal
//! `feature` segment anywhere is a feature image keyed by its full directory
//! path below the root (`atelier-zitron/echt/feature`); anything else is a
//! product image keyed by `<category>` alone.

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info};

use crate::color::extract_color_info;
use crate::contract::ObjectEntry;
use crate::manifest::{iso_timestamp, ImageBuckets, ImageFile, Manifest};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif"];
pub const FEATURE_SEGMENT: &str = "feature";

/// Where an object key lands in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Product { category: String },
    Feature { path: String },
    Skip(SkipReason),
}

/// Why a key was filtered out. Filtering is intentional, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DirectoryMarker,
    NotAnImage,
    TooFewSegments,
}

/// True when the filename carries a recognised image extension
/// (case-insensitive). A bare `.jpg` has no extension and is rejected.
pub fn is_image_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

pub fn classify_key(key: &str) -> Classification {
    if key.ends_with('/') {
        return Classification::Skip(SkipReason::DirectoryMarker);
    }
    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < 3 {
        return Classification::Skip(SkipReason::TooFewSegments);
    }
    let filename = segments[segments.len() - 1];
    if !is_image_file(filename) {
        return Classification::Skip(SkipReason::NotAnImage);
    }

    if segments.iter().any(|segment| *segment == FEATURE_SEGMENT) {
        Classification::Feature {
            path: segments[1..segments.len() - 1].join("/"),
        }
    } else {
        Classification::Product {
            category: segments[1].to_string(),
        }
    }
}

/// Last path segment of an object key.
pub fn filename_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Counters collected while building, for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub entries_seen: usize,
    pub images: usize,
    pub skipped_directories: usize,
    pub skipped_non_images: usize,
    pub skipped_short_keys: usize,
}

impl BuildStats {
    pub fn skipped(&self) -> usize {
        self.skipped_directories + self.skipped_non_images + self.skipped_short_keys
    }
}

/// Accumulates entries and produces the sorted [`Manifest`].
#[derive(Debug)]
pub struct ManifestBuilder {
    public_base_url: String,
    now: DateTime<Utc>,
    products: ImageBuckets,
    features: ImageBuckets,
    stats: BuildStats,
}

impl ManifestBuilder {
    /// `now` stamps the manifest and fills in missing modification times.
    pub fn new(public_base_url: &str, now: DateTime<Utc>) -> Self {
        ManifestBuilder {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            now,
            products: ImageBuckets::new(),
            features: ImageBuckets::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn push(&mut self, entry: ObjectEntry) {
        self.stats.entries_seen += 1;

        let (bucket, bucket_key) = match classify_key(&entry.key) {
            Classification::Product { category } => (&mut self.products, category),
            Classification::Feature { path } => (&mut self.features, path),
            Classification::Skip(reason) => {
                match reason {
                    SkipReason::DirectoryMarker => self.stats.skipped_directories += 1,
                    SkipReason::NotAnImage => self.stats.skipped_non_images += 1,
                    SkipReason::TooFewSegments => self.stats.skipped_short_keys += 1,
                }
                debug!(key = %entry.key, ?reason, "Skipping object");
                return;
            }
        };

        let filename = filename_of(&entry.key).to_string();
        let image = ImageFile {
            url: format!("{}/{}", self.public_base_url, entry.key),
            size: entry.size.unwrap_or(0),
            last_modified: iso_timestamp(entry.last_modified.unwrap_or(self.now)),
            color_info: extract_color_info(&filename),
            filename,
        };

        bucket
            .entry(bucket_key)
            .or_insert_with(|| {
                debug!(key = %entry.key, "New manifest category");
                Vec::new()
            })
            .push(image);
        self.stats.images += 1;
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Sorts every bucket by filename and returns the manifest.
    pub fn finish(self) -> (Manifest, BuildStats) {
        let ManifestBuilder {
            now,
            mut products,
            mut features,
            stats,
            ..
        } = self;

        for images in products.values_mut().chain(features.values_mut()) {
            images.sort_by(|a, b| a.filename.cmp(&b.filename));
        }

        info!(
            product_categories = products.len(),
            feature_categories = features.len(),
            images = stats.images,
            skipped = stats.skipped(),
            "Built image manifest"
        );

        let manifest = Manifest {
            generated: iso_timestamp(now),
            products,
            features,
        };
        (manifest, stats)
    }
}

/// Builds a manifest from an in-memory set of entries.
pub fn build_manifest<I>(entries: I, public_base_url: &str, now: DateTime<Utc>) -> Manifest
where
    I: IntoIterator<Item = ObjectEntry>,
{
    let mut builder = ManifestBuilder::new(public_base_url, now);
    for entry in entries {
        builder.push(entry);
    }
    builder.finish().0
}
