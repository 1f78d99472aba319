//! Persisted data model: [`ImageFile`] and the [`Manifest`] aggregate.
//!
//! Field names serialize in camelCase so the JSON artifact stays readable by
//! the site that consumes it (`lastModified`, `colorInfo`).

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category key (product line, or feature path) to its ordered images.
/// Keys keep first-occurrence order.
pub type ImageBuckets = IndexMap<String, Vec<ImageFile>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile {
    pub filename: String,
    pub url: String,
    pub size: u64,
    /// ISO-8601, see [`iso_timestamp`].
    pub last_modified: String,
    pub color_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated: String,
    #[serde(default)]
    pub products: ImageBuckets,
    #[serde(default)]
    pub features: ImageBuckets,
}

impl Manifest {
    /// An empty manifest stamped with `generated`.
    pub fn empty(generated: DateTime<Utc>) -> Self {
        Manifest {
            generated: iso_timestamp(generated),
            products: ImageBuckets::new(),
            features: ImageBuckets::new(),
        }
    }

    pub fn feature_paths(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn product_paths(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn product_image_count(&self) -> usize {
        self.products.values().map(Vec::len).sum()
    }

    pub fn feature_image_count(&self) -> usize {
        self.features.values().map(Vec::len).sum()
    }

    pub fn image_count(&self) -> usize {
        self.product_image_count() + self.feature_image_count()
    }
}

/// Renders a UTC timestamp as `2024-03-01T12:00:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
