//! Manifest Resolver: serve-time, read-only access to the persisted manifest.
//!
//! A [`ManifestResolver`] owns its cache; there is no process-wide state.
//! Lifecycle: [`CacheState::Unloaded`] until the first successful
//! [`ManifestResolver::load`], then [`CacheState::Loaded`] for the lifetime
//! of the resolver. Failed loads are logged and reported as `None`, and the
//! next call tries again.
//!
//! Where the document comes from is decided by the injected
//! [`ArtifactSource`], never by inspecting the environment.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::contract::ArtifactSource;
use crate::error::{ManifestError, Result};
use crate::manifest::{ImageFile, Manifest};

/// Relative URL the artifact is published under.
pub const DEFAULT_MANIFEST_URL: &str = "/image-manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Unloaded,
    Loaded,
}

pub struct ManifestResolver<S> {
    source: S,
    cache: OnceCell<Arc<Manifest>>,
}

impl<S: ArtifactSource> ManifestResolver<S> {
    pub fn new(source: S) -> Self {
        ManifestResolver {
            source,
            cache: OnceCell::new(),
        }
    }

    pub fn state(&self) -> CacheState {
        if self.cache.initialized() {
            CacheState::Loaded
        } else {
            CacheState::Unloaded
        }
    }

    /// Returns the cached manifest, loading it from the source on first use.
    /// `None` means "no images available", never a fatal condition.
    pub async fn load(&self) -> Option<Arc<Manifest>> {
        let loaded = self
            .cache
            .get_or_try_init(|| async {
                let raw = self.source.fetch().await?;
                let manifest: Manifest = serde_json::from_str(&raw)?;
                info!(
                    source = %self.source.describe(),
                    product_categories = manifest.products.len(),
                    feature_categories = manifest.features.len(),
                    "Loaded image manifest"
                );
                Ok::<_, ManifestError>(Arc::new(manifest))
            })
            .await;

        match loaded {
            Ok(manifest) => Some(Arc::clone(manifest)),
            Err(e) => {
                error!(error = %e, source = %self.source.describe(), "Failed to load image manifest");
                None
            }
        }
    }
}

/// Images for a feature path such as `/atelier-zitron/echt/feature`.
///
/// An empty path yields no images. Otherwise one leading `/` is ignored.
/// An exact key match wins; otherwise the first key (in insertion order)
/// that contains the path, or is contained in it, is used. With several
/// overlapping keys the result depends on that order, and a bare `/`
/// matches the first key.
pub fn find_feature_images<'m>(manifest: &'m Manifest, sub_directory: &str) -> &'m [ImageFile] {
    if sub_directory.is_empty() {
        return &[];
    }
    let path = sub_directory.strip_prefix('/').unwrap_or(sub_directory);

    if let Some(images) = manifest.features.get(path).filter(|images| !images.is_empty()) {
        return images.as_slice();
    }

    match manifest
        .features
        .iter()
        .find(|(key, _)| key.contains(path) || path.contains(key.as_str()))
    {
        Some((key, images)) => {
            debug!(requested = path, matched = %key, "Feature images found by partial match");
            images.as_slice()
        }
        None => &[],
    }
}

/// URL of the representative image: a filename containing `-1.` first,
/// then filename order. Returns `""` for no images.
///
/// `images` is sorted in place by that rule.
pub fn get_primary_image_url(images: &mut [ImageFile]) -> String {
    images.sort_by(primary_order);
    images
        .first()
        .map(|image| image.url.clone())
        .unwrap_or_default()
}

fn primary_order(a: &ImageFile, b: &ImageFile) -> Ordering {
    let rank = |image: &ImageFile| if image.filename.contains("-1.") { 0 } else { 1 };
    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.filename.cmp(&b.filename))
}

/// Parses a manifest compiled into the binary. An invalid document yields
/// an empty manifest, matching the resolver's "no images" degradation.
pub fn parse_embedded(json: &str) -> Manifest {
    serde_json::from_str(json).unwrap_or_else(|e| {
        error!(error = %e, "Embedded image manifest is invalid");
        Manifest {
            generated: String::new(),
            products: Default::default(),
            features: Default::default(),
        }
    })
}

/// Reads the artifact from the local file system.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalFileSource { path: path.into() }
    }
}

#[async_trait]
impl ArtifactSource for LocalFileSource {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ManifestError::io(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches the artifact over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: reqwest::Client,
    url: String,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        RemoteSource {
            client,
            url: url.into(),
        }
    }

    /// `base_url` joined with the well-known relative manifest URL.
    pub fn for_site(base_url: &str, manifest_url: &str) -> Self {
        Self::new(format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            manifest_url.trim_start_matches('/')
        ))
    }
}

#[async_trait]
impl ArtifactSource for RemoteSource {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ManifestError::Transport(format!("GET {} failed: {e}", self.url)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ManifestError::Transport(format!(
                "Failed to load manifest: {status}"
            )));
        }
        response
            .text()
            .await
            .map_err(|e| ManifestError::Transport(format!("reading {} failed: {e}", self.url)))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A manifest document compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSource {
    json: &'static str,
}

impl EmbeddedSource {
    pub const fn new(json: &'static str) -> Self {
        EmbeddedSource { json }
    }
}

#[async_trait]
impl ArtifactSource for EmbeddedSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.json.to_string())
    }

    fn describe(&self) -> String {
        "<embedded>".to_string()
    }
}
