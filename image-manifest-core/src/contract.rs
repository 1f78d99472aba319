//! # contract: seams between the pipeline and the outside world
//!
//! Two async traits isolate every piece of I/O the pipeline needs:
//! - [`ObjectLister`]: one page of a bucket listing. Implemented by the
//!   S3-compatible client in the CLI crate and by mocks in tests.
//! - [`ArtifactSource`]: the raw manifest document, wherever it lives
//!   (local file, HTTP, embedded string). See [`crate::resolve`].
//!
//! Both traits are annotated for `mockall`; the generated `MockObjectLister`
//! and `MockArtifactSource` are exported when the `test-export-mocks` feature
//! is on (the default) so downstream crates can drive the pipeline in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::Result;

/// Maximum number of objects a single listing call returns.
pub const LIST_PAGE_SIZE: i32 = 1000;

/// One object from a listing page. Not persisted directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    /// `None` when the provider omitted it.
    pub size: Option<u64>,
    /// `None` when the provider omitted it.
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>) -> Self {
        ObjectEntry {
            key: key.into(),
            size: None,
            last_modified: None,
        }
    }
}

/// Arguments of a single listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub prefix: String,
    /// Opaque token returned by the previous page, `None` for the first call.
    pub continuation_token: Option<String>,
    pub max_keys: i32,
}

/// Result of a single listing call.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectEntry>,
    /// Present while the listing is truncated.
    pub next_continuation_token: Option<String>,
}

/// A bucket listing backend (native binding, signed REST call, mock...).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// Lists at most `req.max_keys` objects under `req.prefix`, resuming from
    /// `req.continuation_token` when given.
    async fn list_page(&self, req: ListRequest) -> Result<ListPage>;
}

/// Where the persisted manifest document is read from at serve time.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Returns the raw JSON document.
    async fn fetch(&self) -> Result<String>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
