//! Error type shared by every stage of the image-manifest pipeline.
//!
//! Build-time stages propagate these to the CLI, which exits non-zero.
//! The serve-time [`crate::resolve::ManifestResolver`] logs them and degrades
//! to "no manifest" instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    /// One or more required connection parameters are absent. Every missing
    /// name is listed, never just the first.
    #[error("missing required configuration: {}", missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    /// A listing call or artifact fetch failed (network, auth, bad response).
    #[error("transport error: {0}")]
    Transport(String),

    /// The persisted manifest is not valid JSON for the manifest schema.
    #[error("failed to parse image manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ManifestError> = std::result::Result<T, E>;
