use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{ManifestError, Result};

pub const ENV_ENDPOINT: &str = "R2_ENDPOINT";
pub const ENV_ACCOUNT_ID: &str = "R2_ACCOUNT_ID";
pub const ENV_ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";
pub const ENV_BUCKET_NAME: &str = "R2_BUCKET_NAME";
pub const ENV_PUBLIC_BUCKET_URL: &str = "PUBLIC_R2_BUCKET_URL";

/// Connection parameters for the object-storage bucket holding the images.
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    /// Public base URL that object keys are appended to.
    pub public_base_url: String,
}

// Secrets stay out of Debug output, and therefore out of logs.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl StorageConfig {
    /// Reads the connection parameters from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any name -> value lookup. Empty values count as
    /// missing. `R2_ENDPOINT` falls back to the endpoint derived from
    /// `R2_ACCOUNT_ID`.
    ///
    /// Validation is eager and complete: the error lists every missing name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint = get(ENV_ENDPOINT).or_else(|| {
            get(ENV_ACCOUNT_ID).map(|account| {
                debug!("Deriving R2 endpoint from account id");
                account_endpoint(&account)
            })
        });
        let access_key_id = get(ENV_ACCESS_KEY_ID);
        let secret_access_key = get(ENV_SECRET_ACCESS_KEY);
        let bucket_name = get(ENV_BUCKET_NAME);
        let public_base_url = get(ENV_PUBLIC_BUCKET_URL);

        match (
            endpoint,
            access_key_id,
            secret_access_key,
            bucket_name,
            public_base_url,
        ) {
            (
                Some(endpoint),
                Some(access_key_id),
                Some(secret_access_key),
                Some(bucket_name),
                Some(public_base_url),
            ) => {
                let config = StorageConfig {
                    endpoint,
                    access_key_id,
                    secret_access_key,
                    bucket_name,
                    public_base_url,
                };
                config.trace_loaded();
                Ok(config)
            }
            (endpoint, access_key_id, secret_access_key, bucket_name, public_base_url) => {
                let missing: Vec<&'static str> = [
                    (ENV_ENDPOINT, endpoint.is_none()),
                    (ENV_ACCESS_KEY_ID, access_key_id.is_none()),
                    (ENV_SECRET_ACCESS_KEY, secret_access_key.is_none()),
                    (ENV_BUCKET_NAME, bucket_name.is_none()),
                    (ENV_PUBLIC_BUCKET_URL, public_base_url.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                error!(missing = ?missing, "Missing required storage configuration");
                Err(ManifestError::Configuration { missing })
            }
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            endpoint = %self.endpoint,
            bucket = %self.bucket_name,
            public_base_url = %self.public_base_url,
            access_key_set = !self.access_key_id.is_empty(),
            "Loaded storage configuration"
        );
    }
}

/// Cloudflare R2 S3-compatible endpoint for an account.
pub fn account_endpoint(account_id: &str) -> String {
    format!("https://{}.r2.cloudflarestorage.com", account_id.trim())
}
