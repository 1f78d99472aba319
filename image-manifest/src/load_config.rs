/// `load_config` module: non-secret settings for the image-manifest CLI.
///
/// Settings come from an optional YAML file; every key has a default so the
/// CLI runs without one. Connection secrets are never read from this file:
/// they come from the environment through
/// [`image_manifest_core::config::StorageConfig::from_env`].
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use image_manifest_core::codegen::DEFAULT_MODULE_PATH;
use image_manifest_core::generate::DEFAULT_PREFIX;
use image_manifest_core::persist::DEFAULT_MANIFEST_PATH;
use image_manifest_core::resolve::DEFAULT_MANIFEST_URL;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Bucket prefix holding all product and feature images.
    pub prefix: String,
    pub manifest_path: PathBuf,
    pub module_path: PathBuf,
    /// Relative URL the manifest is published under on the site.
    pub manifest_url: String,
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            module_path: PathBuf::from(DEFAULT_MODULE_PATH),
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            server: ServerSection::default(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            host: "0.0.0.0".to_string(),
            port: 4321,
        }
    }
}

impl ServerSection {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads the YAML settings file, or the defaults when `path` is `None`.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<CliConfig> {
    let Some(path) = path else {
        info!("No config file given, using default settings");
        return Ok(CliConfig::default());
    };
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file means "all defaults".
    if config_content.trim().is_empty() {
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if config.prefix.trim_matches('/').is_empty() {
        error!(config_path = ?path_ref, "prefix must name a bucket directory");
        anyhow::bail!("Invalid config: prefix must not be empty");
    }

    Ok(config)
}
