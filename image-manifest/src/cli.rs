///
/// This module implements the CLI interface for image-manifest: command
/// parsing, user-visible output, and wiring of concrete clients into the
/// pipeline.
///
/// All business logic (enumeration, classification, persistence, lookups)
/// lives in the [`image-manifest-core`] crate. This module is strictly glue.
///
/// ## Commands
/// - `generate`: list the bucket, build and persist the manifest
///   (optionally followed by module emission)
/// - `emit-module`: embed an existing manifest into a generated Rust module
/// - `lookup`: resolve feature images from the persisted manifest
/// - `serve`: run the live lookup endpoint
///
/// For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`image-manifest-core`]: ../../image-manifest-core/
use crate::load_config::{load_config, CliConfig};
use crate::server::{routes, LookupState};
use crate::storage::R2Lister;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use image_manifest_core::codegen::emit_module;
use image_manifest_core::config::StorageConfig;
use image_manifest_core::contract::ArtifactSource;
use image_manifest_core::generate::{generate, GenerateConfig};
use image_manifest_core::resolve::{
    find_feature_images, get_primary_image_url, LocalFileSource, ManifestResolver, RemoteSource,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for image-manifest: index bucket images and resolve them for pages.
#[derive(Parser)]
#[clap(
    name = "image-manifest",
    version,
    about = "Index product and feature images in an object-storage bucket into a JSON manifest"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the bucket and (re)write the image manifest
    Generate {
        /// Path to the YAML settings file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Also regenerate the embedded Rust module afterwards
        #[clap(long)]
        emit_module: bool,
    },
    /// Embed the existing manifest into a generated Rust module
    EmitModule {
        /// Path to the YAML settings file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Print the images for a feature path and its primary image URL
    Lookup {
        /// Feature path, e.g. /atelier-zitron/echt/feature
        feature_path: String,
        /// Path to the YAML settings file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Fetch the manifest from this site instead of the local file
        #[clap(long)]
        base_url: Option<String>,
    },
    /// Serve the live lookup endpoint
    Serve {
        /// Path to the YAML settings file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Host to bind to (overrides the config file)
        #[clap(long)]
        host: Option<String>,
        /// Port to bind to (overrides the config file)
        #[clap(long)]
        port: Option<u16>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Generate {
            config,
            emit_module: with_module,
        } => {
            let config = load_config(config)?;
            run_generate(&config, with_module).await
        }
        Commands::EmitModule { config } => {
            let config = load_config(config)?;
            let report = emit_module(&config.manifest_path, &config.module_path, Utc::now())
                .context("Could not generate the manifest module; run `generate` first")?;
            println!(
                "Generated {} ({} feature categories, {} product categories)",
                config.module_path.display(),
                report.feature_categories,
                report.product_categories
            );
            Ok(())
        }
        Commands::Lookup {
            feature_path,
            config,
            base_url,
        } => {
            let config = load_config(config)?;
            match base_url {
                Some(base_url) => {
                    let source = RemoteSource::for_site(&base_url, &config.manifest_url);
                    run_lookup(source, &feature_path).await
                }
                None => run_lookup(LocalFileSource::new(&config.manifest_path), &feature_path).await,
            }
        }
        Commands::Serve { config, host, port } => {
            let mut config = load_config(config)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_serve(&config).await
        }
    }
}

async fn run_generate(config: &CliConfig, with_module: bool) -> Result<()> {
    let storage = StorageConfig::from_env()?;
    let lister = R2Lister::new(&storage);
    let generate_config = GenerateConfig {
        prefix: config.prefix.clone(),
        public_base_url: storage.public_base_url.clone(),
        manifest_path: config.manifest_path.clone(),
        module_path: with_module.then(|| config.module_path.clone()),
    };

    tracing::info!(command = "generate", "Starting manifest generation");
    let report = generate(&lister, &generate_config, Utc::now()).await?;

    println!("{}", report.summary());
    println!("Manifest saved to: {}", report.manifest_path.display());
    for (category, images) in &report.manifest.products {
        println!("  product {category}: {} images", images.len());
    }
    for (path, images) in &report.manifest.features {
        println!("  feature {path}: {} images", images.len());
    }
    if report.module.is_some() {
        println!("Module saved to: {}", config.module_path.display());
    }
    Ok(())
}

async fn run_lookup<S: ArtifactSource>(source: S, feature_path: &str) -> Result<()> {
    let resolver = ManifestResolver::new(source);
    let (mut images, available) = match resolver.load().await {
        Some(manifest) => (
            find_feature_images(&manifest, feature_path).to_vec(),
            manifest.features.len(),
        ),
        None => {
            tracing::warn!("No image manifest available, reporting no images");
            (Vec::new(), 0)
        }
    };
    let primary = get_primary_image_url(&mut images);

    let output = json!({
        "featurePath": feature_path,
        "featureCategories": available,
        "primaryImageUrl": primary,
        "images": images,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_serve(config: &CliConfig) -> Result<()> {
    let storage = StorageConfig::from_env()?;
    let lister = Arc::new(R2Lister::new(&storage));
    let state = LookupState::new(lister, &storage.public_base_url);
    let app = routes().with_state(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
