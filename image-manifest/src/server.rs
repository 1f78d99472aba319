//! Live lookup endpoint: lists image files under a bucket path on request.
//!
//! ## Routes
//! - `GET /api/r2-files/{*path}`: images under `path/`, listed live
//! - `GET /api/r2-files`: `400`, a path is required
//! - `GET /healthz`: liveness
//!
//! Independent of the offline manifest; nothing is cached. Every lookup
//! response allows any origin.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use image_manifest_core::builder::{filename_of, is_image_file};
use image_manifest_core::contract::ObjectLister;
use image_manifest_core::enumerate::collect_objects;
use image_manifest_core::manifest::iso_timestamp;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

pub const EXAMPLE_PATH: &str = "/api/r2-files/products/schoppel/albmerino/farben";

/// Shared state carried to every handler.
#[derive(Clone)]
pub struct LookupState {
    pub lister: Arc<dyn ObjectLister>,
    pub public_base_url: String,
}

impl LookupState {
    pub fn new(lister: Arc<dyn ObjectLister>, public_base_url: &str) -> Self {
        LookupState {
            lister,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub key: String,
    pub filename: String,
    pub size: u64,
    pub last_modified: Option<String>,
    pub is_image: bool,
    pub url: String,
}

pub fn routes() -> Router<LookupState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/r2-files", get(missing_path))
        .route("/api/r2-files/", get(missing_path))
        .route("/api/r2-files/{*path}", get(list_files))
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn missing_path() -> Response {
    bad_request("")
}

pub async fn list_files(State(state): State<LookupState>, Path(path): Path<String>) -> Response {
    if path.trim().is_empty() {
        return bad_request(&path);
    }
    let prefix = if path.ends_with('/') {
        path.clone()
    } else {
        format!("{path}/")
    };
    info!(path = %path, prefix = %prefix, "Listing files for lookup");

    match collect_objects(state.lister.as_ref(), &prefix).await {
        Ok(objects) => {
            let total_files = objects.len();
            let files: Vec<FileInfo> = objects
                .into_iter()
                .map(|object| {
                    let filename = filename_of(&object.key).to_string();
                    FileInfo {
                        is_image: is_image_file(&filename),
                        url: format!("{}/{}", state.public_base_url, object.key),
                        size: object.size.unwrap_or(0),
                        last_modified: object.last_modified.map(iso_timestamp),
                        key: object.key,
                        filename,
                    }
                })
                .filter(|file| file.is_image)
                .collect();
            info!(prefix = %prefix, images = files.len(), total_files, "Lookup complete");

            with_cors(
                StatusCode::OK,
                json!({
                    "success": true,
                    "pathParam": path,
                    "prefix": prefix,
                    "totalFiles": total_files,
                    "imageFiles": files.len(),
                    "files": files,
                }),
            )
        }
        Err(e) => {
            error!(error = %e, prefix = %prefix, "Lookup listing failed");
            with_cors(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to fetch files from bucket",
                    "details": e.to_string(),
                    "pathParam": path,
                    "prefix": prefix,
                }),
            )
        }
    }
}

fn bad_request(received: &str) -> Response {
    with_cors(
        StatusCode::BAD_REQUEST,
        json!({
            "error": "Path parameter required",
            "example": EXAMPLE_PATH,
            "received": received,
        }),
    )
}

fn with_cors(status: StatusCode, body: serde_json::Value) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
