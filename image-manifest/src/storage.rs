//! # S3-compatible listing client
//!
//! Bridges the core [`ObjectLister`] trait to a real bucket through
//! `aws-sdk-s3` (`ListObjectsV2`), pointed at the R2 endpoint with path-style
//! addressing and static credentials from [`StorageConfig`].

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use chrono::{DateTime, Utc};
use image_manifest_core::config::StorageConfig;
use image_manifest_core::contract::{ListPage, ListRequest, ObjectEntry, ObjectLister};
use image_manifest_core::{ManifestError, Result};

pub struct R2Lister {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl R2Lister {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "image-manifest-env",
        );
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        tracing::info!(
            endpoint = %config.endpoint,
            bucket = %config.bucket_name,
            "Initialized R2 listing client"
        );
        R2Lister {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket_name.clone(),
        }
    }
}

#[async_trait]
impl ObjectLister for R2Lister {
    async fn list_page(&self, req: ListRequest) -> Result<ListPage> {
        let mut call = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&req.prefix)
            .max_keys(req.max_keys);
        if let Some(token) = req.continuation_token {
            call = call.continuation_token(token);
        }

        let response = call.send().await.map_err(|e| {
            tracing::error!(error = ?e, bucket = %self.bucket, prefix = %req.prefix, "list_objects_v2 failed");
            ManifestError::Transport(format!("list_objects_v2 failed: {e}"))
        })?;

        let objects: Vec<ObjectEntry> = response
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ObjectEntry {
                    key: key.to_string(),
                    size: object.size().and_then(|size| u64::try_from(size).ok()),
                    last_modified: object
                        .last_modified()
                        .and_then(|at| DateTime::<Utc>::from_timestamp(at.secs(), at.subsec_nanos())),
                })
            })
            .collect();

        let next_continuation_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %req.prefix,
            objects = objects.len(),
            truncated = next_continuation_token.is_some(),
            "Listed bucket page"
        );
        Ok(ListPage {
            objects,
            next_continuation_token,
        })
    }
}
