//! S3 client implementation.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket holding source videos and published clips
    pub bucket_name: String,
    /// Region
    pub region: String,
    /// Optional custom endpoint (S3-compatible stores)
    pub endpoint_url: Option<String>,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            bucket_name: std::env::var("S3_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("S3_BUCKET_NAME not set"))?,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok(),
        })
    }
}

/// Content-store client for source videos and published clips.
///
/// Credentials come from the default AWS provider chain.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        Ok(Self {
            client,
            bucket: config.bucket_name,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// Download an object as bytes.
    ///
    /// A missing key maps to `NotFound` and an access-denied response to
    /// `Forbidden`; every other backend error is a `DownloadFailed`.
    pub async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service = e.into_service_error();
                if service.is_no_such_key() {
                    StorageError::not_found(key)
                } else {
                    match service.code() {
                        Some("AccessDenied") => StorageError::forbidden(key),
                        _ => StorageError::download_failed(service.to_string()),
                    }
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    /// Download an object to a file.
    pub async fn download_file(&self, key: &str, path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Downloading {} to {}", key, path.display());

        let bytes = self.download_bytes(key).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, bytes).await?;

        info!("Downloaded {} to {}", key, path.display());
        Ok(())
    }

    /// Upload a file.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.into_service_error().to_string()))?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_bucket() {
        std::env::remove_var("S3_BUCKET_NAME");
        assert!(matches!(
            S3Config::from_env(),
            Err(StorageError::ConfigError(_))
        ));

        std::env::set_var("S3_BUCKET_NAME", "podclip-test");
        let config = S3Config::from_env().unwrap();
        assert_eq!(config.bucket_name, "podclip-test");
        std::env::remove_var("S3_BUCKET_NAME");
    }

    #[test]
    fn test_not_found_error_names_key() {
        let err = StorageError::not_found("test1/missing.mp4");
        assert!(err.to_string().contains("test1/missing.mp4"));
    }
}
