//! S3 image storage

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use indieshout_domain::{ObjectStorage, StorageError};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

pub const DEFAULT_REGION: &str = "ap-northeast-2";

/// Connection settings for the image bucket
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket_name: String,
    pub region: String,
    /// Falls back to the default AWS credential chain when unset
    pub access_key_id: Option<SecretString>,
    pub secret_access_key: Option<SecretString>,
    /// CDN or custom domain serving the bucket
    pub public_base_url: Option<String>,
    /// S3-compatible endpoint; requests then use path-style addressing
    pub endpoint_url: Option<String>,
}

impl S3Settings {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            region: DEFAULT_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
            public_base_url: None,
            endpoint_url: None,
        }
    }

    /// Public URL an object is served from
    pub fn object_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket_name, self.region, key
            ),
        }
    }
}

pub struct S3Storage {
    client: Client,
    settings: S3Settings,
}

impl S3Storage {
    pub async fn connect(settings: S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let (Some(key_id), Some(secret)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id.expose_secret(),
                secret.expose_secret(),
                None,
                None,
                "indieshout-config",
            ));
        }

        let sdk_config = loader.load().await;
        let mut config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            config = config.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(config.build()),
            settings,
        }
    }

    pub fn settings(&self) -> &S3Settings {
        &self.settings
    }
}

/// MIME type from the file extension
pub(crate) fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, file_path: &Path, key: &str) -> Result<String, StorageError> {
        if !file_path.is_file() {
            return Err(StorageError::NotFound(file_path.display().to_string()));
        }

        let body = tokio::fs::read(file_path).await?;
        let content_type = content_type_for(file_path);

        self.client
            .put_object()
            .bucket(&self.settings.bucket_name)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("Upload of {} failed: {}", key, e)))?;

        let url = self.settings.object_url(key);
        tracing::info!(key = %key, url = %url, "Uploaded object");
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.settings.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("Delete of {} failed: {}", key, e)))?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.settings.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(StorageError::Remote(e.to_string())),
        }
    }
}
