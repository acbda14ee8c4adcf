use crate::config::S3Config;
use crate::error::MediaError;
use crate::image::ObjectSummary;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// Object storage operations the media service relies on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write an object, replacing any existing object with the same key
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), MediaError>;

    /// List the bucket. Only the first page the provider returns is reflected.
    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, MediaError>;

    /// Fetch the full content of an object
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, MediaError>;
}

/// S3-backed object storage for a single bucket
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 storage adapter
    pub async fn new(config: &S3Config) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        // Custom endpoint for MinIO/LocalStack
        if let Some(ref endpoint_url) = config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        info!(
            bucket = %config.bucket,
            region = %config.region,
            "S3 storage initialized"
        );

        Self::from_client(client, config.bucket.clone())
    }

    /// Wrap an already configured client
    pub fn from_client(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    #[instrument(skip(self, body), fields(bucket = %self.bucket, size_bytes = body.len()))]
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), MediaError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| MediaError::Storage(format!("put {key}: {}", DisplayErrorContext(&e))))?;

        debug!(key = %key, "Object written");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, MediaError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| MediaError::Storage(format!("list: {}", DisplayErrorContext(&e))))?;

        if response.is_truncated().unwrap_or(false) {
            warn!("Bucket listing truncated, only the first page is returned");
        }

        let summaries: Vec<ObjectSummary> = response
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?;
                let last_modified = obj
                    .last_modified()
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))?;

                Some(ObjectSummary {
                    key: key.to_string(),
                    last_modified,
                    size: obj.size().unwrap_or_default(),
                })
            })
            .collect();

        debug!(count = summaries.len(), "Listed objects");
        Ok(summaries)
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| MediaError::Storage(format!("get {key}: {}", DisplayErrorContext(&e))))?;

        let data = output.body.collect().await.map_err(|e| MediaError::ObjectRead {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(data.into_bytes().to_vec())
    }
}

/// Derive the object key for an uploaded file: its final path component
pub fn object_key_for(file_name: &str) -> Option<&str> {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

/// Get content type from the file extension
pub fn content_type_for(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();

    match extension.to_lowercase().as_str() {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
