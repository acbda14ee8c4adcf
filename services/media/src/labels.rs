use crate::config::RekognitionConfig;
use crate::error::MediaError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::config::Builder as RekognitionConfigBuilder;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use aws_sdk_rekognition::Client as RekognitionClient;
use tracing::{debug, info, instrument};

/// Maximum number of labels requested per image
pub const MAX_LABELS: i32 = 10;

/// Minimum confidence (percent) for a label to count
pub const MIN_CONFIDENCE: f32 = 70.0;

/// A label detected on an image
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub name: String,
    /// Confidence in percent (0-100)
    pub confidence: f32,
}

/// Label detection on raw image bytes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect_labels(
        &self,
        image_bytes: Vec<u8>,
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>, MediaError>;
}

/// Rekognition `DetectLabels` client
pub struct RekognitionDetector {
    client: RekognitionClient,
}

impl RekognitionDetector {
    /// Create a detector in the given region
    pub async fn new(config: &RekognitionConfig, region: &str) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let mut builder = RekognitionConfigBuilder::from(&aws_config);
        if let Some(ref endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        info!(region = %region, "Rekognition detector initialized");

        Self::from_client(RekognitionClient::from_conf(builder.build()))
    }

    pub fn from_client(client: RekognitionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LabelDetector for RekognitionDetector {
    #[instrument(skip(self, image_bytes), fields(size_bytes = image_bytes.len()))]
    async fn detect_labels(
        &self,
        image_bytes: Vec<u8>,
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>, MediaError> {
        let image = Image::builder().bytes(Blob::new(image_bytes)).build();

        let output = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(max_labels)
            .min_confidence(min_confidence)
            .send()
            .await
            .map_err(|e| MediaError::Detection(DisplayErrorContext(&e).to_string()))?;

        let labels: Vec<DetectedLabel> = output
            .labels()
            .iter()
            .filter_map(|label| {
                Some(DetectedLabel {
                    name: label.name()?.to_string(),
                    confidence: label.confidence().unwrap_or_default(),
                })
            })
            .collect();

        debug!(count = labels.len(), "Labels detected");
        Ok(labels)
    }
}

/// Normalize a search label to the provider's casing: first letter
/// uppercase, the rest lowercase ("dOG" -> "Dog").
pub fn normalize_label(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
