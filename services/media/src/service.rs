use crate::error::MediaError;
use crate::image::{ImageRecord, ObjectSummary};
use crate::labels::{normalize_label, LabelDetector, MAX_LABELS, MIN_CONFIDENCE};
use crate::storage::{content_type_for, object_key_for, ObjectStorage};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Upload, listing and label search over a single bucket
pub struct MediaService {
    storage: Arc<dyn ObjectStorage>,
    detector: Arc<dyn LabelDetector>,
    public_base_url: String,
}

impl MediaService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        detector: Arc<dyn LabelDetector>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            detector,
            public_base_url: public_base_url.into(),
        }
    }

    /// Store an uploaded file under its file name and return the record
    /// from the listing that follows.
    ///
    /// Returns `Ok(None)` when the write succeeded but the listing does not
    /// show the key yet.
    #[instrument(skip(self, bytes), fields(size_bytes = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<ImageRecord>, MediaError> {
        let key = object_key_for(file_name)
            .ok_or_else(|| MediaError::InvalidFileName(file_name.to_string()))?;
        let size_bytes = bytes.len();

        self.storage
            .put_object(key, bytes, content_type_for(key))
            .await?;

        metrics::counter!("media.uploads").increment(1);
        metrics::counter!("media.bytes.uploaded").increment(size_bytes as u64);
        info!(key = %key, size_bytes, "Image uploaded");

        let record = self
            .storage
            .list_objects()
            .await?
            .iter()
            .find(|summary| summary.key == key)
            .map(|summary| self.to_record(summary));

        if record.is_none() {
            warn!(key = %key, "Uploaded image not visible in listing yet");
        }

        Ok(record)
    }

    /// List every image in the bucket, in provider order
    #[instrument(skip(self))]
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>, MediaError> {
        let images: Vec<ImageRecord> = self
            .storage
            .list_objects()
            .await?
            .iter()
            .map(|summary| self.to_record(summary))
            .collect();

        metrics::counter!("media.listings").increment(1);
        debug!(count = images.len(), "Listed images");
        Ok(images)
    }

    /// List the images whose detected labels include `label`
    ///
    /// Every object is downloaded and sent to the detector; the first
    /// failure aborts the search.
    #[instrument(skip(self))]
    pub async fn list_images_by_label(&self, label: &str) -> Result<Vec<ImageRecord>, MediaError> {
        let search_label = normalize_label(label);
        if search_label.is_empty() {
            return Ok(Vec::new());
        }

        metrics::counter!("media.label_searches").increment(1);
        let started = Instant::now();

        let summaries = self.storage.list_objects().await?;
        let mut images = Vec::new();

        for summary in &summaries {
            let bytes = self.storage.get_object(&summary.key).await?;

            metrics::counter!("media.detection.calls").increment(1);
            let labels = self
                .detector
                .detect_labels(bytes, MAX_LABELS, MIN_CONFIDENCE)
                .await?;

            let matched = labels
                .iter()
                .find(|l| l.confidence >= MIN_CONFIDENCE && l.name == search_label);

            if let Some(matched) = matched {
                info!(
                    key = %summary.key,
                    label = %matched.name,
                    confidence = matched.confidence,
                    "Label matched"
                );
                images.push(self.to_record(summary));
            }
        }

        metrics::counter!("media.label_matches").increment(images.len() as u64);
        metrics::histogram!("media.label_search.duration_seconds")
            .record(started.elapsed().as_secs_f64());

        info!(
            label = %search_label,
            scanned = summaries.len(),
            matched = images.len(),
            "Label search finished"
        );

        Ok(images)
    }

    fn to_record(&self, summary: &ObjectSummary) -> ImageRecord {
        ImageRecord::from_summary(&self.public_base_url, summary)
    }
}
