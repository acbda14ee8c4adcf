//! Deterministic in-process stand-ins for the storage and vision providers.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use media_service::{DetectedLabel, LabelDetector, MediaError, MediaService, ObjectStorage, ObjectSummary};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://media-test.s3.amazonaws.com/";

struct StoredObject {
    key: String,
    body: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Bucket kept in memory, listed in insertion order
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<Vec<StoredObject>>,
    writes: AtomicUsize,
    /// When set, listings return nothing, like a lagging eventually
    /// consistent listing right after a write
    stale_listing: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stale_listing(&self, stale: bool) {
        self.stale_listing.store(stale, Ordering::SeqCst);
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        let objects = self.objects.lock().unwrap();
        objects
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Deterministic clock: one minute per write
    fn next_timestamp(&self) -> DateTime<Utc> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) as i64;
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(n)
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), MediaError> {
        let last_modified = self.next_timestamp();
        let mut objects = self.objects.lock().unwrap();

        let object = StoredObject {
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
            last_modified,
        };

        match objects.iter_mut().find(|o| o.key == key) {
            Some(existing) => *existing = object,
            None => objects.push(object),
        }
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, MediaError> {
        if self.stale_listing.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .map(|o| ObjectSummary {
                key: o.key.clone(),
                last_modified: o.last_modified,
                size: o.body.len() as i64,
            })
            .collect())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        let objects = self.objects.lock().unwrap();
        objects
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.body.clone())
            .ok_or_else(|| MediaError::ObjectRead {
                key: key.to_string(),
                message: "NoSuchKey".to_string(),
            })
    }
}

/// Detector answering from a table keyed by image content
///
/// Applies the same limits the real provider does: labels under
/// `min_confidence` are dropped and at most `max_labels` are returned.
#[derive(Default)]
pub struct ScriptedDetector {
    labels: Mutex<HashMap<Vec<u8>, Vec<DetectedLabel>>>,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, image: &[u8], labels: &[(&str, f32)]) {
        let labels = labels
            .iter()
            .map(|(name, confidence)| DetectedLabel {
                name: name.to_string(),
                confidence: *confidence,
            })
            .collect();
        self.labels.lock().unwrap().insert(image.to_vec(), labels);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LabelDetector for ScriptedDetector {
    async fn detect_labels(
        &self,
        image_bytes: Vec<u8>,
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>, MediaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(MediaError::Detection("ThrottlingException".to_string()));
        }

        let labels = self.labels.lock().unwrap();
        Ok(labels
            .get(&image_bytes)
            .map(|labels| {
                labels
                    .iter()
                    .filter(|l| l.confidence >= min_confidence)
                    .take(max_labels as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub struct Harness {
    pub storage: Arc<InMemoryStorage>,
    pub detector: Arc<ScriptedDetector>,
    pub media: Arc<MediaService>,
}

pub fn harness() -> Harness {
    let storage = Arc::new(InMemoryStorage::new());
    let detector = Arc::new(ScriptedDetector::new());
    let media = Arc::new(MediaService::new(
        storage.clone(),
        detector.clone(),
        BASE_URL,
    ));

    Harness {
        storage,
        detector,
        media,
    }
}
