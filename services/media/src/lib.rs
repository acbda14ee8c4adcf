//! Media Service
//!
//! Small HTTP service that stores uploaded images in an S3 bucket, lists the
//! bucket's contents, and searches images by a visual label detected with
//! AWS Rekognition.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!   HTTP  ──────▶ │ API (axum)   │
//!                 └──────────────┘
//!                        │
//!                        ▼
//!                 ┌──────────────┐
//!                 │ MediaService │
//!                 └──────────────┘
//!                   │          │
//!                   ▼          ▼
//!          ┌──────────────┐  ┌──────────────┐
//!          │ ObjectStorage│  │ LabelDetector│
//!          │ (S3)         │  │ (Rekognition)│
//!          └──────────────┘  └──────────────┘
//! ```
//!
//! The service keeps no state of its own. Image records are derived from the
//! bucket listing on every request, and a label search downloads and
//! classifies every object in the bucket.

pub mod api;
pub mod config;
pub mod error;
pub mod image;
pub mod labels;
pub mod service;
pub mod storage;

pub use api::{create_router, start_api_server, AppState};
pub use config::Config;
pub use error::MediaError;
pub use image::{ImageRecord, ObjectSummary};
pub use labels::{normalize_label, DetectedLabel, LabelDetector, RekognitionDetector};
pub use service::MediaService;
pub use storage::{ObjectStorage, S3Storage};
