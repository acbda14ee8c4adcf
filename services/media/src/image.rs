use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata for one entry of a bucket listing
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: i64,
}

/// A stored image as returned by the API
///
/// Records are derived views over the bucket listing and are only ever built
/// from an [`ObjectSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    /// Public URL of the object
    pub url: String,
    /// Object key, which is also the uploaded file name
    pub name: String,
    /// Last-modified time reported by the bucket
    #[serde(serialize_with = "date_format::serialize")]
    pub date: DateTime<Utc>,
    /// Object size in bytes
    pub size: i64,
}

impl ImageRecord {
    /// Build a record from a listing entry. The URL is the base URL followed
    /// directly by the key.
    pub fn from_summary(public_base_url: &str, summary: &ObjectSummary) -> Self {
        Self {
            url: format!("{}{}", public_base_url, summary.key),
            name: summary.key.clone(),
            date: summary.last_modified,
            size: summary.size,
        }
    }
}

/// `yyyy-MM-dd HH:mm AM/PM TZ`, rendered in UTC
mod date_format {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%d %H:%M %p %Z";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }
}
