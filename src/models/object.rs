//! Represents objects (files) stored in a bucket.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor returned when listing the objects of a bucket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectDescriptor {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Timestamp when the object was last modified.
    pub last_modified: Option<DateTime<Utc>>,

    /// Entity tag reported by the service, quotes included.
    #[serde(rename = "ETag")]
    pub etag: Option<String>,

    /// Size in bytes.
    pub size: Option<i64>,

    /// Storage class (e.g., STANDARD, GLACIER).
    pub storage_class: Option<String>,
}

/// A file received from a client, fully buffered, ready to be forwarded.
#[derive(Clone, Debug)]
pub struct ObjectUpload {
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Metadata the storage service generated for an accepted upload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UploadReceipt {
    #[serde(rename = "ETag")]
    pub etag: Option<String>,

    /// Address at which the object can be fetched.
    pub location: String,

    pub key: String,

    pub bucket: String,

    /// Version identifier when the bucket has versioning enabled.
    pub version_id: Option<String>,
}
