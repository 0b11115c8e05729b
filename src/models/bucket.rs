//! Represents a bucket as reported by the object-storage service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor returned when listing buckets.
///
/// Field names follow the storage service's own naming so clients see the
/// same shape they would get from the service directly.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BucketDescriptor {
    /// Bucket name.
    pub name: String,

    /// When the bucket was created, if the service reports it.
    pub creation_date: Option<DateTime<Utc>>,
}
