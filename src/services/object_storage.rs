//! src/services/object_storage.rs
//!
//! ObjectStorage — passthrough to a remote S3-compatible object-storage
//! service. Every method is a single SDK call; failures come back as
//! [`ObjectStorageError`] carrying the service's own error message.

use crate::models::{
    bucket::BucketDescriptor,
    object::{ObjectDescriptor, ObjectUpload, UploadReceipt},
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::{ByteStream, DateTime as SmithyDateTime},
};
use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

pub type ObjectStorageResult<T> = Result<T, ObjectStorageError>;

impl ObjectStorageError {
    fn from_sdk<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + StdError + 'static,
        R: std::fmt::Debug,
    {
        let code = err.code().map(str::to_owned);
        let message = DisplayErrorContext(&err).to_string();
        debug!(operation, ?code, "object storage call failed");
        Self::Service {
            operation,
            code,
            message,
        }
    }
}

/// Operations the bucket routes need from the object-storage service.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn list_buckets(&self) -> ObjectStorageResult<Vec<BucketDescriptor>>;

    /// First page of objects in `bucket`.
    async fn list_objects(&self, bucket: &str) -> ObjectStorageResult<Vec<ObjectDescriptor>>;

    /// Store `upload` under its key, replacing any existing object.
    async fn put_object(
        &self,
        bucket: &str,
        upload: ObjectUpload,
    ) -> ObjectStorageResult<UploadReceipt>;

    /// Remove `key`. Removing a key that does not exist succeeds.
    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()>;
}

/// Connection settings for [`S3ObjectStorage`].
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub region: String,
    /// Custom endpoint for S3-compatible services; `None` targets AWS.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

/// [`ObjectStorage`] backed by the AWS SDK client.
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: Client,
    settings: S3Settings,
}

impl S3ObjectStorage {
    /// Build a client from the ambient AWS configuration (credentials chain,
    /// profile) with the region and endpoint from `settings`.
    pub async fn connect(settings: S3Settings) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(settings.force_path_style);
        if let Some(endpoint) = settings.endpoint_url.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            settings,
        }
    }

    /// Public address of an object, in the same form the SDK upload helpers report.
    fn object_location(&self, bucket: &str, key: &str) -> String {
        match self.settings.endpoint_url.as_deref() {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
            None if self.settings.force_path_style => format!(
                "https://s3.{}.amazonaws.com/{}/{}",
                self.settings.region, bucket, key
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket, self.settings.region, key
            ),
        }
    }
}

fn to_chrono(ts: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn list_buckets(&self) -> ObjectStorageResult<Vec<BucketDescriptor>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| ObjectStorageError::from_sdk("ListBuckets", err))?;

        Ok(output
            .buckets()
            .iter()
            .map(|bucket| BucketDescriptor {
                name: bucket.name().unwrap_or_default().to_string(),
                creation_date: bucket.creation_date().and_then(to_chrono),
            })
            .collect())
    }

    async fn list_objects(&self, bucket: &str) -> ObjectStorageResult<Vec<ObjectDescriptor>> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| ObjectStorageError::from_sdk("ListObjectsV2", err))?;

        Ok(output
            .contents()
            .iter()
            .map(|object| ObjectDescriptor {
                key: object.key().unwrap_or_default().to_string(),
                last_modified: object.last_modified().and_then(to_chrono),
                etag: object.e_tag().map(str::to_owned),
                size: object.size(),
                storage_class: object.storage_class().map(|c| c.as_str().to_owned()),
            })
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        upload: ObjectUpload,
    ) -> ObjectStorageResult<UploadReceipt> {
        let location = self.object_location(bucket, &upload.key);
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(&upload.key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.body))
            .send()
            .await
            .map_err(|err| ObjectStorageError::from_sdk("PutObject", err))?;

        Ok(UploadReceipt {
            etag: output.e_tag().map(str::to_owned),
            location,
            key: upload.key,
            bucket: bucket.to_string(),
            version_id: output.version_id().map(str::to_owned),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| ObjectStorageError::from_sdk("DeleteObject", err))?;
        Ok(())
    }
}
