//! Shared fixtures for the router integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;
use user_bucket_api::{
    AppState, app,
    models::{
        bucket::BucketDescriptor,
        object::{ObjectDescriptor, ObjectUpload, UploadReceipt},
        user::{User, UserDraft},
    },
    services::{
        object_storage::{ObjectStorage, ObjectStorageError, ObjectStorageResult},
        user_store::{SqliteUserStore, UserStore, UserStoreError, UserStoreResult},
    },
};

pub const BOUNDARY: &str = "X-TEST-BOUNDARY";

/// A call the fake storage received.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageCall {
    ListBuckets,
    ListObjects(String),
    Put {
        bucket: String,
        key: String,
        content_type: String,
        body: Vec<u8>,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

/// In-memory [`ObjectStorage`] that records every call and can be told to fail.
#[derive(Default)]
pub struct FakeStorage {
    pub calls: Mutex<Vec<StorageCall>>,
    pub fail: bool,
}

impl FakeStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StorageCall, operation: &'static str) -> ObjectStorageResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(ObjectStorageError::Service {
                operation,
                code: Some("InternalError".into()),
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn list_buckets(&self) -> ObjectStorageResult<Vec<BucketDescriptor>> {
        self.record(StorageCall::ListBuckets, "ListBuckets")?;
        Ok(vec![BucketDescriptor {
            name: "fotos".into(),
            creation_date: None,
        }])
    }

    async fn list_objects(&self, bucket: &str) -> ObjectStorageResult<Vec<ObjectDescriptor>> {
        self.record(StorageCall::ListObjects(bucket.into()), "ListObjectsV2")?;
        Ok(vec![ObjectDescriptor {
            key: "a.png".into(),
            last_modified: None,
            etag: Some("\"abc\"".into()),
            size: Some(3),
            storage_class: Some("STANDARD".into()),
        }])
    }

    async fn put_object(
        &self,
        bucket: &str,
        upload: ObjectUpload,
    ) -> ObjectStorageResult<UploadReceipt> {
        self.record(
            StorageCall::Put {
                bucket: bucket.into(),
                key: upload.key.clone(),
                content_type: upload.content_type.clone(),
                body: upload.body.to_vec(),
            },
            "PutObject",
        )?;
        Ok(UploadReceipt {
            etag: Some("\"etag-1\"".into()),
            location: format!("http://storage.test/{}/{}", bucket, upload.key),
            key: upload.key,
            bucket: bucket.into(),
            version_id: None,
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        self.record(
            StorageCall::Delete {
                bucket: bucket.into(),
                key: key.into(),
            },
            "DeleteObject",
        )
    }
}

/// [`UserStore`] whose every call fails as if the database were unreachable.
pub struct UnreachableUserStore;

fn store_down<T>() -> UserStoreResult<T> {
    Err(UserStoreError::Sqlx(sqlx::Error::PoolClosed))
}

#[async_trait]
impl UserStore for UnreachableUserStore {
    async fn create(&self, _draft: UserDraft) -> UserStoreResult<User> {
        store_down()
    }

    async fn list(&self) -> UserStoreResult<Vec<User>> {
        store_down()
    }

    async fn find(&self, _id: &str) -> UserStoreResult<Option<User>> {
        store_down()
    }

    async fn update(
        &self,
        _id: &str,
        _patch: serde_json::Map<String, Value>,
    ) -> UserStoreResult<Option<User>> {
        store_down()
    }

    async fn delete(&self, _id: &str) -> UserStoreResult<bool> {
        store_down()
    }

    async fn check_connection(&self) -> UserStoreResult<Option<User>> {
        store_down()
    }

    async fn ping(&self) -> UserStoreResult<()> {
        store_down()
    }
}

/// Everything a test needs: the router plus handles to the backing services.
pub struct TestApp {
    pub router: Router,
    pub users: SqliteUserStore,
    pub storage: Arc<FakeStorage>,
    _dir: TempDir,
}

pub async fn test_app() -> TestApp {
    test_app_with(FakeStorage::default()).await
}

pub async fn test_app_with(storage: FakeStorage) -> TestApp {
    build(storage, None).await
}

/// An app whose document store fails every call.
pub async fn test_app_with_unreachable_store() -> TestApp {
    build(FakeStorage::default(), Some(Arc::new(UnreachableUserStore))).await
}

async fn build(storage: FakeStorage, routed_users: Option<Arc<dyn UserStore>>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("users.db").display());
    let users = SqliteUserStore::connect(&url, 2).await.unwrap();
    users.migrate().await.unwrap();

    let storage = Arc::new(storage);
    let routed_users = routed_users.unwrap_or_else(|| Arc::new(users.clone()));
    let state = AppState::new(routed_users, storage.clone());

    TestApp {
        router: app(state),
        users,
        storage,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        let bytes = read_body(response).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, value)
    }
}

pub async fn read_body(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// One part of a hand-built `multipart/form-data` body.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, file_name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(bucket: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(format!("/buckets/{}/upload", bucket))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}
