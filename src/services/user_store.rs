//! src/services/user_store.rs
//!
//! UserStore — the document store holding user records. The production
//! implementation keeps each record as a JSON document in SQLite; handlers only
//! see the [`UserStore`] trait so tests can swap in their own store.

use crate::models::user::{User, UserDraft};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{
    Connection, FromRow, SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("`{0}` is not a valid user id")]
    InvalidId(String),
    #[error("user document could not be encoded or decoded: {0}")]
    Document(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type UserStoreResult<T> = Result<T, UserStoreError>;

/// Operations the user routes need from the document store.
///
/// Identifiers arrive as raw path segments; implementations reject the ones
/// they cannot interpret with [`UserStoreError::InvalidId`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new record with a freshly generated identifier.
    async fn create(&self, draft: UserDraft) -> UserStoreResult<User>;

    /// Every record, in whatever order the store yields them.
    async fn list(&self) -> UserStoreResult<Vec<User>>;

    async fn find(&self, id: &str) -> UserStoreResult<Option<User>>;

    /// Merge `patch` into the record and return the result, or `None` if absent.
    async fn update(&self, id: &str, patch: Map<String, Value>) -> UserStoreResult<Option<User>>;

    /// Remove the record. Returns whether a record was removed.
    async fn delete(&self, id: &str) -> UserStoreResult<bool>;

    /// Open a dedicated connection, read at most one record and close it again.
    async fn check_connection(&self) -> UserStoreResult<Option<User>>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> UserStoreResult<()>;
}

/// Row layout of the `users` table.
#[derive(FromRow, Debug)]
struct UserRow {
    id: String,
    document: String,
}

impl UserRow {
    fn into_user(self) -> UserStoreResult<User> {
        let id = Uuid::parse_str(&self.id).map_err(|_| UserStoreError::InvalidId(self.id))?;
        let fields: Map<String, Value> = serde_json::from_str(&self.document)?;
        Ok(User { id, fields })
    }
}

/// SQLite-backed [`UserStore`].
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Connect to the database at `url`, creating the file when it is missing.
    pub async fn connect(url: &str, max_connections: u32) -> UserStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the bundled schema. Every statement is idempotent.
    pub async fn migrate(&self) -> UserStoreResult<usize> {
        let statements = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        for stmt in &statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&self.pool).await?;
        }

        Ok(statements.len())
    }
}

fn parse_id(id: &str) -> UserStoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| UserStoreError::InvalidId(id.to_string()))
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create(&self, draft: UserDraft) -> UserStoreResult<User> {
        let user = User::create(draft);
        let document = serde_json::to_string(&user.fields)?;

        sqlx::query("INSERT INTO users (id, document, created_at) VALUES (?, ?, ?)")
            .bind(user.id.to_string())
            .bind(document)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list(&self) -> UserStoreResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, document FROM users ORDER BY rowid ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn find(&self, id: &str) -> UserStoreResult<Option<User>> {
        let id = parse_id(id)?;
        let row: Option<UserRow> = sqlx::query_as("SELECT id, document FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update(&self, id: &str, patch: Map<String, Value>) -> UserStoreResult<Option<User>> {
        let id = parse_id(id)?;
        let mut tx = self.pool.begin().await?;

        let row: Option<UserRow> = sqlx::query_as("SELECT id, document FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut user = row.into_user()?;
        user.merge(patch);

        sqlx::query("UPDATE users SET document = ? WHERE id = ?")
            .bind(serde_json::to_string(&user.fields)?)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(user))
    }

    async fn delete(&self, id: &str) -> UserStoreResult<bool> {
        let id = parse_id(id)?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_connection(&self) -> UserStoreResult<Option<User>> {
        let options = self.pool.connect_options();
        let mut conn = SqliteConnection::connect_with(&*options).await?;
        debug!("opened dedicated connection for connectivity check");

        let found: Result<Option<UserRow>, sqlx::Error> =
            sqlx::query_as("SELECT id, document FROM users LIMIT 1")
                .fetch_optional(&mut conn)
                .await;
        let closed = conn.close().await;

        let row = found?;
        closed?;
        row.map(UserRow::into_user).transpose()
    }

    async fn ping(&self) -> UserStoreResult<()> {
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        debug!("document store answered ping with {}", one);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store() -> (SqliteUserStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("users.db").display());
        let store = SqliteUserStore::connect(&url, 2).await.unwrap();
        store.migrate().await.unwrap();
        (store, dir)
    }

    fn draft(name: &str, email: &str) -> UserDraft {
        UserDraft {
            name: name.into(),
            email: email.into(),
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn create_then_find_returns_same_fields() {
        let (store, _dir) = store().await;
        let created = store.create(draft("Ana", "ana@x.com")).await.unwrap();

        let found = store
            .find(&created.id.to_string())
            .await
            .unwrap()
            .expect("record should exist");
        assert_eq!(found, created);
        assert_eq!(found.name(), Some("Ana"));
        assert_eq!(found.email(), Some("ana@x.com"));
    }

    #[tokio::test]
    async fn created_ids_are_unique() {
        let (store, _dir) = store().await;
        let a = store.create(draft("Ana", "ana@x.com")).await.unwrap();
        let b = store.create(draft("Ana", "ana@x.com")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_merges_into_existing_document() {
        let (store, _dir) = store().await;
        let created = store.create(draft("Ana", "ana@x.com")).await.unwrap();
        let id = created.id.to_string();

        let updated = store
            .update(&id, object(json!({ "name": "X", "city": "Recife" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name(), Some("X"));
        assert_eq!(updated.email(), Some("ana@x.com"));

        let reloaded = store.find(&id).await.unwrap().unwrap();
        assert_eq!(reloaded.fields["city"], "Recife");
    }

    #[tokio::test]
    async fn update_of_missing_record_returns_none() {
        let (store, _dir) = store().await;
        let missing = Uuid::new_v4().to_string();
        let result = store
            .update(&missing, object(json!({ "name": "X" })))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let (store, _dir) = store().await;
        let created = store.create(draft("Ana", "ana@x.com")).await.unwrap();
        let id = created.id.to_string();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.find(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let (store, _dir) = store().await;
        let err = store.find("not-an-id").await.unwrap_err();
        assert!(matches!(err, UserStoreError::InvalidId(id) if id == "not-an-id"));
    }

    #[tokio::test]
    async fn check_connection_leaves_pool_usable() {
        let (store, _dir) = store().await;
        assert!(store.check_connection().await.unwrap().is_none());

        store.create(draft("Ana", "ana@x.com")).await.unwrap();
        let first = store.check_connection().await.unwrap();
        assert_eq!(first.and_then(|u| u.name().map(str::to_owned)), Some("Ana".into()));

        store.ping().await.unwrap();
    }
}
