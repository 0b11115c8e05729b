//! Represents a user record held in the document store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Name of the identifier attribute as it appears on the wire and in stored documents.
pub const ID_FIELD: &str = "_id";

/// A user document.
///
/// `name` and `email` are set at creation; any other attribute merged in by an
/// update is kept as-is, so the record stays schema-flexible.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    /// Identifier generated when the record is created.
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Every other attribute of the document, `name` and `email` included.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Body accepted by `POST /usuarios`.
#[derive(Deserialize, Debug, Default)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A create request that passed the presence checks.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// Returns a draft when both `name` and `email` are present and non-empty.
    pub fn into_draft(self) -> Option<UserDraft> {
        match (self.name, self.email) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                Some(UserDraft { name, email })
            }
            _ => None,
        }
    }
}

impl User {
    /// Build a fresh record with a newly generated identifier.
    pub fn create(draft: UserDraft) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(draft.name));
        fields.insert("email".into(), Value::String(draft.email));
        Self {
            id: Uuid::new_v4(),
            fields,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.fields.get("email").and_then(Value::as_str)
    }

    /// Overwrite the record's attributes with those in `patch`.
    ///
    /// Attributes absent from `patch` are left untouched. The identifier never changes.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            self.fields.insert(key, value);
        }
    }
}
