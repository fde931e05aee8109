//! Schemaless document storage.
//!
//! Records are JSON objects grouped into named collections and addressed by
//! the string value of one top-level field.
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub const OUTFITS: &str = "outfits";
pub const WEEKLY_PLANS: &str = "weekly_plans";
pub const USERS: &str = "users";

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, doc: Value) -> AppResult<()>;

    /// Documents whose `field` equals `value`, in insertion order
    async fn find_by(&self, collection: &str, field: &str, value: &str) -> AppResult<Vec<Value>>;

    /// Returns the number of deleted documents
    async fn delete_many(&self, collection: &str, field: &str, value: &str) -> AppResult<u64>;

    /// Shallow-merges `partial` into every matching document; returns the match count
    async fn update_fields(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        partial: Value,
    ) -> AppResult<u64>;

    /// Atomically deletes every matching document and inserts `doc`
    async fn replace_by(&self, collection: &str, field: &str, value: &str, doc: Value)
        -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

pub fn to_document<T: Serialize>(record: &T) -> AppResult<Value> {
    let doc = serde_json::to_value(record)
        .map_err(|e| AppError::Internal(format!("Document serialization error: {}", e)))?;

    if !doc.is_object() {
        return Err(AppError::Internal("Documents must be JSON objects".to_string()));
    }
    Ok(doc)
}

pub fn from_documents<T: DeserializeOwned>(docs: Vec<Value>) -> AppResult<Vec<T>> {
    docs.into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| AppError::Internal(format!("Document deserialization error: {}", e)))
        })
        .collect()
}

/// Whether a document's top-level `field` is the string `value`
pub fn field_matches(doc: &Value, field: &str, value: &str) -> bool {
    doc.get(field).and_then(Value::as_str) == Some(value)
}

/// Copies the top-level keys of `partial` into `doc`
pub fn merge_fields(doc: &mut Value, partial: &Value) {
    if let (Some(target), Some(source)) = (doc.as_object_mut(), partial.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}
