use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::documents::{field_matches, merge_fields, DocumentStore};
use crate::error::AppResult;

/// In-process document store used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, doc: Value) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    async fn find_by(&self, collection: &str, field: &str, value: &str) -> AppResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| field_matches(doc, field, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_many(&self, collection: &str, field: &str, value: &str) -> AppResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|doc| !field_matches(doc, field, value));
        Ok((before - docs.len()) as u64)
    }

    async fn update_fields(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        partial: Value,
    ) -> AppResult<u64> {
        let mut collections = self.collections.write().await;
        let mut updated = 0;

        if let Some(docs) = collections.get_mut(collection) {
            for doc in docs.iter_mut().filter(|doc| field_matches(doc, field, value)) {
                merge_fields(doc, &partial);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn replace_by(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        doc: Value,
    ) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        docs.retain(|existing| !field_matches(existing, field, value));
        docs.push(doc);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
