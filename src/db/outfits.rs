use std::sync::Arc;

use serde_json::json;

use super::documents::{from_documents, to_document, DocumentStore, OUTFITS};
use crate::{
    error::{AppError, AppResult},
    models::{Outfit, Tags},
};

/// Outfit records of every wardrobe
#[derive(Clone)]
pub struct OutfitRepository {
    docs: Arc<dyn DocumentStore>,
}

impl OutfitRepository {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    pub async fn insert(&self, outfit: &Outfit) -> AppResult<()> {
        self.docs.insert(OUTFITS, to_document(outfit)?).await
    }

    pub async fn list(&self, wardrobe_id: &str) -> AppResult<Vec<Outfit>> {
        let docs = self.docs.find_by(OUTFITS, "wardrobe_id", wardrobe_id).await?;
        from_documents(docs)
    }

    /// Looks up an outfit only within the given wardrobe
    pub async fn find(&self, wardrobe_id: &str, outfit_id: &str) -> AppResult<Option<Outfit>> {
        let docs = self.docs.find_by(OUTFITS, "outfit_id", outfit_id).await?;
        Ok(from_documents::<Outfit>(docs)?
            .into_iter()
            .find(|o| o.wardrobe_id == wardrobe_id))
    }

    async fn require(&self, wardrobe_id: &str, outfit_id: &str) -> AppResult<Outfit> {
        self.find(wardrobe_id, outfit_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Outfit {} not found", outfit_id)))
    }

    /// Replaces the tags of an outfit in the wardrobe
    pub async fn update_tags(&self, wardrobe_id: &str, outfit_id: &str, tags: Tags) -> AppResult<Outfit> {
        let mut outfit = self.require(wardrobe_id, outfit_id).await?;

        self.docs
            .update_fields(OUTFITS, "outfit_id", outfit_id, json!({ "tags": tags }))
            .await?;

        outfit.tags = tags;
        Ok(outfit)
    }

    /// Deletes an outfit from the wardrobe and returns the removed record
    pub async fn delete(&self, wardrobe_id: &str, outfit_id: &str) -> AppResult<Outfit> {
        let outfit = self.require(wardrobe_id, outfit_id).await?;
        self.docs.delete_many(OUTFITS, "outfit_id", outfit_id).await?;
        Ok(outfit)
    }

    /// Deletes every outfit of a wardrobe; returns the removed records
    pub async fn delete_wardrobe(&self, wardrobe_id: &str) -> AppResult<Vec<Outfit>> {
        let outfits = self.list(wardrobe_id).await?;
        self.docs.delete_many(OUTFITS, "wardrobe_id", wardrobe_id).await?;
        Ok(outfits)
    }
}
