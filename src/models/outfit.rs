use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat tag map, e.g. `categoryGroup -> upperWear`, `color -> Navy`
pub type Tags = BTreeMap<String, String>;

/// A single clothing item in a user's wardrobe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outfit {
    pub outfit_id: String,
    /// Owning wardrobe; equal to the owner's user id
    pub wardrobe_id: String,
    pub image_url: String,
    /// Blob store identifier of the uploaded image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

impl Outfit {
    /// Creates a new outfit with a fresh id
    pub fn new(wardrobe_id: impl Into<String>, image_url: impl Into<String>, tags: Tags) -> Self {
        Self {
            outfit_id: Uuid::new_v4().to_string(),
            wardrobe_id: wardrobe_id.into(),
            image_url: image_url.into(),
            image_id: None,
            tags,
        }
    }

    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct UploadOutfitResponse {
    pub outfit_id: String,
    pub result: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GetOutfitsResponse {
    pub outfits: Vec<Outfit>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOutfitRequest {
    pub outfit_id: String,
    pub tags: Tags,
}

#[derive(Debug, Deserialize)]
pub struct DeleteOutfitQuery {
    pub outfit_id: String,
}

/// Generic `{result, message}` acknowledgement
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub result: bool,
    pub message: String,
}

impl ResultResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            result: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestOutfitRequest {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestOutfitResponse {
    pub outfits: Vec<Outfit>,
    pub composite_image_url: Option<String>,
    pub result: bool,
    pub message: String,
}
