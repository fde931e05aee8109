//! Clothing photo tagging.
//!
//! Classification is behind the `Tagger` trait so the random placeholder
//! can be replaced by a model-backed implementation without touching callers.
use image::DynamicImage;

use crate::{
    error::{AppError, AppResult},
    models::Tags,
};

pub mod random;
pub mod taxonomy;

pub use random::RandomTagger;
pub use taxonomy::{CategoryGroup, Taxonomy};

pub const CATEGORY_GROUP_KEY: &str = "categoryGroup";
pub const CATEGORY_KEY: &str = "category";

/// Picks one label for an attribute of an image
pub trait Tagger: Send + Sync {
    /// Returns one of `labels`, or `None` when `labels` is empty
    fn label(&self, image: &DynamicImage, attribute: &str, labels: &[String]) -> Option<String>;

    fn name(&self) -> &'static str;
}

/// Tags an image with its category group, category, the group's specific
/// attributes and all generic attributes. Attributes with no labels are skipped.
///
/// CPU-bound; call from a blocking task.
pub fn tag_image(tagger: &dyn Tagger, taxonomy: &Taxonomy, image: &DynamicImage) -> AppResult<Tags> {
    let group_names = taxonomy.group_names();
    let group = tagger
        .label(image, "Category", &group_names)
        .ok_or_else(|| AppError::Internal("Tag taxonomy has no category groups".to_string()))?;

    let mut tags = Tags::new();

    if let Some(category) = taxonomy
        .category_groups
        .get(&group)
        .and_then(|g| tagger.label(image, &group, &g.categories))
    {
        tags.insert(CATEGORY_KEY.to_string(), category);
    }

    if let Some(attributes) = taxonomy.specific_attributes.get(&group) {
        for (attribute, labels) in attributes {
            if let Some(value) = tagger.label(image, attribute, labels) {
                tags.insert(attribute.clone(), value);
            }
        }
    }

    for (attribute, labels) in &taxonomy.generic_attributes {
        if let Some(value) = tagger.label(image, attribute, labels) {
            tags.insert(attribute.clone(), value);
        }
    }

    tags.insert(CATEGORY_GROUP_KEY.to_string(), group);

    tracing::debug!(tagger = tagger.name(), tags = tags.len(), "Image tagged");

    Ok(tags)
}
