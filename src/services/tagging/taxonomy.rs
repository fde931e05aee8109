use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

const CATEGORIES_JSON: &str = include_str!("../../../tags/categories.json");
const SPECIFIC_ATTRIBUTES_JSON: &str = include_str!("../../../tags/specific_attributes.json");
const GENERIC_ATTRIBUTES_JSON: &str = include_str!("../../../tags/generic_attributes.json");

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CategoryGroup {
    pub label: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoriesFile {
    category_groups: BTreeMap<String, CategoryGroup>,
}

/// Label vocabulary used to tag clothing photos
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    /// Category groups (e.g. `upperWear`) and their categories
    pub category_groups: BTreeMap<String, CategoryGroup>,
    /// Attributes that only apply to one category group
    pub specific_attributes: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Attributes that apply to every item (color, season, ...)
    pub generic_attributes: BTreeMap<String, Vec<String>>,
}

impl Taxonomy {
    /// Taxonomy bundled with the binary
    pub fn builtin() -> serde_json::Result<Self> {
        Self::from_json(
            CATEGORIES_JSON,
            SPECIFIC_ATTRIBUTES_JSON,
            GENERIC_ATTRIBUTES_JSON,
        )
    }

    pub fn from_json(
        categories: &str,
        specific_attributes: &str,
        generic_attributes: &str,
    ) -> serde_json::Result<Self> {
        let categories: CategoriesFile = serde_json::from_str(categories)?;
        Ok(Self {
            category_groups: categories.category_groups,
            specific_attributes: serde_json::from_str(specific_attributes)?,
            generic_attributes: serde_json::from_str(generic_attributes)?,
        })
    }

    /// Loads `categories.json`, `specific_attributes.json` and
    /// `generic_attributes.json` from a directory
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let read = |name: &str| {
            std::fs::read_to_string(dir.join(name))
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", dir.join(name).display(), e))
        };

        let taxonomy = Self::from_json(
            &read("categories.json")?,
            &read("specific_attributes.json")?,
            &read("generic_attributes.json")?,
        )?;
        Ok(taxonomy)
    }

    pub fn group_names(&self) -> Vec<String> {
        self.category_groups.keys().cloned().collect()
    }
}
