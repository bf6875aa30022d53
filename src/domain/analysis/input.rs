use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Catalog item submitted for analysis.
///
/// Immutable snapshot of the caller's product record. The `product_id`
/// identifies the item within one call; it deliberately does not
/// participate in the cache key (see [`content_key`](Self::content_key)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAnalysisInput {
    pub product_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductAnalysisInput {
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            description: None,
            category: category.into(),
            tags: Vec::new(),
            image_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Stable content hash over the descriptive fields.
    ///
    /// Two product records with identical name, description, category,
    /// tags and image reference share one cache entry regardless of
    /// their assigned ids. Components are combined in sorted key order
    /// so the hash does not depend on construction order.
    pub fn content_key(&self) -> String {
        let mut components = BTreeMap::new();
        components.insert("category", self.category.clone());
        components.insert("description", self.description.clone().unwrap_or_default());
        components.insert("image", self.image_url.clone().unwrap_or_default());
        components.insert("name", self.name.clone());
        components.insert("tags", self.tags.join("\u{1f}"));

        let mut hasher = Sha256::new();
        for (key, value) in &components {
            hasher.update(key.as_bytes());
            hasher.update([0x1e]);
            hasher.update(value.as_bytes());
            hasher.update([0x1e]);
        }

        hex::encode(hasher.finalize())
    }

    /// Lowercased free text the keyword tier scores against.
    pub fn search_text(&self) -> String {
        let mut text = self.name.clone();
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(description);
        }
        text.push(' ');
        text.push_str(&self.category);
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_ignores_product_id() {
        let a = ProductAnalysisInput::new("sku-1", "Oak Dining Table", "tables")
            .with_description("solid oak, 6 seats");
        let b = ProductAnalysisInput::new("sku-2", "Oak Dining Table", "tables")
            .with_description("solid oak, 6 seats");

        assert_eq!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_content_key_changes_with_content() {
        let a = ProductAnalysisInput::new("sku-1", "Oak Dining Table", "tables");
        let b = ProductAnalysisInput::new("sku-1", "Walnut Dining Table", "tables");
        let c = a.clone().with_image_url("https://cdn.example.com/1.jpg");

        assert_ne!(a.content_key(), b.content_key());
        assert_ne!(a.content_key(), c.content_key());
    }

    #[test]
    fn test_content_key_sensitive_to_tag_order() {
        let a = ProductAnalysisInput::new("sku-1", "Sofa", "seating")
            .with_tags(vec!["green".into(), "velvet".into()]);
        let b = ProductAnalysisInput::new("sku-1", "Sofa", "seating")
            .with_tags(vec!["velvet".into(), "green".into()]);

        // Tags are an ordered list per the data model.
        assert_ne!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_search_text_concatenates_fields() {
        let input = ProductAnalysisInput::new("sku-1", "Oak Dining Table", "Tables")
            .with_description("Solid Oak");

        assert_eq!(input.search_text(), "oak dining table solid oak tables");
    }
}
