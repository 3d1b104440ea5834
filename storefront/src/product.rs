use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default, deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub collections: Vec<CollectionRef>,
    #[serde(default)]
    pub metafields: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub compare_at_price: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionRef {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: String,
}

impl Product {
    pub fn variant(&self, id: u64) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Collection title for display above the product title: first
    /// collection's title, then its name, then the
    /// `metafields.custom.collection_name` value (plain string or `{value}`
    /// object), else empty.
    pub fn collection_title(&self) -> String {
        if let Some(collection) = self.collections.first() {
            if !collection.title.is_empty() {
                return collection.title.clone();
            }
            if !collection.name.is_empty() {
                return collection.name.clone();
            }
        }

        let metafield = &self.metafields["custom"]["collection_name"];
        if let Some(name) = metafield.as_str() {
            return name.to_string();
        }
        if let Some(name) = metafield["value"].as_str() {
            return name.to_string();
        }

        String::new()
    }
}

/// The resource returns `tags` as either a JSON array or one
/// comma-separated string.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::List(tags) => tags,
        Tags::Joined(joined) => joined
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    })
}

static HANDLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/products/([^/?]+)").unwrap());

/// Extract a product handle from a line item url like
/// `/products/handle?variant=123`.
pub fn handle_from_url(url: &str) -> Option<String> {
    HANDLE
        .captures(url)
        .map(|captures| captures[1].to_string())
}
