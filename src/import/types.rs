use crate::db::ProductStatus;
use serde::{Deserialize, Serialize};

/// Metadata keys written for every imported product
pub mod meta_keys {
    pub const DISCOGS_ID: &str = "discogs_id";
    pub const RELEASE_NAME: &str = "release_name";
    pub const ARTIST: &str = "artist";
    pub const COUNTRY: &str = "country";
    pub const DATE: &str = "date";
    pub const LABEL: &str = "label";
    pub const GENRE: &str = "genre";
    pub const STYLE: &str = "style";
    pub const TRACKLIST: &str = "tracklist";
    pub const FORMAT: &str = "format";
    pub const THUMBNAIL_URL: &str = "thumbnail_url";
}

/// One top-level category and the subcategories to create beneath it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryBranch {
    pub name: String,
    pub children: Vec<String>,
}

/// A product ready to be persisted, derived from a single release
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub sku: String,
    pub status: ProductStatus,
    /// Back-reference to the Discogs release (duplicate guard key)
    pub discogs_id: String,
    /// Ordered key/value metadata
    pub meta: Vec<(String, String)>,
    pub categories: Vec<CategoryBranch>,
    /// Image to sideload after the product exists
    pub image_url: Option<String>,
}

impl ProductDraft {
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Result of a successful import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportedProduct {
    pub product_id: String,
    pub discogs_id: String,
    pub status: ProductStatus,
    /// False when the image could not be fetched or attached
    pub image_attached: bool,
}
