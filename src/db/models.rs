use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// String constants for SQL DEFAULT clauses (keep in sync with as_str())
pub(crate) const PRODUCT_STATUS_DRAFT: &str = "draft";
const PRODUCT_STATUS_PENDING: &str = "pending";
const PRODUCT_STATUS_PRIVATE: &str = "private";
const PRODUCT_STATUS_PUBLISH: &str = "publish";

/// Database models for the vinyl shop store
///
/// - Products carry the mapped release fields plus the Discogs back-reference
/// - Free-form release metadata lives in `product_meta` as key/value rows
/// - Categories form a genre → style tree shared across products
///
/// Publication status of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft, // Hidden, editable by staff
    Pending, // Waiting for review
    Private, // Visible to staff only
    Publish, // Live in the storefront
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => PRODUCT_STATUS_DRAFT,
            ProductStatus::Pending => PRODUCT_STATUS_PENDING,
            ProductStatus::Private => PRODUCT_STATUS_PRIVATE,
            ProductStatus::Publish => PRODUCT_STATUS_PUBLISH,
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            PRODUCT_STATUS_DRAFT => Ok(ProductStatus::Draft),
            PRODUCT_STATUS_PENDING => Ok(ProductStatus::Pending),
            PRODUCT_STATUS_PRIVATE => Ok(ProductStatus::Private),
            PRODUCT_STATUS_PUBLISH => Ok(ProductStatus::Publish),
            other => Err(format!("Unknown product status: {}", other)),
        }
    }
}

/// A sellable product created from one Discogs release
///
/// `discogs_id` is unique across the table; it is the duplicate guard that
/// keeps a release from being imported twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub sku: Option<String>,
    pub status: ProductStatus,
    pub discogs_id: Option<String>,
    /// Local path of the sideloaded cover image
    pub image_path: Option<String>,
    /// Where the cover image was downloaded from
    pub image_url: Option<String>,
    /// Alt text for the cover, the product name at import time
    pub image_alt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key/value metadata attached to a product (artist, label, tracklist, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbProductMeta {
    pub product_id: String,
    pub meta_key: String,
    pub meta_value: String,
}

/// Product category. Genres sit at the top level, styles hang off their genre.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbCategory {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}
