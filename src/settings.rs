use crate::db::{Database, ProductStatus};
use tracing::{info, warn};

pub const DISCOGS_TOKEN_KEY: &str = "discogs_token";
pub const DEFAULT_PRODUCT_STATUS_KEY: &str = "default_product_status";

/// Operator-editable settings, persisted in the `settings` table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub discogs_token: Option<String>,
    pub default_product_status: ProductStatus,
}

impl Settings {
    pub async fn load(db: &Database) -> Result<Self, sqlx::Error> {
        let discogs_token = db
            .get_setting(DISCOGS_TOKEN_KEY)
            .await?
            .filter(|token| !token.trim().is_empty());

        let default_product_status = match db.get_setting(DEFAULT_PRODUCT_STATUS_KEY).await? {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to draft", e);
                ProductStatus::Draft
            }),
            None => ProductStatus::Draft,
        };

        Ok(Settings {
            discogs_token,
            default_product_status,
        })
    }

    /// Persist every field. A `None` token clears the stored one.
    pub async fn save(&self, db: &Database) -> Result<(), sqlx::Error> {
        let token = self.discogs_token.as_deref().unwrap_or("").trim();
        db.set_setting(DISCOGS_TOKEN_KEY, token).await?;
        db.set_setting(DEFAULT_PRODUCT_STATUS_KEY, self.default_product_status.as_str())
            .await?;
        Ok(())
    }

    /// Write defaults for settings that were never stored.
    ///
    /// `seed_token` only lands when no token has been saved yet, so a token
    /// changed through the admin surface survives restarts.
    pub async fn install_defaults(
        db: &Database,
        seed_token: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        if db
            .add_setting(DEFAULT_PRODUCT_STATUS_KEY, ProductStatus::default().as_str())
            .await?
        {
            info!("Installed default product status");
        }

        if let Some(token) = seed_token.map(str::trim).filter(|t| !t.is_empty()) {
            if db.add_setting(DISCOGS_TOKEN_KEY, token).await? {
                info!("Seeded Discogs token from environment");
            }
        }

        Ok(())
    }
}
