use crate::db::Database;
use crate::import::ProductDraft;
use crate::media::MediaAttachment;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Another product already carries this Discogs release id
    #[error("A product already exists for Discogs release {0}")]
    Conflict(String),
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// Where imported products end up.
///
/// `Database` is the bundled implementation; a host with its own catalogue
/// implements this trait instead.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Id of the product already created from this release, if any
    async fn find_product_by_discogs_id(&self, discogs_id: &str)
        -> Result<Option<String>, StoreError>;

    async fn insert_product(&self, draft: &ProductDraft) -> Result<String, StoreError>;

    async fn set_product_meta(
        &self,
        product_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Category id for `(name, parent)`, created on first use
    async fn get_or_create_category(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<String, StoreError>;

    async fn set_product_categories(
        &self,
        product_id: &str,
        category_ids: &[String],
    ) -> Result<(), StoreError>;

    async fn set_product_image(
        &self,
        product_id: &str,
        attachment: &MediaAttachment,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl ProductStore for Database {
    async fn find_product_by_discogs_id(
        &self,
        discogs_id: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(Database::find_product_by_discogs_id(self, discogs_id).await?)
    }

    async fn insert_product(&self, draft: &ProductDraft) -> Result<String, StoreError> {
        Database::insert_product(self, draft).await
    }

    async fn set_product_meta(
        &self,
        product_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        Ok(Database::set_product_meta(self, product_id, key, value).await?)
    }

    async fn get_or_create_category(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<String, StoreError> {
        let category = Database::get_or_create_category(self, name, parent_id).await?;
        Ok(category.id)
    }

    async fn set_product_categories(
        &self,
        product_id: &str,
        category_ids: &[String],
    ) -> Result<(), StoreError> {
        Ok(Database::set_product_categories(self, product_id, category_ids).await?)
    }

    async fn set_product_image(
        &self,
        product_id: &str,
        attachment: &MediaAttachment,
    ) -> Result<(), StoreError> {
        let path = attachment.path.to_string_lossy();
        Ok(Database::set_product_image(
            self,
            product_id,
            &path,
            &attachment.source_url,
            &attachment.title,
        )
        .await?)
    }
}
