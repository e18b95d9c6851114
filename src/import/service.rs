use crate::db::{ProductStore, StoreError};
use crate::discogs::{DiscogsClient, DiscogsError, DiscogsRelease, SearchPage};
use crate::import::hooks::Hooks;
use crate::import::mapper::{map_release, MapperOptions};
use crate::import::types::{CategoryBranch, ImportedProduct, ProductDraft};
use crate::media::MediaStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const PRODUCT_EXISTS_MESSAGE: &str = "Product already exists for this release.";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Catalog(DiscogsError),
    #[error("Product already exists for this release.")]
    AlreadyExists {
        discogs_id: String,
        /// Set when the existing product is known (pre-create lookup)
        product_id: Option<String>,
    },
    /// Detail is logged when the error is created and kept as the source
    #[error("Failed to create product.")]
    Persistence(#[source] StoreError),
    #[error("{0}")]
    Validation(String),
}

impl ImportError {
    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Catalog(DiscogsError::MissingToken) => "no_token",
            ImportError::Catalog(DiscogsError::Api { .. }) => "api_error",
            ImportError::Catalog(DiscogsError::Decode(_)) => "json_error",
            ImportError::Catalog(DiscogsError::Request(_)) => "api_error",
            ImportError::Catalog(DiscogsError::InvalidInput(_)) => "invalid_input",
            ImportError::Validation(_) => "invalid_input",
            ImportError::AlreadyExists { .. } => "product_exists",
            ImportError::Persistence(_) => "save_failed",
        }
    }
}

impl From<DiscogsError> for ImportError {
    fn from(e: DiscogsError) -> Self {
        match e {
            DiscogsError::InvalidInput(message) => ImportError::Validation(message),
            other => ImportError::Catalog(other),
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(discogs_id) => ImportError::AlreadyExists {
                discogs_id,
                product_id: None,
            },
            other => {
                error!("Product store failure: {}", other);
                ImportError::Persistence(other)
            }
        }
    }
}

/// Searches the catalog and turns releases into store products
#[derive(Clone)]
pub struct ImportService {
    client: DiscogsClient,
    store: Arc<dyn ProductStore>,
    media: Arc<dyn MediaStore>,
    hooks: Hooks,
    options: MapperOptions,
}

impl ImportService {
    pub fn new(
        client: DiscogsClient,
        store: Arc<dyn ProductStore>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            client,
            store,
            media,
            hooks: Hooks::new(),
            options: MapperOptions::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_options(mut self, options: MapperOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<SearchPage, ImportError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ImportError::Validation("Search query is required.".to_string()));
        }

        self.hooks.before_search(query);
        let page = self.client.search(query, page).await?;
        let page = self.hooks.filter_search_results(page);
        self.hooks.after_search(query, &page);

        Ok(page)
    }

    /// Fetch a release by id and create a product from it
    pub async fn import_release(&self, release_id: u64) -> Result<ImportedProduct, ImportError> {
        if release_id == 0 {
            return Err(ImportError::Validation("Release ID is required.".to_string()));
        }

        info!("Importing Discogs release {}", release_id);
        let release = self.client.get_release(release_id).await?;
        self.create_from_release(release).await
    }

    /// Create a product from an already fetched release
    pub async fn create_from_release(
        &self,
        release: DiscogsRelease,
    ) -> Result<ImportedProduct, ImportError> {
        let discogs_id = release.id.to_string();

        if let Some(product_id) = self.store.find_product_by_discogs_id(&discogs_id).await? {
            info!(
                "Release {} already imported as product {}",
                discogs_id, product_id
            );
            return Err(ImportError::AlreadyExists {
                discogs_id,
                product_id: Some(product_id),
            });
        }

        let release = self.hooks.filter_release(release);
        self.hooks.before_product_created(&release);

        let draft = map_release(&release, &self.options, &self.hooks);
        let product_id = self.store.insert_product(&draft).await.map_err(|e| {
            error!("Failed to insert product for release {}: {}", discogs_id, e);
            ImportError::from(e)
        })?;
        info!(
            "Created product {} ({}) for release {}",
            product_id, draft.status, discogs_id
        );

        self.hooks.before_meta_added(&product_id, &release);
        for (key, value) in &draft.meta {
            self.store.set_product_meta(&product_id, key, value).await?;
        }
        self.hooks.after_meta_added(&product_id, &release);
        debug!("Stored {} meta value(s) on {}", draft.meta.len(), product_id);

        let category_ids = self.resolve_categories(&draft.categories).await?;
        self.store
            .set_product_categories(&product_id, &category_ids)
            .await?;

        let image_attached = self.attach_image(&product_id, &draft).await;

        self.hooks.after_product_created(&product_id, &release);

        Ok(ImportedProduct {
            product_id,
            discogs_id,
            status: draft.status,
            image_attached,
        })
    }

    /// Get or create every term of the plan; returns ids parents first
    async fn resolve_categories(
        &self,
        branches: &[CategoryBranch],
    ) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for branch in branches {
            let parent_id = self.store.get_or_create_category(&branch.name, None).await?;
            ids.push(parent_id.clone());
            for child in &branch.children {
                let child_id = self
                    .store
                    .get_or_create_category(child, Some(&parent_id))
                    .await?;
                ids.push(child_id);
            }
        }
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
        Ok(ids)
    }

    /// Sideload and attach the cover. Failures are logged, never returned.
    async fn attach_image(&self, product_id: &str, draft: &ProductDraft) -> bool {
        let Some(url) = draft.image_url.as_deref() else {
            debug!("Release {} has no image", draft.discogs_id);
            return false;
        };

        let attachment = match self.media.sideload(url, &draft.name).await {
            Ok(attachment) => attachment,
            Err(e) => {
                warn!("Failed to sideload image {} for {}: {}", url, product_id, e);
                return false;
            }
        };

        match self.store.set_product_image(product_id, &attachment).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to attach image to {}: {}", product_id, e);
                false
            }
        }
    }
}
