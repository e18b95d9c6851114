use crate::config::Config;
use crate::db::Database;
use crate::discogs::DiscogsClient;
use crate::import::{Hooks, ImportService, MapperOptions};
use crate::media::{LocalMediaStore, MediaStore};
use crate::settings::Settings;
use std::sync::Arc;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub database: Database,
    pub media: Arc<dyn MediaStore>,
    pub http: reqwest::Client,
    pub hooks: Hooks,
}

impl AppContext {
    /// Context with the local media library and no hooks
    pub fn new(config: Config, database: Database) -> Self {
        let http = reqwest::Client::new();
        let media = Arc::new(LocalMediaStore::new(
            http.clone(),
            config.media_dir.clone(),
            config.user_agent(),
        ));

        Self {
            config,
            database,
            media,
            http,
            hooks: Hooks::new(),
        }
    }

    pub fn with_media(mut self, media: Arc<dyn MediaStore>) -> Self {
        self.media = media;
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Build an import service from the currently stored settings.
    ///
    /// Settings are read per call so a token saved through the admin surface
    /// applies to the next request.
    pub async fn import_service(&self) -> Result<ImportService, sqlx::Error> {
        let settings = Settings::load(&self.database).await?;

        let client = DiscogsClient::new(settings.discogs_token)
            .with_http_client(self.http.clone())
            .with_base_url(self.config.discogs_base_url.clone())
            .with_user_agent(self.config.user_agent());

        let options = MapperOptions {
            default_status: settings.default_product_status,
            auto_publish_genres: self.config.auto_publish_genres.clone(),
        };

        Ok(ImportService::new(
            client,
            Arc::new(self.database.clone()),
            self.media.clone(),
        )
        .with_hooks(self.hooks.clone())
        .with_options(options))
    }
}
