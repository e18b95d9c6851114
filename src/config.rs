use crate::discogs::client::DEFAULT_BASE_URL;
use crate::import::mapper::DEFAULT_AUTO_PUBLISH_GENRES;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SITE_URL: &str = "http://localhost";
const DATABASE_FILE: &str = "vinyl-shop.db";
const APP_DIR: &str = "vinyl-shop";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid VSD_LISTEN_ADDR '{0}': {1}")]
    ListenAddr(String, std::net::AddrParseError),
    #[error("Could not determine a data directory; set VSD_DATABASE_PATH")]
    NoDataDir,
}

/// Process configuration, read once at startup.
///
/// Values come from the environment; a `.env` file in the working directory
/// is loaded first when present. Everything an operator edits at runtime
/// lives in `Settings` instead.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: PathBuf,
    /// Where sideloaded product images are written
    pub media_dir: PathBuf,
    pub listen_addr: SocketAddr,
    /// Public URL of the shop, advertised in the user agent
    pub site_url: String,
    pub discogs_base_url: String,
    /// Seeds the stored token on first start
    pub discogs_token: Option<String>,
    /// Genres whose releases are published on import. Empty disables the rule.
    pub auto_publish_genres: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            info!("Config: loaded .env file");
        } else {
            debug!("Config: no .env file found, using environment only");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_path = match var("VSD_DATABASE_PATH") {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join(APP_DIR)
                .join(DATABASE_FILE),
        };

        let media_dir = var("VSD_MEDIA_DIR").map(PathBuf::from).unwrap_or_else(|| {
            database_path
                .parent()
                .map(|dir| dir.join("media"))
                .unwrap_or_else(|| PathBuf::from("media"))
        });

        let listen = var("VSD_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen
            .parse()
            .map_err(|e| ConfigError::ListenAddr(listen.clone(), e))?;

        let site_url = var("VSD_SITE_URL")
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        // Unset keeps the built-in list; set-but-blank clears it
        let auto_publish_genres = match lookup("VSD_AUTO_PUBLISH_GENRES") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_AUTO_PUBLISH_GENRES
                .iter()
                .map(|g| g.to_string())
                .collect(),
        };

        Ok(Config {
            database_path,
            media_dir,
            listen_addr,
            site_url,
            discogs_base_url: var("VSD_DISCOGS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            discogs_token: var("VSD_DISCOGS_TOKEN"),
            auto_publish_genres,
        })
    }

    /// User agent sent to Discogs and to image hosts
    pub fn user_agent(&self) -> String {
        format!("VinylShopDiscogs/1.0 +{}", self.site_url)
    }
}
