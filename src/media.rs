use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Anything shorter is an error page, not an image
const MIN_IMAGE_BYTES: usize = 100;
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Image URL is empty")]
    EmptyUrl,
    #[error("Failed to fetch image: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Image download failed with status {0}")]
    Status(u16),
    #[error("Downloaded file too small to be a valid image ({0} bytes)")]
    TooSmall(usize),
    #[error("Failed to write image file: {0}")]
    Io(#[from] std::io::Error),
}

/// An image stored locally and ready to be attached to a product
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAttachment {
    pub path: PathBuf,
    /// Where the image was downloaded from
    pub source_url: String,
    /// Stored as the image alt text
    pub title: String,
}

/// Downloads a remote image into the store's media library
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn sideload(&self, url: &str, title: &str) -> Result<MediaAttachment, MediaError>;
}

/// Media library backed by a plain directory
#[derive(Clone)]
pub struct LocalMediaStore {
    client: Client,
    media_dir: PathBuf,
    user_agent: String,
}

impl LocalMediaStore {
    pub fn new(client: Client, media_dir: impl Into<PathBuf>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            media_dir: media_dir.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn media_dir(&self) -> &PathBuf {
        &self.media_dir
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn sideload(&self, url: &str, title: &str) -> Result<MediaAttachment, MediaError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(MediaError::EmptyUrl);
        }

        tokio::fs::create_dir_all(&self.media_dir).await?;

        let file_path = self
            .media_dir
            .join(format!("{}.{}", Uuid::new_v4(), image_extension(url)));

        info!("Downloading image from {} to {:?}", url, file_path);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        if bytes.len() < MIN_IMAGE_BYTES {
            return Err(MediaError::TooSmall(bytes.len()));
        }

        tokio::fs::write(&file_path, &bytes).await?;
        debug!("Wrote {} bytes to {:?}", bytes.len(), file_path);

        Ok(MediaAttachment {
            path: file_path,
            source_url: url.to_string(),
            title: title.to_string(),
        })
    }
}

/// Extension of the URL path when it is a known image type, `jpg` otherwise
fn image_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| "jpg".to_string())
}
