use crate::discogs::models::{DiscogsRelease, DiscogsSearchResult, PaginationInfo, SearchPage};
use reqwest::header::USER_AGENT;
use reqwest::{Client, Error as ReqwestError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com";
const DEFAULT_USER_AGENT: &str = "VinylShopDiscogs/1.0 +http://localhost";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const SEARCH_PER_PAGE: u32 = 20;

#[derive(Error, Debug)]
pub enum DiscogsError {
    #[error("Discogs API token is not configured. Please add it in settings.")]
    MissingToken,
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),
    #[error("{0}")]
    InvalidInput(String),
}

/// Discogs search response wrapper
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResultResponse>,
    #[serde(default)]
    pagination: Option<PaginationResponse>,
}

/// Individual search result as sent by Discogs
#[derive(Debug, Deserialize)]
struct SearchResultResponse {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<serde_json::Value>,
    #[serde(default)]
    genre: Option<Vec<String>>,
    #[serde(default)]
    style: Option<Vec<String>>,
    #[serde(default)]
    format: Option<Vec<String>>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    label: Option<Vec<String>>,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaginationResponse {
    page: Option<u32>,
    pages: Option<u32>,
    per_page: Option<u32>,
    items: Option<u32>,
}

/// Error body Discogs attaches to non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct DiscogsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    user_agent: String,
}

impl DiscogsClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Reuse a shared connection pool
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn has_token(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search releases by free text, one page at a time
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchPage, DiscogsError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DiscogsError::InvalidInput(
                "Search query is required.".to_string(),
            ));
        }
        if page == 0 {
            return Err(DiscogsError::InvalidInput(
                "Page number must be greater than 0".to_string(),
            ));
        }

        let params = [
            ("q", query.to_string()),
            ("type", "release".to_string()),
            ("per_page", SEARCH_PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];

        let response: SearchResponse = self.get_json("/database/search", &params).await?;

        info!(
            "✓ Discogs search '{}' returned {} result(s)",
            query,
            response.results.len()
        );

        Ok(format_search_results(response))
    }

    /// Get detailed information about a specific release
    pub async fn get_release(&self, id: u64) -> Result<DiscogsRelease, DiscogsError> {
        if id == 0 {
            return Err(DiscogsError::InvalidInput(
                "Release ID is required.".to_string(),
            ));
        }

        let path = format!("/releases/{}", id);
        self.get_json(&path, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, DiscogsError> {
        let token = self.api_key.as_deref().ok_or(DiscogsError::MissingToken)?;
        let url = format!("{}{}", self.base_url, path);

        info!("📡 Discogs API: GET {}", url);
        debug!("Request params: {:?}", params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", token)])
            .header(USER_AGENT, &self.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        debug!("Response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            let mut message = format!("Discogs API returned error code {}", status.as_u16());
            if let Ok(ApiErrorBody {
                message: Some(detail),
            }) = serde_json::from_str::<ApiErrorBody>(&body)
            {
                message.push_str(": ");
                message.push_str(&detail);
            }
            warn!("✗ {}", message);
            return Err(DiscogsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("JSON parsing error for {}: {}", url, e);
            DiscogsError::Decode(e)
        })
    }
}

fn format_search_results(response: SearchResponse) -> SearchPage {
    let results = response
        .results
        .into_iter()
        .map(|item| DiscogsSearchResult {
            id: item.id,
            title: item.title.unwrap_or_default(),
            year: match item.year {
                Some(serde_json::Value::String(s)) => s,
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => String::new(),
            },
            format: item.format.unwrap_or_default().join(", "),
            label: item.label.unwrap_or_default().join(", "),
            country: item.country.unwrap_or_default(),
            genre: item.genre.unwrap_or_default().join(", "),
            style: item.style.unwrap_or_default().join(", "),
            thumb: item.thumb.unwrap_or_default(),
            cover_image: item.cover_image.unwrap_or_default(),
        })
        .collect();

    let defaults = PaginationInfo::default();
    let pagination = match response.pagination {
        Some(p) => PaginationInfo {
            page: p.page.unwrap_or(defaults.page),
            pages: p.pages.unwrap_or(defaults.pages),
            per_page: p.per_page.unwrap_or(defaults.per_page),
            items: p.items.unwrap_or(defaults.items),
        },
        None => defaults,
    };

    SearchPage {
        results,
        pagination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so any request that slipped
    // through would surface as `Request`, not the errors asserted below.
    fn offline_client(api_key: Option<&str>) -> DiscogsClient {
        DiscogsClient::new(api_key.map(str::to_string)).with_base_url("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_request() {
        let client = offline_client(Some("token"));
        let err = client.search("   ", 1).await.unwrap_err();
        assert!(matches!(err, DiscogsError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Search query is required.");
    }

    #[tokio::test]
    async fn test_zero_release_id_is_rejected() {
        let client = offline_client(Some("token"));
        let err = client.get_release(0).await.unwrap_err();
        assert!(matches!(err, DiscogsError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_token_is_a_configuration_error() {
        let client = offline_client(None);
        assert!(!client.has_token());
        let err = client.get_release(1234).await.unwrap_err();
        assert!(matches!(err, DiscogsError::MissingToken));

        let blank = offline_client(Some("  "));
        let err = blank.search("miles davis", 1).await.unwrap_err();
        assert!(matches!(err, DiscogsError::MissingToken));
    }

    #[test]
    fn test_format_search_results_flattens_lists() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "pagination": {"page": 2, "pages": 5, "per_page": 20, "items": 93},
                "results": [{
                    "id": 1,
                    "title": "Miles Davis - Kind Of Blue",
                    "year": "1959",
                    "format": ["Vinyl", "LP", "Album"],
                    "label": ["Columbia", "CBS"],
                    "genre": ["Jazz"],
                    "style": ["Modal", "Hard Bop"],
                    "country": "US",
                    "type": "release"
                }]
            }"#,
        )
        .unwrap();

        let page = format_search_results(response);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.items, 93);

        let first = &page.results[0];
        assert_eq!(first.format, "Vinyl, LP, Album");
        assert_eq!(first.label, "Columbia, CBS");
        assert_eq!(first.style, "Modal, Hard Bop");
        assert_eq!(first.thumb, "");
    }

    #[test]
    fn test_format_search_results_defaults_pagination() {
        let response: SearchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        let page = format_search_results(response);
        assert!(page.results.is_empty());
        assert_eq!(page.pagination, PaginationInfo::default());
    }
}
