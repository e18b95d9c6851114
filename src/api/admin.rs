use crate::api::guard::{require_capability, MANAGE_OPTIONS};
use crate::api::{success, ApiError};
use crate::app_context::AppContext;
use crate::db::ProductStatus;
use crate::settings::Settings;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    /// Number or numeric string, as forms send either
    #[serde(default)]
    pub release_id: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct AddProductResponse {
    pub product_id: String,
    pub edit_url: String,
    pub status: ProductStatus,
    pub image_attached: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveSettingsRequest {
    /// Absent leaves the stored token alone; blank clears it
    #[serde(default)]
    pub discogs_token: Option<String>,
    #[serde(default)]
    pub default_product_status: Option<String>,
}

pub async fn search(
    State(ctx): State<AppContext>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let service = ctx.import_service().await?;
    let page = service
        .search(&request.query, request.page.unwrap_or(1))
        .await
        .map_err(|e| {
            error!("Search for '{}' failed: {}", request.query, e);
            ApiError::from(e)
        })?;

    Ok(success(page))
}

pub async fn add_product(
    State(ctx): State<AppContext>,
    payload: Result<Json<AddProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let release_id = parse_release_id(&request.release_id);

    let service = ctx.import_service().await?;
    let imported = service.import_release(release_id).await.map_err(|e| {
        error!("Import of release {} failed: {}", release_id, e);
        ApiError::from(e)
    })?;

    info!(
        "Release {} imported as product {}",
        imported.discogs_id, imported.product_id
    );

    Ok(success(AddProductResponse {
        edit_url: format!(
            "{}/admin/products/{}/edit",
            ctx.config.site_url, imported.product_id
        ),
        product_id: imported.product_id,
        status: imported.status,
        image_attached: imported.image_attached,
    }))
}

pub async fn get_settings(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    require_capability(&headers, MANAGE_OPTIONS)?;

    let settings = Settings::load(&ctx.database).await?;
    Ok(success(json!({
        "has_token": settings.discogs_token.is_some(),
        "default_product_status": settings.default_product_status,
    })))
}

pub async fn save_settings(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    payload: Result<Json<SaveSettingsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    require_capability(&headers, MANAGE_OPTIONS)?;
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut settings = Settings::load(&ctx.database).await?;
    if let Some(token) = request.discogs_token {
        let token = token.trim().to_string();
        settings.discogs_token = (!token.is_empty()).then_some(token);
    }
    if let Some(status) = request.default_product_status {
        settings.default_product_status = status.parse().map_err(ApiError::bad_request)?;
    }

    settings.save(&ctx.database).await?;
    info!("Settings saved");

    Ok(success(json!({ "message": "Settings saved successfully." })))
}

/// Anything that is not a positive integer becomes 0, which the import rejects
fn parse_release_id(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
