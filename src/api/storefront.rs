use crate::api::{success, ApiError};
use crate::app_context::AppContext;
use crate::import::meta_keys;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use std::collections::HashMap;

/// Rows of the "Vinyl Details" block, in display order
const DETAIL_ROWS: [(&str, &str); 7] = [
    ("Artist", meta_keys::ARTIST),
    ("Label", meta_keys::LABEL),
    ("Format", meta_keys::FORMAT),
    ("Country", meta_keys::COUNTRY),
    ("Released", meta_keys::DATE),
    ("Genre", meta_keys::GENRE),
    ("Style", meta_keys::STYLE),
];

#[derive(Debug, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ProductDetails {
    pub product_id: String,
    pub name: String,
    pub discogs_id: String,
    pub details: Vec<DetailRow>,
    pub tracklist: Vec<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
}

/// Vinyl details and tracklist of an imported product
pub async fn product_details(
    State(ctx): State<AppContext>,
    Path(product_id): Path<String>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::new(StatusCode::NOT_FOUND, "not_found", "Product not found.");

    let product = ctx
        .database
        .get_product(&product_id)
        .await?
        .ok_or_else(not_found)?;
    // Products that did not come from Discogs have nothing to show here
    let discogs_id = product.discogs_id.clone().ok_or_else(not_found)?;

    let meta: HashMap<String, String> = ctx
        .database
        .get_product_meta(&product.id)
        .await?
        .into_iter()
        .map(|m| (m.meta_key, m.meta_value))
        .collect();

    let details = DETAIL_ROWS
        .iter()
        .filter_map(|(label, key)| {
            meta.get(*key)
                .filter(|v| !v.trim().is_empty())
                .map(|value| DetailRow {
                    label: *label,
                    value: value.clone(),
                })
        })
        .collect();

    let tracklist = meta
        .get(meta_keys::TRACKLIST)
        .map(|text| {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(success(ProductDetails {
        product_id: product.id,
        name: product.name,
        discogs_id,
        details,
        tracklist,
        image_url: product.image_url,
        image_alt: product.image_alt,
    }))
}
