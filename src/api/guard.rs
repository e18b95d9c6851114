use crate::api::ApiError;
use axum::{
    extract::Request,
    http::{header::COOKIE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// Comma-separated capabilities of the caller, set by the fronting host
pub const CAPABILITIES_HEADER: &str = "x-vsd-capabilities";
/// Anti-forgery token; must equal the `vsd_nonce` cookie
pub const NONCE_HEADER: &str = "x-vsd-nonce";
pub const NONCE_COOKIE: &str = "vsd_nonce";

pub const MANAGE_PRODUCTS: &str = "manage_products";
pub const MANAGE_OPTIONS: &str = "manage_options";

/// Every admin route needs `manage_products` and a matching nonce
pub async fn admin_guard(request: Request, next: Next) -> Result<Response, ApiError> {
    let headers = request.headers();
    require_capability(headers, MANAGE_PRODUCTS)?;
    verify_nonce(headers)?;
    Ok(next.run(request).await)
}

pub fn require_capability(headers: &HeaderMap, capability: &str) -> Result<(), ApiError> {
    let granted = headers
        .get(CAPABILITIES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|list| list.split(',').any(|c| c.trim() == capability))
        .unwrap_or(false);

    if granted {
        Ok(())
    } else {
        warn!("Request without capability '{}' rejected", capability);
        Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Permission denied.",
        ))
    }
}

/// Double-submit check: the header copy must match the cookie copy
fn verify_nonce(headers: &HeaderMap) -> Result<(), ApiError> {
    let header = headers
        .get(NONCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let cookie = cookie_value(headers, NONCE_COOKIE);

    match (header, cookie) {
        (Some(header), Some(cookie)) if header == cookie => Ok(()),
        _ => {
            warn!("Request with missing or mismatched nonce rejected");
            Err(ApiError::new(
                StatusCode::FORBIDDEN,
                "invalid_nonce",
                "Security check failed.",
            ))
        }
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
