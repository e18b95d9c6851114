//! HTTP surface: the admin endpoints behind the capability and nonce guard,
//! plus the public storefront view of imported products.

mod admin;
mod guard;
mod storefront;

use crate::app_context::AppContext;
use crate::import::ImportError;
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub use guard::{
    CAPABILITIES_HEADER, MANAGE_OPTIONS, MANAGE_PRODUCTS, NONCE_COOKIE, NONCE_HEADER,
};

/// Build the full router over a shared context
pub fn create_router(ctx: AppContext) -> Router {
    let admin = Router::new()
        .route("/admin/search", post(admin::search))
        .route("/admin/products", post(admin::add_product))
        .route(
            "/admin/settings",
            get(admin::get_settings).post(admin::save_settings),
        )
        .layer(middleware::from_fn(guard::admin_guard));

    let storefront = Router::new()
        .route("/products/:id", get(storefront::product_details))
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(admin)
        .merge(storefront)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Success half of the `{"success": bool, "data": ...}` envelope
pub fn success<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

/// Failure half of the envelope; `data.message` is what operators see
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "save_failed", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "data": {
                "message": self.message,
                "code": self.code,
            },
        }));

        (self.status, body).into_response()
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        let status = match &e {
            ImportError::Validation(_) => StatusCode::BAD_REQUEST,
            ImportError::AlreadyExists { .. } => StatusCode::CONFLICT,
            ImportError::Catalog(crate::discogs::DiscogsError::MissingToken) => {
                StatusCode::BAD_REQUEST
            }
            ImportError::Catalog(_) => StatusCode::BAD_GATEWAY,
            ImportError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, e.code(), e.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        error!("Database error: {}", e);
        ApiError::internal("Database error.")
    }
}

impl From<crate::db::StoreError> for ApiError {
    fn from(e: crate::db::StoreError) -> Self {
        error!("Store error: {}", e);
        ApiError::internal("Database error.")
    }
}
