// Library exports for the server binary and integration tests

pub mod api;
pub mod app_context;
pub mod config;
pub mod db;
pub mod discogs;
pub mod import;
pub mod media;
pub mod settings;

pub use app_context::AppContext;
