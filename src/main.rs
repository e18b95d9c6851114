use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vinyl_shop::api::create_router;
use vinyl_shop::config::Config;
use vinyl_shop::db::Database;
use vinyl_shop::settings::Settings;
use vinyl_shop::AppContext;

#[tokio::main]
async fn main() {
    // Use RUST_LOG env var if set, otherwise default to info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        error!("vinyl-shop failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    if let Some(dir) = config.database_path.parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }
    let database = Database::new(&config.database_path.to_string_lossy()).await?;
    info!("Database ready at {}", config.database_path.display());

    Settings::install_defaults(&database, config.discogs_token.as_deref()).await?;

    let listen_addr = config.listen_addr;
    let ctx = AppContext::new(config, database);
    let router = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("Listening on http://{}", listen_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
