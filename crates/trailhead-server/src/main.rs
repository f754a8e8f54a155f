mod demo;
mod host;
mod method_override;

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, Level};
use trailhead::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = Config::load_default().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}, using defaults", e);
        Config::default()
    });

    if let Some(port) = std::env::var("TRAILHEAD_PORT").ok().and_then(|v| v.parse().ok()) {
        config.server.port = port;
    }
    if let Ok(level) = std::env::var("TRAILHEAD_LOG") {
        config.log.level = level;
    }

    init_tracing(&config.log.level);

    let app = demo::build(&config).context("Failed to build application")?;
    info!("Registered {} routes for '{}'", app.routes().len(), app.name());
    let app = Arc::new(app);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, host::router(app)).await?;
    Ok(())
}

fn init_tracing(level: &str) {
    let level = level.parse::<Level>().unwrap_or_else(|_| {
        eprintln!("Unknown log level '{}', using info", level);
        Level::INFO
    });
    tracing_subscriber::fmt().with_max_level(level).init();
}
