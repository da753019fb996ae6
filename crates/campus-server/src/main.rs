mod config;
mod error;
mod routes;
mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use campus_upstream::{HttpClient, HttpUpstream};

use crate::config::Config;
use crate::routes::AppStateInner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let http = HttpClient::new(config.upstream_timeout)?;
    let upstream = HttpUpstream::new(http, config.services.clone());
    let state = Arc::new(AppStateInner {
        upstream,
        session_secret: config.session_secret.clone(),
    });

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        events = %config.services.events,
        discussions = %config.services.discussions,
        "campus front-end listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
