mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use outreach_api::AppStateInner;
use outreach_source::{CachedSource, GraphqlSource, HistorySource};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "outreach=debug,outreach_api=debug,outreach_source=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    if config.admin_secret.is_none() && config.nhost.is_none() {
        warn!("no admin secret or Nhost credentials configured, data API calls are anonymous");
    }

    // Data source: GraphQL behind a TTL cache
    let graphql = GraphqlSource::new(config.source_config())?;
    let source: Arc<dyn HistorySource> = Arc::new(CachedSource::new(graphql, config.cache_ttl));

    let state = Arc::new(
        AppStateInner::new(source, config.utc_offset)
            .with_access_token(config.access_token.clone()),
    );

    let mut app = outreach_api::router(state);
    if let Some(dir) = &config.static_dir {
        info!("serving dashboard from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }
    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        "Outreach stats listening on {} (user {}, cache {}s)",
        addr,
        config.user_id,
        config.cache_ttl.as_secs()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
