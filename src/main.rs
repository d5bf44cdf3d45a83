mod accessors;
mod cache;
mod cms;
mod config;
mod error;
mod models;
mod queries;
mod routes;
mod search;
mod templates;
mod warm;

use std::{sync::Arc, time::Duration};

use crate::{cache::MemoryCache, cms::CmsClient, config::Config, search::SearchDebouncer};

pub struct AppState {
    pub config: Arc<Config>,
    pub cms: Arc<CmsClient>,
    pub search: Arc<SearchDebouncer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,moviefinder=debug".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("moviefinder/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let cache = Arc::new(MemoryCache::with_capacity(config.cache_capacity));
    let cms = Arc::new(CmsClient::new(
        http,
        config.cms_url.clone(),
        cache,
        config.cache_ttl_secs,
        config.cms_rps,
    ));

    if config.warm_on_start {
        let cms = cms.clone();
        let ttl = config.movie_revalidate_secs;
        let max_concurrent = config.warm_concurrency;
        tokio::spawn(async move {
            if let Err(err) = warm::warm_movie_pages(&cms, ttl, max_concurrent).await {
                tracing::warn!(error = %err, "failed to warm movie pages");
            }
        });
    }

    let search = Arc::new(SearchDebouncer::new(Duration::from_millis(config.search_debounce_ms)));

    let state = Arc::new(AppState { config: config.clone(), cms, search });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, cms = %config.cms_url, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
