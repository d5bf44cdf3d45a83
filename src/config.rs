use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_CMS_URL: &str = "https://admin.ahsan-aleem.dev/graphql";

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub cms_url: String,
    pub cache_ttl_secs: u64,
    /// Zero keeps every distinct query for the life of the process.
    pub cache_capacity: usize,
    pub cms_rps: u32,
    pub home_revalidate_secs: u64,
    pub movie_revalidate_secs: u64,
    pub search_debounce_ms: u64,
    pub warm_on_start: bool,
    pub warm_concurrency: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let cms_url =
            std::env::var("CMS_GRAPHQL_URL").unwrap_or_else(|_| DEFAULT_CMS_URL.to_string());

        let warm_on_start = std::env::var("WARM_ON_START")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            cms_url,
            cache_ttl_secs: env_or("CACHE_TTL_SECS", 60),
            cache_capacity: env_or("CACHE_CAPACITY", 0),
            cms_rps: env_or("CMS_RPS", 0),
            home_revalidate_secs: env_or("HOME_REVALIDATE_SECS", 300),
            movie_revalidate_secs: env_or("MOVIE_REVALIDATE_SECS", 3600),
            search_debounce_ms: env_or("SEARCH_DEBOUNCE_MS", 300),
            warm_on_start,
            warm_concurrency: env_or("WARM_CONCURRENCY", 5),
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
impl Config {
    pub fn for_tests(cms_url: String) -> Self {
        Self {
            addr: "127.0.0.1:0".parse().unwrap(),
            cms_url,
            cache_ttl_secs: 60,
            cache_capacity: 0,
            cms_rps: 0,
            home_revalidate_secs: 300,
            movie_revalidate_secs: 3600,
            search_debounce_ms: 20,
            warm_on_start: false,
            warm_concurrency: 2,
        }
    }
}
