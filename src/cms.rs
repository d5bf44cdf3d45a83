use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use jiff::Timestamp;
use reqwest::header::CACHE_CONTROL;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    cache::{CacheEntry, CacheStore, cache_key},
    error::FetchError,
};

/// GraphQL client for the CMS with a TTL response cache in front of it.
///
/// Concurrent identical requests are not coalesced: each one that misses the
/// cache goes to the network and the last response to arrive wins the slot.
pub struct CmsClient {
    client: reqwest::Client,
    endpoint: String,
    cache: Arc<dyn CacheStore>,
    default_ttl_secs: u64,
    limiter: Option<Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
}

impl CmsClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        cache: Arc<dyn CacheStore>,
        default_ttl_secs: u64,
        rps: u32,
    ) -> Self {
        let limiter =
            NonZeroU32::new(rps).map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));
        Self { client, endpoint, cache, default_ttl_secs, limiter }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Runs `query` and deserializes its `data` into `T`.
    ///
    /// `ttl_secs` defaults to the client's configured TTL and is also sent to
    /// the CMS as the `Cache-Control` max-age.
    pub async fn fetch_data<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
        ttl_secs: Option<u64>,
    ) -> Result<T, FetchError> {
        let data = self.fetch_value(query, variables, ttl_secs).await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn fetch_value(
        &self,
        query: &str,
        variables: Option<Value>,
        ttl_secs: Option<u64>,
    ) -> Result<Value, FetchError> {
        let key = cache_key(query, variables.as_ref());
        let ttl = ttl_secs.unwrap_or(self.default_ttl_secs);

        if let Some(entry) = self.cache.get(&key) {
            if entry.is_fresh(Timestamp::now(), ttl) {
                debug!(ttl, "cms cache hit");
                return Ok(entry.data);
            }
        }

        debug!(ttl, "cms cache miss");

        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let body = GraphQLRequest { query, variables: variables.as_ref() };
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CACHE_CONTROL, format!("max-age={ttl}"))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Transport { status });
        }

        let bytes = resp.bytes().await?;
        let resp: GraphQLResponse = serde_json::from_slice(&bytes)?;

        let errors = resp.errors.unwrap_or_default();
        if let Some(first) = errors.first() {
            error!(errors = ?errors, "GraphQL errors");
            return Err(FetchError::Query { message: first.message.clone() });
        }

        let data = resp.data.unwrap_or(Value::Null);
        self.cache.put(key, CacheEntry::new(data.clone(), Timestamp::now()));

        Ok(data)
    }
}

#[derive(Debug, Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    use super::*;
    use crate::cache::MemoryCache;

    pub(crate) fn client_for(server: &MockServer) -> CmsClient {
        CmsClient::new(
            reqwest::Client::new(),
            server.url("/graphql"),
            Arc::new(MemoryCache::default()),
            60,
            0,
        )
    }

    const QUERY: &str = "query GetMovieBySlug($slug: String!) { movieBy(slug: $slug) { slug } }";

    #[tokio::test]
    async fn second_call_within_ttl_is_served_from_cache() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql").body_contains(r#""slug":"heat""#);
                then.status(200).json_body(json!({ "data": { "movieBy": { "slug": "heat" } } }));
            })
            .await;

        let client = client_for(&server);
        let first = client.fetch_value(QUERY, Some(json!({ "slug": "heat" })), None).await.unwrap();
        let second =
            client.fetch_value(&format!("  {QUERY}\n"), Some(json!({ "slug": "heat" })), None)
                .await
                .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, json!({ "movieBy": { "slug": "heat" } }));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn different_variables_use_different_slots() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({ "data": { "movieBy": null } }));
            })
            .await;

        let client = client_for(&server);
        client.fetch_value(QUERY, Some(json!({ "slug": "a" })), None).await.unwrap();
        client.fetch_value(QUERY, Some(json!({ "slug": "b" })), None).await.unwrap();

        mock.assert_hits_async(2).await;
        assert_eq!(client.cache().len(), 2);
    }

    #[tokio::test]
    async fn stale_entry_triggers_refetch() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({ "data": { "movieBy": { "slug": "new" } } }));
            })
            .await;

        let client = client_for(&server);
        let vars = json!({ "slug": "x" });
        let key = cache_key(QUERY, Some(&vars));
        let two_minutes_ago =
            Timestamp::from_millisecond(Timestamp::now().as_millisecond() - 120_000).unwrap();
        client
            .cache()
            .put(key.clone(), CacheEntry::new(json!({ "movieBy": { "slug": "old" } }), two_minutes_ago));

        let data = client.fetch_value(QUERY, Some(vars), Some(60)).await.unwrap();

        assert_eq!(data, json!({ "movieBy": { "slug": "new" } }));
        mock.assert_hits_async(1).await;
        assert!(client.cache().get(&key).unwrap().stored_at > two_minutes_ago);
    }

    #[tokio::test]
    async fn ttl_override_is_sent_as_max_age() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/graphql")
                    .header("cache-control", "max-age=300")
                    .header("content-type", "application/json");
                then.status(200).json_body(json!({ "data": { "movies": { "nodes": [] } } }));
            })
            .await;

        let client = client_for(&server);
        client.fetch_value("query GetAllMovies { x }", None, Some(300)).await.unwrap();

        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn graphql_errors_fail_with_first_message_and_skip_cache() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({
                    "data": { "movieBy": { "slug": "partial" } },
                    "errors": [{ "message": "Internal server error" }, { "message": "second" }]
                }));
            })
            .await;

        let client = client_for(&server);
        let err = client.fetch_value(QUERY, Some(json!({ "slug": "p" })), None).await.unwrap_err();
        assert!(matches!(&err, FetchError::Query { message } if message == "Internal server error"));
        assert!(client.cache().is_empty());

        let _ = client.fetch_value(QUERY, Some(json!({ "slug": "p" })), None).await;
        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn empty_errors_array_is_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({ "data": { "movieBy": null }, "errors": [] }));
            })
            .await;

        let client = client_for(&server);
        let data = client.fetch_value(QUERY, Some(json!({ "slug": "p" })), None).await.unwrap();
        assert_eq!(data, json!({ "movieBy": null }));
    }

    #[tokio::test]
    async fn null_errors_is_success_and_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200)
                    .json_body(json!({ "data": { "movieBy": { "slug": "heat" } }, "errors": null }));
            })
            .await;

        let client = client_for(&server);
        let vars = json!({ "slug": "heat" });
        let data = client.fetch_value(QUERY, Some(vars.clone()), None).await.unwrap();
        assert_eq!(data, json!({ "movieBy": { "slug": "heat" } }));

        let key = cache_key(QUERY, Some(&vars));
        assert_eq!(client.cache().get(&key).unwrap().data, data);

        client.fetch_value(QUERY, Some(vars), None).await.unwrap();
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(502).body("bad gateway");
            })
            .await;

        let client = client_for(&server);
        let err = client.fetch_value(QUERY, None, None).await.unwrap_err();
        assert!(
            matches!(&err, FetchError::Transport { status } if *status == reqwest::StatusCode::BAD_GATEWAY)
        );
        assert_eq!(err.to_string(), "GraphQL request failed: 502 Bad Gateway");
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn mismatched_shape_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({ "data": { "movieBy": 42 } }));
            })
            .await;

        let client = client_for(&server);
        let err = client
            .fetch_data::<crate::models::MovieBySlugData>(QUERY, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
