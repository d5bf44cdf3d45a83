use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::{
    AppState, accessors,
    error::{AppError, AppResult},
    models::{Movie, MovieRow, SearchQuery, SearchResultsQuery},
    queries, templates,
};

const ROW_LEN: usize = 10;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/movie/{slug}", get(movie_detail))
        .route("/search", get(search))
        .route("/search/results", get(search_results))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let ttl = state.config.home_revalidate_secs;
    let movies = match queries::list_movies(&state.cms, Some(ttl)).await {
        Ok(movies) => movies,
        Err(err) => {
            warn!(error = %err, "failed to fetch movies");
            Vec::new()
        },
    };

    Html(templates::home_page(&home_rows(movies)))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let ttl = state.config.movie_revalidate_secs;
    match queries::movie_by_slug(&state.cms, &slug, Some(ttl)).await {
        Ok(Some(movie)) => Html(templates::movie_page(&movie)).into_response(),
        Ok(None) => {
            debug!(slug = %slug, "movie not found");
            not_found()
        },
        Err(err) => {
            warn!(slug = %slug, error = %err, "failed to fetch movie");
            not_found()
        },
    }
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> Html<String> {
    let query = q.q.unwrap_or_default().trim().to_string();
    let session = state.search.new_session();

    let results = if query.is_empty() { None } else { Some(run_search(&state, &query).await) };

    Html(templates::search_page(&query, &session, results.as_deref()))
}

/// Live results for the search box. Superseded keystrokes get an empty 204.
pub async fn search_results(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchResultsQuery>,
) -> AppResult<Response> {
    let session = q
        .session
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("session is required")))?;
    let query = q.q.unwrap_or_default().trim().to_string();

    let outcome = state
        .search
        .run(&session, || async {
            if query.is_empty() { None } else { Some(run_search(&state, &query).await) }
        })
        .await;

    let Some(results) = outcome else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let mut resp =
        Html(templates::search_results_fragment(&query, results.as_deref())).into_response();
    resp.headers_mut().insert("datastar-selector", HeaderValue::from_static("#results"));
    resp.headers_mut().insert("datastar-mode", HeaderValue::from_static("outer"));
    Ok(resp)
}

pub async fn healthz() -> &'static str {
    "ok"
}

async fn run_search(state: &AppState, term: &str) -> Vec<Movie> {
    match queries::search_movies(&state.cms, term).await {
        Ok(movies) => movies,
        Err(err) => {
            warn!(term = %term, error = %err, "search failed");
            Vec::new()
        },
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(templates::not_found_page())).into_response()
}

/// Carousels for the home page, all drawn from the latest movies.
pub fn home_rows(movies: Vec<Movie>) -> Vec<MovieRow> {
    if movies.is_empty() {
        return Vec::new();
    }

    let trending: Vec<Movie> = movies.iter().take(ROW_LEN).cloned().collect();

    let mut top_rated = movies.clone();
    top_rated.sort_by(|a, b| {
        let ra = accessors::rating_value(a).unwrap_or(f32::NEG_INFINITY);
        let rb = accessors::rating_value(b).unwrap_or(f32::NEG_INFINITY);
        rb.total_cmp(&ra)
    });
    top_rated.truncate(ROW_LEN);

    let new_releases: Vec<Movie> = movies.iter().rev().take(ROW_LEN).cloned().collect();

    let action: Vec<Movie> = movies.iter().step_by(2).take(ROW_LEN).cloned().collect();

    let mut popular = movies;
    let mid = popular.len() / 2;
    popular.rotate_left(mid);
    popular.truncate(ROW_LEN);

    vec![
        MovieRow { title: "🔥 Trending Now", movies: trending },
        MovieRow { title: "⭐ Top Rated", movies: top_rated },
        MovieRow { title: "🆕 New Releases", movies: new_releases },
        MovieRow { title: "💥 Action & Thriller", movies: action },
        MovieRow { title: "🍿 Popular on MovieFinder", movies: popular },
    ]
}
