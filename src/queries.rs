//! GraphQL documents sent to the CMS and typed wrappers around them.
//!
//! Every full-record query selects the same shape through `movie_selection!`,
//! so adding a field to `movieFields` only touches one place.

use serde_json::json;

use crate::{
    cms::CmsClient,
    error::FetchError,
    models::{Movie, MovieBySlugData, MoviesData, SlugsData},
};

macro_rules! image_selection {
    () => {
        "node { mediaItemUrl altText mediaDetails { width height } }"
    };
}

macro_rules! movie_selection {
    () => {
        concat!(
            "databaseId slug title uri date content ",
            "featuredImage { ",
            image_selection!(),
            " } ",
            "movieFields { ",
            "posterImage { ",
            image_selection!(),
            " } ",
            "backgroundheroImage { ",
            image_selection!(),
            " } ",
            "shortDescription fullDescription releaseYear duration rating cast trailerUrl ",
            "}"
        )
    };
}

pub const GET_ALL_MOVIES: &str = concat!(
    "query GetAllMovies { movies(first: 50, where: { orderby: { field: DATE, order: DESC } }) { nodes { ",
    movie_selection!(),
    " } } }"
);

pub const GET_MOVIE_BY_SLUG: &str = concat!(
    "query GetMovieBySlug($slug: String!) { movieBy(slug: $slug) { ",
    movie_selection!(),
    " } }"
);

pub const GET_ALL_SLUGS: &str = "query GetAllSlugs { movies(first: 100) { nodes { slug } } }";

pub const SEARCH_MOVIES: &str = concat!(
    "query SearchMovies($search: String!) { movies(first: 20, where: { search: $search }) { nodes { ",
    movie_selection!(),
    " } } }"
);

pub async fn list_movies(cms: &CmsClient, ttl_secs: Option<u64>) -> Result<Vec<Movie>, FetchError> {
    let data: MoviesData = cms.fetch_data(GET_ALL_MOVIES, None, ttl_secs).await?;
    Ok(data.movies.nodes)
}

/// `Ok(None)` when the CMS has no movie under `slug`.
pub async fn movie_by_slug(
    cms: &CmsClient,
    slug: &str,
    ttl_secs: Option<u64>,
) -> Result<Option<Movie>, FetchError> {
    let data: MovieBySlugData =
        cms.fetch_data(GET_MOVIE_BY_SLUG, Some(json!({ "slug": slug })), ttl_secs).await?;
    Ok(data.movie_by)
}

pub async fn all_slugs(cms: &CmsClient) -> Result<Vec<String>, FetchError> {
    let data: SlugsData = cms.fetch_data(GET_ALL_SLUGS, None, None).await?;
    Ok(data.movies.nodes.into_iter().map(|n| n.slug).collect())
}

pub async fn search_movies(cms: &CmsClient, term: &str) -> Result<Vec<Movie>, FetchError> {
    let data: MoviesData =
        cms.fetch_data(SEARCH_MOVIES, Some(json!({ "search": term })), None).await?;
    Ok(data.movies.nodes)
}
