use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetails {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    #[serde(default)]
    pub media_item_url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub media_details: Option<MediaDetails>,
}

/// Image reference as WPGraphQL wraps it: `{ node: { .. } }`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ImageRef {
    pub node: Option<ImageNode>,
}

impl ImageRef {
    pub fn url(&self) -> Option<&str> {
        self.node.as_ref()?.media_item_url.as_deref()
    }

    pub fn alt(&self) -> Option<&str> {
        self.node.as_ref()?.alt_text.as_deref()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MovieFields {
    #[serde(default)]
    pub poster_image: Option<ImageRef>,
    #[serde(default, rename = "backgroundheroImage")]
    pub background_hero_image: Option<ImageRef>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub release_year: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(rename = "databaseId")]
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, rename = "date")]
    pub publish_date: Option<String>,
    #[serde(default, rename = "content")]
    pub rich_content: Option<String>,
    #[serde(default)]
    pub featured_image: Option<ImageRef>,
    #[serde(default)]
    pub movie_fields: Option<MovieFields>,
}

#[derive(Debug, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct MoviesData {
    pub movies: Nodes<Movie>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieBySlugData {
    pub movie_by: Option<Movie>,
}

#[derive(Debug, Deserialize)]
pub struct SlugNode {
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct SlugsData {
    pub movies: Nodes<SlugNode>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResultsQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

/// A titled carousel on the home page.
#[derive(Clone, Debug)]
pub struct MovieRow {
    pub title: &'static str,
    pub movies: Vec<Movie>,
}
