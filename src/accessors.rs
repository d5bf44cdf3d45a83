//! Display values derived from a [`Movie`].
//!
//! Each value comes from an ordered chain of lookups evaluated left to right.
//! URL chains accept the first field that is set; text chains skip empty
//! strings as well. None of these functions can fail.

use std::borrow::Cow;

use scraper::Html;

use crate::models::{ImageRef, Movie, MovieFields};

pub const POSTER_ALT_FALLBACK: &str = "Movie poster";
pub const BACKGROUND_ALT_FALLBACK: &str = "Movie background";
pub const DESCRIPTION_PLACEHOLDER: &str =
    "Discover this amazing movie and explore the full collection.";

pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const META_DESCRIPTION_MAX_CHARS: usize = 155;

type Lookup = fn(&Movie) -> Option<&str>;

const POSTER_URL: &[Lookup] = &[acf_poster_url, featured_url];
const POSTER_ALT: &[Lookup] = &[acf_poster_alt, featured_alt, title];
const BACKGROUND_URL: &[Lookup] = &[acf_background_url, acf_poster_url, featured_url];
const BACKGROUND_ALT: &[Lookup] = &[acf_background_alt, acf_poster_alt, featured_alt, title];
const SHORT_TEXT: &[Lookup] = &[short_description];
const LONG_TEXT: &[Lookup] = &[full_description, short_description];
const YEAR_SOURCES: &[Lookup] = &[release_year, publish_date];

fn fields(movie: &Movie) -> Option<&MovieFields> {
    movie.movie_fields.as_ref()
}

fn acf_poster_url(movie: &Movie) -> Option<&str> {
    fields(movie)?.poster_image.as_ref().and_then(ImageRef::url)
}

fn acf_poster_alt(movie: &Movie) -> Option<&str> {
    fields(movie)?.poster_image.as_ref().and_then(ImageRef::alt)
}

fn acf_background_url(movie: &Movie) -> Option<&str> {
    fields(movie)?.background_hero_image.as_ref().and_then(ImageRef::url)
}

fn acf_background_alt(movie: &Movie) -> Option<&str> {
    fields(movie)?.background_hero_image.as_ref().and_then(ImageRef::alt)
}

fn featured_url(movie: &Movie) -> Option<&str> {
    movie.featured_image.as_ref().and_then(ImageRef::url)
}

fn featured_alt(movie: &Movie) -> Option<&str> {
    movie.featured_image.as_ref().and_then(ImageRef::alt)
}

fn title(movie: &Movie) -> Option<&str> {
    Some(movie.title.as_str())
}

fn short_description(movie: &Movie) -> Option<&str> {
    fields(movie)?.short_description.as_deref()
}

fn full_description(movie: &Movie) -> Option<&str> {
    fields(movie)?.full_description.as_deref()
}

fn release_year(movie: &Movie) -> Option<&str> {
    fields(movie)?.release_year.as_deref()
}

fn publish_date(movie: &Movie) -> Option<&str> {
    movie.publish_date.as_deref()
}

fn first_set<'a>(movie: &'a Movie, chain: &[Lookup]) -> Option<&'a str> {
    chain.iter().find_map(|lookup| lookup(movie))
}

fn first_non_empty<'a>(movie: &'a Movie, chain: &[Lookup]) -> Option<&'a str> {
    chain.iter().filter_map(|lookup| lookup(movie)).find(|s| !s.is_empty())
}

pub fn poster_url(movie: &Movie) -> Option<&str> {
    first_set(movie, POSTER_URL)
}

pub fn poster_alt(movie: &Movie) -> &str {
    first_non_empty(movie, POSTER_ALT).unwrap_or(POSTER_ALT_FALLBACK)
}

pub fn background_url(movie: &Movie) -> Option<&str> {
    first_set(movie, BACKGROUND_URL)
}

pub fn background_alt(movie: &Movie) -> &str {
    first_non_empty(movie, BACKGROUND_ALT).unwrap_or(BACKGROUND_ALT_FALLBACK)
}

/// Card and hero copy: short description, else the first 200 characters of
/// the plain-text content, else a placeholder.
pub fn description(movie: &Movie) -> Cow<'_, str> {
    if let Some(short) = first_non_empty(movie, SHORT_TEXT) {
        return Cow::Borrowed(short);
    }
    match content_text(movie) {
        Some(text) => Cow::Owned(truncate_chars(&text, DESCRIPTION_MAX_CHARS)),
        None => Cow::Borrowed(DESCRIPTION_PLACEHOLDER),
    }
}

/// Detail page body; `None` lets the page show its own "coming soon" copy.
pub fn long_description(movie: &Movie) -> Option<Cow<'_, str>> {
    first_non_empty(movie, LONG_TEXT).map(Cow::Borrowed).or_else(|| content_text(movie).map(Cow::Owned))
}

pub fn meta_description(movie: &Movie) -> String {
    if let Some(short) = first_non_empty(movie, SHORT_TEXT) {
        return short.to_string();
    }
    match content_text(movie) {
        Some(text) => truncate_chars(&text, META_DESCRIPTION_MAX_CHARS),
        None => format!("Watch {}: discover details, trailers, and more on MovieFinder.", movie.title),
    }
}

/// Year of the ACF release date, else of the publish date.
pub fn display_year(movie: &Movie) -> Option<i16> {
    YEAR_SOURCES.iter().filter_map(|lookup| lookup(movie)).find_map(parse_year)
}

/// Numeric rating for ordering; ratings like "8.5/10" use the leading number.
pub fn rating_value(movie: &Movie) -> Option<f32> {
    let rating = fields(movie)?.rating.as_deref()?.trim();
    let end = rating.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rating.len());
    rating[..end].parse().ok()
}

fn content_text(movie: &Movie) -> Option<String> {
    let html = movie.rich_content.as_deref()?;
    let text = strip_html(html);
    (!text.is_empty()).then_some(text)
}

/// Plain text of an HTML fragment with every tag removed.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect::<String>().trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn parse_year(s: &str) -> Option<i16> {
    let s = s.trim();
    if let Ok(date) = s.parse::<jiff::civil::Date>() {
        return Some(date.year());
    }
    if let Ok(dt) = s.parse::<jiff::civil::DateTime>() {
        return Some(dt.year());
    }
    // ACF date pickers store `Ymd` ("20240315") by default.
    let digits = s.get(..4)?;
    if digits.chars().all(|c| c.is_ascii_digit()) { digits.parse().ok() } else { None }
}
