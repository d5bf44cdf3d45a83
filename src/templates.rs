use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde_json::json;

use crate::{
    accessors,
    models::{Movie, MovieRow},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const DATASTAR_CDN: &str =
    "https://cdn.jsdelivr.net/npm/@sudodevnull/datastar@0.19.9/dist/datastar.js";

const SITE_NAME: &str = "MovieFinder";
const SITE_DESCRIPTION: &str = "Discover and explore the latest movies with MovieFinder.";

const FILM_ICON: &str = "M15.75 10.5l4.72-4.72a.75.75 0 011.28.53v11.38a.75.75 0 01-1.28.53l-4.72-4.72M4.5 18.75h9a2.25 2.25 0 002.25-2.25v-9a2.25 2.25 0 00-2.25-2.25h-9A2.25 2.25 0 002.25 7.5v9a2.25 2.25 0 002.25 2.25z";
const SEARCH_ICON: &str = "M21 21l-6-6m2-5a7 7 0 11-14 0 7 7 0 0114 0z";

pub fn home_page(rows: &[MovieRow]) -> String {
    let Some(hero) = rows.first().and_then(|r| r.movies.first()) else {
        return empty_home_page();
    };

    let ld = json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": SITE_NAME,
        "url": "/",
        "description": SITE_DESCRIPTION,
        "potentialAction": {
            "@type": "SearchAction",
            "target": "/search?q={search_term_string}",
            "query-input": "required name=search_term_string",
        },
    });

    page(
        SITE_NAME,
        SITE_DESCRIPTION,
        html! {
            (json_ld(&ld))
            (hero_section(hero))
            div class="-mt-16 relative z-10 pb-8" {
                @for (index, row) in rows.iter().enumerate() {
                    (movie_row(row, index < 2))
                }
            }
        },
    )
}

fn empty_home_page() -> String {
    page(
        SITE_NAME,
        SITE_DESCRIPTION,
        html! {
            div class="min-h-screen flex items-center justify-center" {
                div class="text-center px-4" {
                    div class="w-20 h-20 mx-auto mb-6 rounded-full bg-zinc-800 flex items-center justify-center" {
                        (icon(FILM_ICON, "w-10 h-10 text-zinc-600"))
                    }
                    h1 class="text-3xl font-bold text-white mb-3" { "No Movies Yet" }
                    p class="text-zinc-400 max-w-md mx-auto" {
                        "Movies will appear here once they are added to the database."
                    }
                }
            }
        },
    )
}

pub fn movie_page(movie: &Movie) -> String {
    let poster_url = accessors::poster_url(movie);
    let bg_url = accessors::background_url(movie);
    let year = accessors::display_year(movie);
    let description = accessors::long_description(movie);
    let fields = movie.movie_fields.as_ref();
    let rating = fields.and_then(|f| f.rating.as_deref()).filter(|s| !s.is_empty());
    let duration = fields.and_then(|f| f.duration.as_deref()).filter(|s| !s.is_empty());
    let cast = fields.and_then(|f| f.cast.as_deref()).filter(|s| !s.is_empty());
    let trailer_url = fields.and_then(|f| f.trailer_url.as_deref()).filter(|s| !s.is_empty());

    let ld = json!({
        "@context": "https://schema.org",
        "@type": "Movie",
        "name": movie.title,
        "url": movie_href(movie),
        "dateCreated": movie.publish_date,
        "description": description
            .as_deref()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} on {SITE_NAME}", movie.title)),
        "image": poster_url,
    });

    page(
        &movie.title,
        &accessors::meta_description(movie),
        html! {
            (json_ld(&ld))
            article class="min-h-screen" {
                div class="relative w-full h-[60vh] md:h-[75vh] overflow-hidden" {
                    @if let Some(bg) = bg_url {
                        img class="absolute inset-0 w-full h-full object-cover object-top" src=(bg) alt=(accessors::background_alt(movie));
                    } @else {
                        div class="absolute inset-0 bg-gradient-to-br from-red-950/20 via-zinc-900 to-zinc-950" {}
                    }
                    div class="absolute inset-0 bg-gradient-to-t from-zinc-950 via-zinc-950/40 to-transparent" {}
                    div class="absolute inset-0 bg-gradient-to-r from-zinc-950/80 to-transparent" {}
                    div class="absolute top-20 left-4 md:left-12 z-10" {
                        a class="inline-flex items-center gap-2 px-4 py-2 bg-zinc-800/60 rounded-full text-sm text-zinc-300 hover:text-white" href="/" { "Back" }
                    }
                }

                div class="relative -mt-40 z-10 px-4 md:px-12 pb-16" {
                    div class="max-w-5xl mx-auto flex flex-col md:flex-row gap-8" {
                        div class="flex-shrink-0 w-48 md:w-64 mx-auto md:mx-0" {
                            div class="relative aspect-[2/3] rounded-xl overflow-hidden shadow-2xl ring-1 ring-white/10" {
                                @if let Some(poster) = poster_url {
                                    img class="absolute inset-0 w-full h-full object-cover" src=(poster) alt=(accessors::poster_alt(movie));
                                } @else {
                                    div class="absolute inset-0 bg-gradient-to-br from-zinc-700 to-zinc-900 flex items-center justify-center" {
                                        (icon(FILM_ICON, "w-16 h-16 text-zinc-600"))
                                    }
                                }
                            }
                        }

                        div class="flex-1 pt-4 md:pt-8" {
                            h1 class="text-3xl md:text-4xl lg:text-5xl font-black text-white mb-4 tracking-tight" { (movie.title) }

                            div class="flex flex-wrap items-center gap-3 mb-6" {
                                @if let Some(year) = year {
                                    span class="px-3 py-1 rounded-full bg-zinc-800 text-sm font-medium text-zinc-300" { (year) }
                                }
                                @if let Some(rating) = rating {
                                    span class="px-3 py-1 rounded-full bg-yellow-600/20 text-sm font-medium text-yellow-400" { "⭐ " (rating) }
                                }
                                @if let Some(duration) = duration {
                                    span class="px-3 py-1 rounded-full bg-zinc-800 text-sm font-medium text-zinc-300" { "⏱ " (duration) }
                                }
                                span class="px-3 py-1 rounded-full bg-red-600/20 text-sm font-medium text-red-400" { "HD" }
                            }

                            @if let Some(cast) = cast {
                                div class="mb-4" {
                                    span class="text-sm font-semibold text-zinc-400" { "Cast: " }
                                    span class="text-sm text-zinc-300" { (cast) }
                                }
                            }

                            @if let Some(description) = &description {
                                p class="text-base md:text-lg text-zinc-300 leading-relaxed mb-8" { (&**description) }
                            } @else {
                                p class="text-base text-zinc-400 mb-8 leading-relaxed" {
                                    "Movie details and description will be available soon. Check back later for more information about this title."
                                }
                            }

                            div class="flex flex-wrap gap-3" {
                                @if let Some(trailer) = trailer_url {
                                    a class="inline-flex items-center gap-2 px-6 py-3 bg-red-600 text-white rounded-lg font-bold text-sm hover:bg-red-700" href=(trailer) target="_blank" rel="noopener noreferrer" {
                                        "Watch Trailer"
                                    }
                                }
                                a class="inline-flex items-center gap-2 px-6 py-3 bg-white text-zinc-900 rounded-lg font-bold text-sm hover:bg-zinc-200" href="/" { "Browse More" }
                                a class="inline-flex items-center gap-2 px-6 py-3 bg-zinc-800 text-white rounded-lg font-semibold text-sm hover:bg-zinc-700" href="/search" { "Search Movies" }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn not_found_page() -> String {
    page(
        "Movie Not Found",
        SITE_DESCRIPTION,
        html! {
            div class="min-h-screen flex items-center justify-center" {
                div class="text-center px-4" {
                    h1 class="text-6xl font-black text-red-600 mb-4" { "404" }
                    h2 class="text-2xl font-bold text-white mb-3" { "Movie Not Found" }
                    p class="text-zinc-400 max-w-md mx-auto mb-8" {
                        "The movie you are looking for does not exist or has been removed."
                    }
                    a class="inline-block px-6 py-3 bg-red-600 text-white rounded-lg font-bold text-sm hover:bg-red-700" href="/" { "Back to Home" }
                }
            }
        },
    )
}

/// `results` is `Some` when the page was opened with a non-empty `q`.
pub fn search_page(query: &str, session: &str, results: Option<&[Movie]>) -> String {
    let on_input = format!(
        "@get('/search/results?session={}&q=' + encodeURIComponent(evt.target.value))",
        urlencoding::encode(session)
    );

    page(
        "Search",
        SITE_DESCRIPTION,
        html! {
            div class="pt-24 md:pt-28 px-4 md:px-12 pb-16 min-h-screen" {
                div class="mb-8" {
                    h1 class="text-2xl md:text-3xl font-bold text-white mb-6" { "Search" }
                    div class="relative w-full max-w-2xl mx-auto" {
                        (icon(SEARCH_ICON, "absolute left-4 top-1/2 -translate-y-1/2 w-5 h-5 text-zinc-400"))
                        input class="w-full pl-12 pr-4 py-3 md:py-4 bg-zinc-800/80 border border-zinc-700/50 rounded-xl text-white placeholder-zinc-400 text-base md:text-lg focus:outline-none focus:ring-2 focus:ring-red-500/50"
                            type="search" name="q" value=(query) placeholder="Search movies..."
                            aria-label="Search movies" autocomplete="off"
                            data-on-input=(PreEscaped(on_input));
                    }
                }
                (results_markup(query, results))
            }
        },
    )
}

/// `None` renders the "start typing" prompt for a cleared search box.
pub fn search_results_fragment(query: &str, movies: Option<&[Movie]>) -> String {
    results_markup(query, movies).into_string()
}

fn results_markup(query: &str, results: Option<&[Movie]>) -> Markup {
    html! {
        div id="results" class="min-h-[50vh]" {
            @match results {
                Some(movies) if !movies.is_empty() => {
                    p class="text-zinc-400 mb-6" {
                        (movies.len()) " result" @if movies.len() != 1 { "s" } " for "
                        span class="text-white font-semibold" { "“" (query) "”" }
                    }
                    div class="grid grid-cols-2 sm:grid-cols-3 md:grid-cols-4 lg:grid-cols-5 xl:grid-cols-6 gap-4" {
                        @for movie in movies {
                            (movie_card(movie, false))
                        }
                    }
                }
                Some(_) => {
                    div class="text-center py-16" {
                        div class="w-20 h-20 mx-auto mb-6 rounded-full bg-zinc-800/50 flex items-center justify-center" {
                            (icon(SEARCH_ICON, "w-10 h-10 text-zinc-600"))
                        }
                        h3 class="text-xl font-bold text-white mb-2" { "No movies found" }
                        p class="text-zinc-400 max-w-md mx-auto" {
                            "Try a different search term or browse our collection from the homepage."
                        }
                    }
                }
                None => {
                    div class="text-center py-16" {
                        div class="w-20 h-20 mx-auto mb-6 rounded-full bg-zinc-800/30 flex items-center justify-center" {
                            (icon(SEARCH_ICON, "w-10 h-10 text-zinc-600"))
                        }
                        h3 class="text-xl font-bold text-white mb-2" { "Search Movies" }
                        p class="text-zinc-400 max-w-md mx-auto" { "Start typing to discover movies from our collection." }
                    }
                }
            }
        }
    }
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        SITE_DESCRIPTION,
        html! {
            div class="min-h-screen flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-zinc-900 rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-white" { "Error" }
                        p class="mt-4 text-zinc-300" { (message) }
                        a class="mt-6 inline-block text-red-500 hover:text-red-400" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, description: &str, body: Markup) -> String {
    let full_title = if title == SITE_NAME { title.to_string() } else { format!("{title} | {SITE_NAME}") };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="description" content=(description);
                title { (full_title) }
                script src=(TAILWIND_CDN) {}
                script type="module" src=(DATASTAR_CDN) {}
            }
            body class="bg-zinc-950 text-white antialiased" {
                (nav())
                main { (body) }
            }
        }
    }
    .into_string()
}

fn nav() -> Markup {
    html! {
        nav class="fixed top-0 inset-x-0 z-50 px-4 md:px-12 py-4 flex items-center justify-between bg-gradient-to-b from-zinc-950/90 to-transparent" {
            a class="text-2xl font-black tracking-tight text-red-600" href="/" { (SITE_NAME) }
            a class="text-sm text-zinc-300 hover:text-white" href="/search" aria-label="Search" {
                (icon(SEARCH_ICON, "w-5 h-5"))
            }
        }
    }
}

fn hero_section(movie: &Movie) -> Markup {
    let year = accessors::display_year(movie);
    let fields = movie.movie_fields.as_ref();
    let rating = fields.and_then(|f| f.rating.as_deref()).filter(|s| !s.is_empty());
    let duration = fields.and_then(|f| f.duration.as_deref()).filter(|s| !s.is_empty());

    html! {
        section class="relative w-full h-[85vh] min-h-[500px] overflow-hidden" {
            @if let Some(bg) = accessors::background_url(movie) {
                img class="absolute inset-0 w-full h-full object-cover object-top" src=(bg) alt=(accessors::background_alt(movie));
            } @else {
                div class="absolute inset-0 bg-gradient-to-br from-red-950/30 via-zinc-900 to-zinc-950" {}
            }
            div class="absolute inset-0 bg-gradient-to-t from-zinc-950 via-zinc-950/50 to-transparent" {}
            div class="absolute inset-0 bg-gradient-to-r from-zinc-950/90 via-zinc-950/40 to-transparent" {}

            div class="absolute bottom-0 left-0 right-0 px-4 md:px-12 pb-24 md:pb-32" {
                div class="max-w-2xl" {
                    h1 class="text-4xl md:text-6xl font-black text-white mb-4 tracking-tight" { (movie.title) }
                    div class="flex items-center gap-3 mb-4 text-sm" {
                        @if let Some(year) = year { span class="text-zinc-300" { (year) } }
                        @if let Some(rating) = rating { span class="text-yellow-400" { "⭐ " (rating) } }
                        @if let Some(duration) = duration { span class="text-zinc-300" { (duration) } }
                    }
                    p class="text-base md:text-lg text-zinc-300 mb-6 line-clamp-3" { (&*accessors::description(movie)) }
                    div class="flex gap-3" {
                        a class="inline-flex items-center gap-2 px-6 py-3 bg-white text-zinc-900 rounded-lg font-bold hover:bg-zinc-200" href=(movie_href(movie)) { "More Info" }
                        a class="inline-flex items-center gap-2 px-6 py-3 bg-zinc-700/70 text-white rounded-lg font-semibold hover:bg-zinc-600/70" href="/search" { "Search" }
                    }
                }
            }
        }
    }
}

fn movie_row(row: &MovieRow, priority: bool) -> Markup {
    html! {
        section class="mb-8 md:mb-12" {
            h2 class="text-lg md:text-xl font-bold text-white mb-3 px-4 md:px-12" { (row.title) }
            div class="flex gap-3 overflow-x-auto scroll-smooth px-4 md:px-12 pb-4" {
                @for (i, movie) in row.movies.iter().enumerate() {
                    div class="flex-shrink-0 w-36 md:w-44" {
                        (movie_card(movie, priority && i < 6))
                    }
                }
            }
        }
    }
}

fn movie_card(movie: &Movie, eager: bool) -> Markup {
    let year = accessors::display_year(movie);
    let rating = movie
        .movie_fields
        .as_ref()
        .and_then(|f| f.rating.as_deref())
        .filter(|s| !s.is_empty());

    html! {
        a class="group block" href=(movie_href(movie)) aria-label=(format!("View details for {}", movie.title)) {
            div class="relative aspect-[2/3] rounded-lg overflow-hidden bg-zinc-800" {
                @if let Some(poster) = accessors::poster_url(movie) {
                    img class="absolute inset-0 w-full h-full object-cover group-hover:scale-105 transition-transform" src=(poster) alt=(accessors::poster_alt(movie)) loading=(if eager { "eager" } else { "lazy" });
                } @else {
                    div class="absolute inset-0 bg-gradient-to-br from-zinc-700 to-zinc-900 flex items-center justify-center p-3" {
                        span class="text-center text-sm font-semibold text-zinc-300" { (movie.title) }
                    }
                }
            }
            div class="mt-2" {
                h3 class="text-sm font-semibold text-white truncate" { (movie.title) }
                div class="flex items-center gap-2 text-xs text-zinc-400" {
                    @if let Some(year) = year { span { (year) } }
                    @if let Some(rating) = rating { span class="text-yellow-400" { "⭐ " (rating) } }
                }
            }
        }
    }
}

fn movie_href(movie: &Movie) -> String {
    format!("/movie/{}", urlencoding::encode(&movie.slug))
}

fn icon(path: &str, class: &str) -> Markup {
    html! {
        svg class=(class) fill="none" viewBox="0 0 24 24" stroke="currentColor" {
            path stroke-linecap="round" stroke-linejoin="round" stroke-width="1.5" d=(path) {}
        }
    }
}

fn json_ld(value: &serde_json::Value) -> Markup {
    // Keep `</script>` inside string values from closing the tag early.
    let body = value.to_string().replace("</", "<\\/");
    html! { script type="application/ld+json" { (PreEscaped(body)) } }
}
