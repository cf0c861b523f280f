use std::fmt::Write;

use super::view::ViewSnapshot;
use crate::catalog::Movie;
use crate::config::CatalogConfig;

pub fn poster_url(movie: &Movie, config: &CatalogConfig) -> String {
    match movie.poster_path() {
        Some(path) => format!("{}{}", config.image_base_url, path),
        None => config.placeholder_image.clone(),
    }
}

pub fn render_movie(movie: &Movie, config: &CatalogConfig) -> String {
    format!(
        "  {}\n    ★ {} • {}\n    {}\n    {}\n",
        movie.title,
        movie.vote_average,
        movie.release_date,
        poster_url(movie, config),
        movie.overview().unwrap_or("No description available."),
    )
}

pub fn render_pagination(view: &ViewSnapshot) -> String {
    let pagination = view.pagination();
    let previous = if pagination.has_previous() { "[Previous]" } else { "(Previous)" };
    let next = if pagination.has_next() { "[Next]" } else { "(Next)" };
    format!("{}  {}  {}", previous, pagination.label(), next)
}

/// Render the whole view as plain text.
pub fn render(view: &ViewSnapshot, config: &CatalogConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Movie Explorer");
    let _ = writeln!(out, "Search movies with filters");
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Search: {:<24} Genre: {:<16} Release date: {}",
        if view.filters.search_term.is_empty() { "-" } else { view.filters.search_term.as_str() },
        view.genre_name().unwrap_or("All Genres"),
        view.filters.release_year.as_deref().unwrap_or("-"),
    );
    let _ = writeln!(out);

    if view.loading {
        let _ = writeln!(out, "Loading movies...");
    } else if view.results.movies.is_empty() {
        let _ = writeln!(out, "No movies found.");
    } else {
        for movie in &view.results.movies {
            let _ = writeln!(out, "{}", render_movie(movie, config));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", render_pagination(view));
    out
}

pub fn render_genres(view: &ViewSnapshot) -> String {
    let mut out = String::from("  (empty)  All Genres\n");
    for genre in &view.genres {
        let _ = writeln!(out, "  {:<8} {}", genre.id, genre.name);
    }
    out
}
