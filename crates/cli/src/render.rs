//! Plain-text rendering of catalog data.

use std::fmt::Write;
use std::sync::Arc;

use tvshelf_core::{LazyDisclosure, Show, ShowImage};

/// One-line summary: name, year, rating and genres.
pub fn show_line(show: &Show) -> String {
    let mut line = format!("{:>7}  {}", show.id, show.name);
    if let Some(year) = show.premiere_year() {
        let _ = write!(line, " ({})", year);
    }
    match show.rating.average {
        Some(rating) => {
            let _ = write!(line, "  {:.1}", rating);
        }
        None => line.push_str("  -"),
    }
    if !show.genres.is_empty() {
        let _ = write!(line, "  [{}]", show.genres.join(", "));
    }
    line
}

/// A genre heading followed by the visible part of its row.
pub fn genre_row(genre: &str, row: &LazyDisclosure<Arc<Show>>) -> String {
    let mut out = format!(
        "{} ({}/{}, {:.0}%)\n",
        genre,
        row.visible_items().len(),
        row.total_count(),
        row.progress_percentage()
    );
    for show in row.visible_items() {
        let _ = writeln!(out, "  {}", show_line(&show));
    }
    if row.has_more_items() {
        let hidden = row.total_count().saturating_sub(row.visible_count());
        let _ = writeln!(out, "  ... {} more", hidden);
    }
    out
}

/// Multi-line detail view.
pub fn show_details(show: &Show, banner: Option<&ShowImage>) -> String {
    let mut out = format!("{}\n", show_line(show));
    if let Some(status) = &show.status {
        let _ = writeln!(out, "Status:   {}", status);
    }
    if let Some(runtime) = show.runtime.or(show.average_runtime) {
        let _ = writeln!(out, "Runtime:  {} min", runtime);
    }
    if let Some(language) = &show.language {
        let _ = writeln!(out, "Language: {}", language);
    }
    let _ = writeln!(out, "Page:     {}", show.url);
    match banner {
        Some(image) => {
            let _ = writeln!(out, "Banner:   {}", image.resolutions.original.url);
        }
        None => out.push_str("Banner:   none\n"),
    }
    if let Some(summary) = &show.summary {
        let _ = writeln!(out, "\n{}", strip_tags(summary));
    }
    out
}

/// Drop HTML tags from a TVmaze summary.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.trim().to_string()
}
