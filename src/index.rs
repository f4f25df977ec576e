//! Static HTML listing of the cached collection.
//!
//! Movies and series are rendered in separate sections, each sorted by
//! title. Poster and file links are relative to the scanned root so the page
//! keeps working when the directory is moved or served.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reeltag_core::{MediaKind, MetadataRecord};

use crate::cache::MetadataCache;

/// File name of the generated page, at the scanned root.
pub const INDEX_FILE: &str = "index.html";

/// Genres shown per card.
const MAX_GENRES: usize = 3;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }
h1, h2 { color: #333; }
.media-grid { display: flex; flex-wrap: wrap; gap: 20px; }
.media-card { width: 200px; background: #fff; border-radius: 8px; overflow: hidden; box-shadow: 0 4px 8px rgba(0,0,0,0.1); }
.poster { width: 100%; height: 300px; object-fit: cover; background: #ddd; }
.media-info { padding: 10px; }
.media-title { font-weight: bold; margin-bottom: 5px; }
.media-year { color: #666; }
.media-rating { color: #f90; }
.media-genres, .media-overview { font-size: 12px; color: #333; }
.media-play { display: block; margin-top: 10px; }
";

/// Render the page for every record in `cache`.
pub fn render_index(root: &Path, cache: &MetadataCache) -> String {
    let (mut movies, mut series): (Vec<_>, Vec<_>) = cache
        .iter()
        .partition(|(_, record)| record.kind == MediaKind::Movie);
    movies.sort_by(|a, b| a.1.title.cmp(&b.1.title));
    series.sort_by(|a, b| a.1.title.cmp(&b.1.title));

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Media Collection</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>Media Collection</h1>\n");

    render_section(&mut html, root, "movies", "Movies", &movies);
    render_section(&mut html, root, "series", "Series", &series);

    html.push_str("</body>\n</html>\n");
    html
}

/// Render and write `index.html` under `root`.
pub fn write_index(root: &Path, cache: &MetadataCache) -> Result<PathBuf> {
    let path = root.join(INDEX_FILE);
    std::fs::write(&path, render_index(root, cache))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote HTML index {}", path.display());
    Ok(path)
}

fn render_section(
    html: &mut String,
    root: &Path,
    id: &str,
    heading: &str,
    entries: &[(&str, &MetadataRecord)],
) {
    let _ = writeln!(html, "<section id=\"{id}\">\n<h2>{heading} ({})</h2>", entries.len());
    html.push_str("<div class=\"media-grid\">\n");
    for (key, record) in entries {
        render_card(html, root, key, record);
    }
    html.push_str("</div>\n</section>\n");
}

fn render_card(html: &mut String, root: &Path, key: &str, record: &MetadataRecord) {
    let title = escape(&record.title);
    html.push_str("<div class=\"media-card\">\n");

    match record.local_poster_path.as_deref() {
        Some(poster) => {
            let src = poster.strip_prefix(root).unwrap_or(poster);
            let _ = writeln!(
                html,
                "<img class=\"poster\" src=\"{}\" alt=\"{title}\">",
                escape(&link(src))
            );
        }
        None => html.push_str("<div class=\"poster\"></div>\n"),
    }

    let genres: Vec<&str> = record
        .genres
        .iter()
        .take(MAX_GENRES)
        .map(String::as_str)
        .collect();

    let _ = writeln!(
        html,
        "<div class=\"media-info\">\n\
         <div class=\"media-title\">{title}</div>\n\
         <div class=\"media-year\">{}</div>\n\
         <div class=\"media-rating\">&#9733; {}/10</div>\n\
         <div class=\"media-genres\">{}</div>\n\
         <p class=\"media-overview\">{}</p>\n\
         <a class=\"media-play\" href=\"{}\">Play</a>\n\
         </div>",
        escape(&record.year),
        record.rating,
        escape(&genres.join(", ")),
        escape(&record.overview),
        escape(&link(Path::new(key))),
    );
    html.push_str("</div>\n");
}

/// URL form of a relative path: forward slashes, each component
/// percent-encoded.
fn link(path: &Path) -> String {
    path.components()
        .map(|c| urlencoding::encode(&c.as_os_str().to_string_lossy()).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Escape text for HTML element content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
