//! HTML pages, built from the templates embedded at compile time.

use crate::library::{MediaEntry, MediaLibrary};
use crate::utils::{escape_html, format_file_size};

const BASE: &str = include_str!("../../templates/base.html");
const INDEX: &str = include_str!("../../templates/index.html");
const DOWNLOAD: &str = include_str!("../../templates/download.html");

/// A page template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Nest a page body inside the base layout
    pub fn with_layout(layout: &str, body: &str) -> Self {
        Self {
            source: layout.replace("{{content}}", body.trim_end()),
        }
    }

    /// Substitute placeholders; values must already be escaped
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        values
            .iter()
            .fold(self.source.clone(), |page, (key, value)| {
                page.replace(&format!("{{{{{}}}}}", key), value)
            })
    }
}

/// Templates parsed once at startup
#[derive(Debug, Clone)]
pub struct Templates {
    index: Template,
    download: Template,
}

impl Templates {
    pub fn load() -> Self {
        Self {
            index: Template::with_layout(BASE, INDEX),
            download: Template::with_layout(BASE, DOWNLOAD),
        }
    }

    /// The form page, listing what is already in the library
    pub fn index_page(&self, entries: &[MediaEntry]) -> String {
        let library = if entries.is_empty() {
            "  <p class=\"meta\">Nothing downloaded yet.</p>".to_string()
        } else {
            let items: String = entries
                .iter()
                .map(|entry| {
                    let when = entry
                        .modified
                        .map(|m| format!(", {}", m.format("%Y-%m-%d %H:%M")))
                        .unwrap_or_default();
                    format!(
                        "    <li><a href=\"{}\">{}</a> <span class=\"meta\">({}{})</span></li>\n",
                        page_url(&entry.filename),
                        escape_html(&entry.filename),
                        format_file_size(entry.size),
                        when,
                    )
                })
                .collect();
            format!("  <ul>\n{}  </ul>", items)
        };

        self.index.render(&[("title", "Home"), ("library", library.as_str())])
    }

    /// The playback page for one file
    pub fn download_page(&self, filename: &str) -> String {
        let escaped = escape_html(filename);
        let audio = escape_html(&media_url(filename));
        let image = escape_html(&media_url(&MediaLibrary::thumbnail_filename(filename)));

        self.download.render(&[
            ("title", escaped.as_str()),
            ("filename", escaped.as_str()),
            ("media_url", audio.as_str()),
            ("image_url", image.as_str()),
        ])
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::load()
    }
}

/// URL of the playback page for a file
pub fn page_url(filename: &str) -> String {
    format!("/{}/", urlencoding::encode(filename))
}

/// URL the raw file is served from
pub fn media_url(filename: &str) -> String {
    format!("/media/{}/", urlencoding::encode(filename))
}
