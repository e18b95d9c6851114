use crate::db::ProductStatus;
use crate::discogs::{DiscogsFormat, DiscogsRelease, DiscogsTrack};
use crate::import::hooks::Hooks;
use crate::import::types::{meta_keys, CategoryBranch, ProductDraft};

pub const SKU_PREFIX: &str = "DISCOGS-";
pub const UNTITLED_RELEASE: &str = "Untitled Release";
const SHORT_DESCRIPTION_SEPARATOR: &str = " • ";

/// Genres that publish an imported product straight away
pub const DEFAULT_AUTO_PUBLISH_GENRES: [&str; 2] = ["Rock", "Jazz"];

/// Knobs for turning a release into a product
#[derive(Debug, Clone, PartialEq)]
pub struct MapperOptions {
    /// Status used when no genre rule applies
    pub default_status: ProductStatus,
    /// Exact, case-sensitive genre names that force `publish`.
    /// Empty disables the rule.
    pub auto_publish_genres: Vec<String>,
}

impl Default for MapperOptions {
    fn default() -> Self {
        MapperOptions {
            default_status: ProductStatus::Draft,
            auto_publish_genres: DEFAULT_AUTO_PUBLISH_GENRES
                .iter()
                .map(|g| g.to_string())
                .collect(),
        }
    }
}

/// Convert a Discogs release into a product draft.
///
/// Pure apart from the hooks, which get to adjust the status, the text
/// fields, the category plan and finally the whole draft.
pub fn map_release(
    release: &DiscogsRelease,
    options: &MapperOptions,
    hooks: &Hooks,
) -> ProductDraft {
    let name = release
        .title
        .clone()
        .unwrap_or_else(|| UNTITLED_RELEASE.to_string());

    let status = hooks.product_status(resolve_status(release, options), release);
    let description = hooks.filter_description(build_description(release), release);
    let short_description =
        hooks.filter_short_description(build_short_description(release), release);
    let categories = hooks.filter_categories(build_categories(release), release);

    let draft = ProductDraft {
        name,
        description,
        short_description,
        sku: format!("{}{}", SKU_PREFIX, release.id),
        status,
        discogs_id: release.id.to_string(),
        meta: build_meta(release, hooks),
        categories,
        image_url: select_image_url(release),
    };

    hooks.filter_draft(draft, release)
}

/// Configured default, unless one of the release genres is on the allow-list
pub fn resolve_status(release: &DiscogsRelease, options: &MapperOptions) -> ProductStatus {
    let auto_publish = release
        .genres()
        .iter()
        .any(|genre| options.auto_publish_genres.iter().any(|g| g == genre));

    if auto_publish {
        ProductStatus::Publish
    } else {
        options.default_status
    }
}

/// Notes as paragraphs followed by the tracklist as an ordered list
pub fn build_description(release: &DiscogsRelease) -> String {
    let mut description = String::new();

    if let Some(notes) = release.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        description.push_str(&paragraphs(notes));
    }

    let items: Vec<String> = release
        .tracklist()
        .iter()
        .filter_map(|track| {
            let title = track.title.as_deref()?;
            let mut line = escape_html(title);
            if let Some(duration) = non_empty(track.duration.as_deref()) {
                line.push_str(&format!(" <em>({})</em>", escape_html(duration)));
            }
            Some(format!("<li>{}</li>", line))
        })
        .collect();

    if !items.is_empty() {
        description.push_str("<h3>Tracklist</h3><ol>");
        description.push_str(&items.concat());
        description.push_str("</ol>");
    }

    description
}

/// `year • country • genres`, skipping whatever is missing
pub fn build_short_description(release: &DiscogsRelease) -> String {
    let genres = release.genres().join(", ");

    // Discogs reports an unknown year as 0
    let year = non_empty(release.year.as_deref()).filter(|y| y.trim() != "0");

    [
        year,
        non_empty(release.country.as_deref()),
        non_empty(Some(genres.as_str())),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(SHORT_DESCRIPTION_SEPARATOR)
}

/// Every genre becomes a top-level category with all styles beneath it.
/// Without genres the styles themselves are top-level.
pub fn build_categories(release: &DiscogsRelease) -> Vec<CategoryBranch> {
    let genres = release.genres();
    let styles = release.styles();

    if !genres.is_empty() {
        genres
            .iter()
            .map(|genre| CategoryBranch {
                name: genre.clone(),
                children: styles.to_vec(),
            })
            .collect()
    } else {
        styles
            .iter()
            .map(|style| CategoryBranch {
                name: style.clone(),
                children: Vec::new(),
            })
            .collect()
    }
}

/// First image, then cover image, then thumbnail; first non-empty wins
pub fn select_image_url(release: &DiscogsRelease) -> Option<String> {
    let first_image = release
        .images
        .as_ref()
        .and_then(|images| images.first())
        .map(|img| img.uri.as_str());

    [
        first_image,
        release.cover_image.as_deref(),
        release.thumb.as_deref(),
    ]
    .into_iter()
    .find_map(non_empty)
    .map(str::to_string)
}

/// One line per track: `A1. Intro (1:02)`
pub fn format_tracklist(tracklist: &[DiscogsTrack]) -> String {
    tracklist
        .iter()
        .filter_map(|track| {
            let mut line = String::new();
            if !track.position.is_empty() {
                line.push_str(&track.position);
                line.push_str(". ");
            }
            if let Some(title) = &track.title {
                line.push_str(title);
            }
            if let Some(duration) = non_empty(track.duration.as_deref()) {
                line.push_str(&format!(" ({})", duration));
            }
            (!line.is_empty()).then_some(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Vinyl (2x) - LP, Album, Gatefold`, several formats joined by ", "
pub fn format_formats(formats: &[DiscogsFormat]) -> String {
    formats
        .iter()
        .filter(|f| !f.name.is_empty())
        .map(|format| {
            let mut text = format.name.clone();
            if let Some(qty) = non_empty(format.qty.as_deref()) {
                text.push_str(&format!(" ({}x)", qty));
            }
            if let Some(descriptions) = format.descriptions.as_ref().filter(|d| !d.is_empty()) {
                text.push_str(" - ");
                text.push_str(&descriptions.join(", "));
            }
            text
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_meta(release: &DiscogsRelease, hooks: &Hooks) -> Vec<(String, String)> {
    let mut meta = vec![(meta_keys::DISCOGS_ID.to_string(), release.id.to_string())];
    let mut push = |key: &str, value: String| meta.push((key.to_string(), value));

    if let Some(title) = &release.title {
        push(meta_keys::RELEASE_NAME, title.trim().to_string());
    }

    if let Some(artists) = &release.artists {
        let names: Vec<&str> = artists
            .iter()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        push(meta_keys::ARTIST, names.join(", "));
    } else if let Some(sort) = &release.artists_sort {
        push(meta_keys::ARTIST, sort.trim().to_string());
    }

    if let Some(country) = &release.country {
        push(meta_keys::COUNTRY, country.trim().to_string());
    }

    if let Some(date) = release.released.as_ref().or(release.year.as_ref()) {
        push(meta_keys::DATE, date.trim().to_string());
    }

    if let Some(labels) = &release.labels {
        let names: Vec<&str> = labels
            .iter()
            .map(|l| l.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        push(meta_keys::LABEL, names.join(", "));
    }

    if let Some(genres) = &release.genres {
        push(meta_keys::GENRE, genres.join(", "));
    }

    if let Some(styles) = &release.styles {
        push(meta_keys::STYLE, styles.join(", "));
    }

    if let Some(tracklist) = &release.tracklist {
        push(
            meta_keys::TRACKLIST,
            hooks.filter_tracklist(format_tracklist(tracklist), release),
        );
    }

    if let Some(formats) = &release.formats {
        push(meta_keys::FORMAT, format_formats(formats));
    }

    if let Some(thumb) = &release.thumb {
        push(meta_keys::THUMBNAIL_URL, thumb.trim().to_string());
    }

    meta
}

/// Blank lines separate paragraphs, single newlines become `<br />`
fn paragraphs(text: &str) -> String {
    fn flush(lines: &mut Vec<&str>, out: &mut String) {
        if !lines.is_empty() {
            let body: Vec<String> = lines.iter().map(|l| escape_html(l.trim())).collect();
            out.push_str(&format!("<p>{}</p>\n", body.join("<br />\n")));
            lines.clear();
        }
    }

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::new();
    let mut current: Vec<&str> = Vec::new();

    for line in normalized.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut out);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut out);

    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
