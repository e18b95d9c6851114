use serde::{Deserialize, Deserializer, Serialize};

/// Artist credit on a release
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscogsArtist {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Label credit on a release
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscogsLabel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub catno: Option<String>,
}

/// Physical format of a release (e.g. "Vinyl", qty "2", ["LP", "Album"])
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscogsFormat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub qty: Option<String>,
    #[serde(default)]
    pub descriptions: Option<Vec<String>>,
}

/// Image reference; the first entry is the high-resolution primary in practice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscogsImage {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub image_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default)]
    pub uri150: Option<String>,
}

/// Represents a track from Discogs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscogsTrack {
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Duration as string from Discogs (e.g., "3:45")
    #[serde(default)]
    pub duration: Option<String>,
}

/// Full release detail as returned by `/releases/{id}`
///
/// Only `id` is required; everything else is optional because Discogs omits
/// fields freely depending on how complete the submission is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscogsRelease {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<DiscogsArtist>>,
    #[serde(default)]
    pub artists_sort: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<DiscogsLabel>>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub styles: Option<Vec<String>>,
    #[serde(default)]
    pub formats: Option<Vec<DiscogsFormat>>,
    #[serde(default)]
    pub tracklist: Option<Vec<DiscogsTrack>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<DiscogsImage>>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl DiscogsRelease {
    pub fn genres(&self) -> &[String] {
        self.genres.as_deref().unwrap_or_default()
    }

    pub fn styles(&self) -> &[String] {
        self.styles.as_deref().unwrap_or_default()
    }

    pub fn tracklist(&self) -> &[DiscogsTrack] {
        self.tracklist.as_deref().unwrap_or_default()
    }
}

/// Flattened search result, list fields already joined for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscogsSearchResult {
    pub id: u64,
    pub title: String,
    pub year: String,
    pub format: String,
    pub label: String,
    pub country: String,
    pub genre: String,
    pub style: String,
    pub thumb: String,
    pub cover_image: String,
}

/// Discogs API pagination info
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PaginationInfo {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    pub items: u32,
}

impl Default for PaginationInfo {
    fn default() -> Self {
        PaginationInfo {
            page: 1,
            pages: 1,
            per_page: 20,
            items: 0,
        }
    }
}

/// One page of normalized search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchPage {
    pub results: Vec<DiscogsSearchResult>,
    pub pagination: PaginationInfo,
}

/// Explicit `null` reads as the type's default, same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Discogs sends `year` and `qty` as either a JSON string or a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
