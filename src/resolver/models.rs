// Common data models for the resolution engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title given to the lone record of a URL that is not a collection.
pub const SINGLE_ITEM_SEED: &str = "video";

/// Platform a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Bilibili,
    Youtube,
    #[default]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bilibili => "bilibili",
            Self::Youtube => "youtube",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item of a collection (or the single item of a plain URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform item id, may be empty
    pub id: String,
    /// Starts as a placeholder, replaced as resolution progresses
    pub title: String,
    pub url: String,
    /// 1-based position inside the collection
    pub playlist_index: u32,
    pub playlist_title: Option<String>,
    /// "mm:ss"
    pub duration: Option<String>,
    pub platform: Platform,
}

impl VideoRecord {
    /// Record seeded with the `video_<index>` placeholder.
    pub fn placeholder(url: impl Into<String>, playlist_index: u32) -> Self {
        Self {
            id: String::new(),
            title: placeholder_title(playlist_index),
            url: url.into(),
            playlist_index,
            playlist_title: None,
            duration: None,
            platform: Platform::Other,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_playlist_title(mut self, playlist_title: Option<String>) -> Self {
        self.playlist_title = playlist_title;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// `video_<index>`
pub fn placeholder_title(playlist_index: u32) -> String {
    format!("video_{}", playlist_index)
}

/// Seconds to zero-padded "mm:ss"; minutes are not wrapped into hours.
pub fn format_duration(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One usable line of flat enumeration output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    /// `webpage_url`, falling back to `url`
    pub url: Option<String>,
    pub playlist_index: Option<u32>,
    pub playlist_title: Option<String>,
    /// Seconds
    pub duration: Option<f64>,
}

/// Outcome of a collection probe
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub is_collection: bool,
    pub entries: Vec<RawEntry>,
    /// Set when the probe failed; the caller should treat the URL as one item
    pub failure: Option<super::errors::ResolveError>,
}

impl ProbeReport {
    pub fn failed(error: super::errors::ResolveError) -> Self {
        Self {
            is_collection: false,
            entries: Vec::new(),
            failure: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// A probed URL with its ordered records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionContext {
    pub source_url: String,
    pub platform: Platform,
    pub is_collection: bool,
    pub records: Vec<VideoRecord>,
}

/// Response of a plain HTTP GET
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
