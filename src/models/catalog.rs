//! Catalog tree of a PlayOn server: folders, videos and their detail fields.

use crate::services::playon::{PlayOnApi, PlayOnError};
use crate::timespan::parse_time_span;
use regex::Regex;
use std::cell::OnceCell;
use std::sync::LazyLock;
use std::time::Duration;

/// Runtime assumed for a video whose runtime text cannot be parsed.
pub const UNKNOWN_RUNTIME: Duration = Duration::from_secs(5 * 60 * 60);

static UNSAFE_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("Invalid key sanitising regex"));

/// A node of the remote catalog tree.
#[derive(Debug, Clone)]
pub enum CatalogItem {
    Folder(Folder),
    Video(Video),
}

impl CatalogItem {
    pub fn name(&self) -> &str {
        match self {
            CatalogItem::Folder(folder) => &folder.name,
            CatalogItem::Video(video) => &video.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            CatalogItem::Folder(folder) => &folder.url,
            CatalogItem::Video(video) => &video.url,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, CatalogItem::Folder(_))
    }

    pub fn is_video(&self) -> bool {
        matches!(self, CatalogItem::Video(_))
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            CatalogItem::Folder(folder) => Some(folder),
            CatalogItem::Video(_) => None,
        }
    }

    pub fn as_video(&self) -> Option<&Video> {
        match self {
            CatalogItem::Video(video) => Some(video),
            CatalogItem::Folder(_) => None,
        }
    }
}

impl From<Folder> for CatalogItem {
    fn from(folder: Folder) -> Self {
        CatalogItem::Folder(folder)
    }
}

impl From<Video> for CatalogItem {
    fn from(video: Video) -> Self {
        CatalogItem::Video(video)
    }
}

/// A catalog folder. Children are fetched through the transport on first
/// access and cached for the lifetime of the folder.
#[derive(Debug, Clone)]
pub struct Folder {
    name: String,
    url: String,
    searchable: bool,
    children: OnceCell<Vec<CatalogItem>>,
}

impl Folder {
    /// A folder whose children will be fetched lazily from `url`.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            searchable: false,
            children: OnceCell::new(),
        }
    }

    /// A folder whose children are already known (catalog root, search results).
    pub fn with_children(
        name: impl Into<String>,
        url: impl Into<String>,
        children: Vec<CatalogItem>,
    ) -> Self {
        let folder = Self::new(name, url);
        let _ = folder.children.set(children);
        folder
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    /// Whether the children have been fetched (or were supplied up front).
    pub fn is_loaded(&self) -> bool {
        self.children.get().is_some()
    }

    /// Children of this folder, fetched at most once.
    pub fn children(&self, api: &dyn PlayOnApi) -> Result<&[CatalogItem], PlayOnError> {
        if let Some(children) = self.children.get() {
            return Ok(children);
        }
        let fetched = api.get_items(&self.url)?;
        Ok(self.children.get_or_init(|| fetched))
    }

    /// Run a remote search scoped to this folder.
    pub fn search(&self, api: &dyn PlayOnApi, term: &str) -> Result<Folder, PlayOnError> {
        api.get_search_results(&self.url, term)
    }
}

/// A playable catalog video. Detail fields are loaded on first access.
#[derive(Debug, Clone)]
pub struct Video {
    name: String,
    url: String,
    details: OnceCell<VideoDetails>,
}

impl Video {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            details: OnceCell::new(),
        }
    }

    /// A video whose details are already known; no detail fetch will happen.
    pub fn with_details(
        name: impl Into<String>,
        url: impl Into<String>,
        details: VideoDetails,
    ) -> Self {
        let video = Self::new(name, url);
        let _ = video.details.set(details);
        video
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Details if they have been loaded already.
    pub fn loaded_details(&self) -> Option<&VideoDetails> {
        self.details.get()
    }

    /// Detail fields of this video, fetched at most once.
    pub fn details(&self, api: &dyn PlayOnApi) -> Result<&VideoDetails, PlayOnError> {
        if let Some(details) = self.details.get() {
            return Ok(details);
        }
        let fetched = api.load_video_details(&self.url)?;
        Ok(self.details.get_or_init(|| fetched))
    }

    pub fn runtime(&self, api: &dyn PlayOnApi) -> Result<Duration, PlayOnError> {
        Ok(self.details(api)?.runtime())
    }
}

/// Detail fields of a video as reported by the PlayOn server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoDetails {
    pub series: String,
    pub media_title: String,
    pub run_time: String,
    pub description: String,
    pub air_date: String,
    pub art_url_large: String,
    pub media_url: String,
    pub play_later_name: String,
    pub play_later_url: String,
}

impl VideoDetails {
    pub fn new(
        series: impl Into<String>,
        media_title: impl Into<String>,
        run_time: impl Into<String>,
    ) -> Self {
        Self {
            series: series.into(),
            media_title: media_title.into(),
            run_time: run_time.into(),
            ..Default::default()
        }
    }

    /// Parsed runtime, or [`UNKNOWN_RUNTIME`] when the text is not a time span.
    pub fn runtime(&self) -> Duration {
        parse_time_span(&self.run_time).unwrap_or(UNKNOWN_RUNTIME)
    }

    /// Stable identity used by queue lists: `"{series} - {title}"` with
    /// filename-unsafe characters replaced and leading spaces/dashes trimmed.
    pub fn queue_key(&self) -> String {
        let raw = format!("{} - {}", self.series, self.media_title);
        UNSAFE_KEY_CHARS
            .replace_all(&raw, "_")
            .trim_start_matches([' ', '-'])
            .to_string()
    }
}
