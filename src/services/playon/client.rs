use super::xml::{self, GroupNode};
use super::{PlayOnApi, PlayOnError, QueueVideoResult, ROOT_URL};
use crate::models::config::{DEFAULT_HOST, DEFAULT_PORT, PlayOnSettings};
use crate::models::{CatalogItem, Folder, Video, VideoDetails};
use reqwest::blocking::Client;
use std::time::Duration;

/// Blocking HTTP client for a PlayOn server.
#[derive(Debug, Clone)]
pub struct PlayOnClient {
    host: String,
    port: u16,
    http: Client,
}

impl PlayOnClient {
    /// Create a client for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, PlayOnError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            host: host.into(),
            port,
            http,
        })
    }

    pub fn from_settings(settings: &PlayOnSettings) -> Result<Self, PlayOnError> {
        Self::new(settings.host.clone(), settings.port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Fully qualified URL for a relative PlayOn URL.
    pub fn full_url(&self, relative_url: &str) -> String {
        format!(
            "http://{}:{}/{}",
            self.host,
            self.port,
            relative_url.trim_start_matches('/')
        )
    }

    /// Relative URL for a search scoped to the folder at `url`.
    pub fn search_url(url: &str, search_term: &str) -> String {
        let criteria = format!("dc:description contains {}", search_term);
        format!("{}&searchterm={})", url, urlencoding::encode(&criteria))
    }

    fn request(&self, relative_url: &str) -> Result<String, PlayOnError> {
        let url = self.full_url(relative_url);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlayOnError::Status(status.as_u16(), url));
        }
        Ok(response.text()?)
    }

    fn request_group(&self, relative_url: &str) -> Result<GroupNode, PlayOnError> {
        let body = self.request(relative_url)?;
        xml::parse_group(&body)
    }
}

impl Default for PlayOnClient {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            http: Client::new(),
        }
    }
}

impl PlayOnApi for PlayOnClient {
    fn get_catalog(&self) -> Result<CatalogItem, PlayOnError> {
        let root = self.request_group(ROOT_URL)?;
        tracing::debug!(
            "Connected to PlayOn server {} (API {})",
            root.server.as_deref().unwrap_or("unknown"),
            root.api_version.as_deref().unwrap_or("unknown")
        );
        root.into_item()
    }

    fn get_items(&self, url: &str) -> Result<Vec<CatalogItem>, PlayOnError> {
        self.request_group(url)?.into_children()
    }

    fn get_search_results(&self, url: &str, search_term: &str) -> Result<Folder, PlayOnError> {
        let search_url = Self::search_url(url, search_term);
        let node = self.request_group(&search_url)?;
        let children = node.into_children()?;
        Ok(Folder::with_children(
            format!("Search results for \"{}\"", search_term),
            search_url,
            children,
        ))
    }

    fn load_video_details(&self, url: &str) -> Result<VideoDetails, PlayOnError> {
        Ok(self.request_group(url)?.into_details())
    }

    fn queue_media(&self, video: &Video) -> Result<QueueVideoResult, PlayOnError> {
        let details = video.details(self)?;
        if details.play_later_url.is_empty() {
            return Ok(QueueVideoResult::PlayLaterNotFound);
        }

        let body = self.request(&details.play_later_url)?;
        let response = xml::parse_queue_response(&body)?;
        if response.status.trim() == "true" {
            Ok(QueueVideoResult::Success)
        } else if response.msg.contains("already") {
            Ok(QueueVideoResult::AlreadyInQueue)
        } else {
            tracing::debug!("PlayLater refused {}: {}", video.url(), response.msg);
            Ok(QueueVideoResult::Failed)
        }
    }
}
