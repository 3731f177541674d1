//! PlayOn catalog transport.
//!
//! The processor only ever talks to the server through [`PlayOnApi`]. The
//! production implementation is [`PlayOnClient`], a blocking HTTP client that
//! decodes the server's XML documents; tests substitute scripted fakes.

pub mod client;
mod xml;

pub use client::PlayOnClient;

use crate::models::{CatalogItem, Folder, Video, VideoDetails};
use thiserror::Error;

/// Relative URL of the catalog root.
pub const ROOT_URL: &str = "/data/data.xml";

/// Result of asking PlayLater to queue a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueVideoResult {
    Success,
    AlreadyInQueue,
    /// The video has no PlayLater queue link; PlayLater is probably not running.
    PlayLaterNotFound,
    /// The server answered but refused the request for another reason.
    Failed,
}

/// Errors raised by the catalog transport
#[derive(Error, Debug)]
pub enum PlayOnError {
    #[error("PlayOn server unavailable: {0}")]
    RemoteUnavailable(#[from] reqwest::Error),

    #[error("PlayOn server returned HTTP {0} for {1}")]
    Status(u16, String),

    #[error("Invalid PlayOn response: {0}")]
    InvalidResponse(#[from] quick_xml::DeError),

    #[error("Unhandled node type: {0}")]
    UnhandledNodeType(String),
}

/// Capabilities the processor needs from a PlayOn server.
#[cfg_attr(test, mockall::automock)]
pub trait PlayOnApi {
    /// Fetch the catalog root.
    fn get_catalog(&self) -> Result<CatalogItem, PlayOnError>;

    /// Fetch the children of the folder at `url`.
    fn get_items(&self, url: &str) -> Result<Vec<CatalogItem>, PlayOnError>;

    /// Search the folder at `url`; the returned folder holds only the results.
    fn get_search_results(&self, url: &str, search_term: &str) -> Result<Folder, PlayOnError>;

    /// Fetch the detail fields of the video at `url`.
    fn load_video_details(&self, url: &str) -> Result<VideoDetails, PlayOnError>;

    /// Ask PlayLater to record `video`. Details are loaded on demand.
    fn queue_media(&self, video: &Video) -> Result<QueueVideoResult, PlayOnError>;
}
