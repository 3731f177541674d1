//! Shared fixtures for integration tests.
//!
//! [`FakePlayOn`] serves a small fixed catalog and records every transport call:
//!
//! ```text
//! SERVER (/data/data.xml, pre-loaded)
//! ├── Random TV Network (rtv)
//! │   ├── Test Clip 1 (rtv-clip1, video)
//! │   └── My Things To Watch (rtv-queue)
//! │       ├── Test Video 1 (rtv-vid1)
//! │       └── Test Video 2 (rtv-vid2)
//! ├── Static TV Network (stv, searchable)
//! │   └── Static Clip 1 (stv-clip1)
//! └── Broken Network (broken, listing fails)
//! ```
//!
//! Searching "Video" in the static network returns stv-vid1 and stv-vid2;
//! any other term returns nothing.

#![allow(dead_code)]

use playpass::logging::{LogManager, MemorySink};
use playpass::models::{CatalogItem, Folder, PassAction, PassItem, Video, VideoDetails};
use playpass::services::{PlayOnApi, PlayOnError, QueueVideoResult};
use std::cell::RefCell;

pub const ROOT: &str = "/data/data.xml";
pub const RTV: &str = "/data/data.xml?id=rtv";
pub const RTV_QUEUE: &str = "/data/data.xml?id=rtv-queue";
pub const RTV_CLIP1: &str = "/data/data.xml?id=rtv-clip1";
pub const RTV_VID1: &str = "/data/data.xml?id=rtv-vid1";
pub const RTV_VID2: &str = "/data/data.xml?id=rtv-vid2";
pub const STV: &str = "/data/data.xml?id=stv";
pub const STV_CLIP1: &str = "/data/data.xml?id=stv-clip1";
pub const STV_VID1: &str = "/data/data.xml?id=stv-vid1";
pub const STV_VID2: &str = "/data/data.xml?id=stv-vid2";
pub const BROKEN: &str = "/data/data.xml?id=broken";

/// Every video in the fake catalog runs for this long.
pub const RUN_TIME: &str = "00:30:00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetCatalog,
    GetItems(String),
    GetSearchResults(String, String),
    LoadVideoDetails(String),
    QueueMedia(String),
}

pub struct FakePlayOn {
    calls: RefCell<Vec<Call>>,
    queue_result: QueueVideoResult,
    queue_error: Option<String>,
    catalog_error: bool,
}

impl FakePlayOn {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            queue_result: QueueVideoResult::Success,
            queue_error: None,
            catalog_error: false,
        }
    }

    pub fn with_queue_result(mut self, result: QueueVideoResult) -> Self {
        self.queue_result = result;
        self
    }

    /// Make every submission fail with a transport error carrying `message`.
    pub fn with_queue_error(mut self, message: &str) -> Self {
        self.queue_error = Some(message.to_string());
        self
    }

    pub fn with_catalog_error(mut self) -> Self {
        self.catalog_error = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Calls other than detail loads.
    pub fn navigation_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::LoadVideoDetails(_)))
            .collect()
    }

    /// URLs passed to `get_items`, in order.
    pub fn listed_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::GetItems(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// URLs passed to `queue_media`, in order.
    pub fn queued_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::QueueMedia(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    /// Details the fake serves for the video at `url`.
    pub fn details_for(url: &str) -> VideoDetails {
        let id = url.rsplit("id=").next().unwrap_or(url);
        VideoDetails {
            series: "Fake Series".to_string(),
            media_title: format!("Episode {}", id),
            run_time: RUN_TIME.to_string(),
            play_later_name: "PlayLater".to_string(),
            play_later_url: format!("/playlater/queue?id={}", id),
            ..Default::default()
        }
    }
}

impl Default for FakePlayOn {
    fn default() -> Self {
        Self::new()
    }
}

fn video(name: &str, url: &str) -> CatalogItem {
    Video::new(name, url).into()
}

fn folder(name: &str, url: &str) -> CatalogItem {
    Folder::new(name, url).into()
}

impl PlayOnApi for FakePlayOn {
    fn get_catalog(&self) -> Result<CatalogItem, PlayOnError> {
        self.record(Call::GetCatalog);
        if self.catalog_error {
            return Err(PlayOnError::Status(500, ROOT.to_string()));
        }
        Ok(Folder::with_children(
            "SERVER",
            ROOT,
            vec![
                folder("Random TV Network", RTV),
                Folder::new("Static TV Network", STV).searchable(true).into(),
                folder("Broken Network", BROKEN),
            ],
        )
        .into())
    }

    fn get_items(&self, url: &str) -> Result<Vec<CatalogItem>, PlayOnError> {
        self.record(Call::GetItems(url.to_string()));
        match url {
            RTV => Ok(vec![
                video("Test Clip 1", RTV_CLIP1),
                folder("My Things To Watch", RTV_QUEUE),
            ]),
            RTV_QUEUE => Ok(vec![
                video("Test Video 1", RTV_VID1),
                video("Test Video 2", RTV_VID2),
            ]),
            STV => Ok(vec![video("Static Clip 1", STV_CLIP1)]),
            _ => Err(PlayOnError::Status(404, url.to_string())),
        }
    }

    fn get_search_results(&self, url: &str, search_term: &str) -> Result<Folder, PlayOnError> {
        self.record(Call::GetSearchResults(
            url.to_string(),
            search_term.to_string(),
        ));
        let results = if url == STV && search_term == "Video" {
            vec![
                video("Static Video 1", STV_VID1),
                video("Static Video 2", STV_VID2),
            ]
        } else {
            Vec::new()
        };
        Ok(Folder::with_children(
            format!("Search results for \"{}\"", search_term),
            url,
            results,
        ))
    }

    fn load_video_details(&self, url: &str) -> Result<VideoDetails, PlayOnError> {
        self.record(Call::LoadVideoDetails(url.to_string()));
        Ok(Self::details_for(url))
    }

    fn queue_media(&self, video: &Video) -> Result<QueueVideoResult, PlayOnError> {
        self.record(Call::QueueMedia(video.url().to_string()));
        match &self.queue_error {
            Some(message) => Err(PlayOnError::InvalidResponse(quick_xml::DeError::Custom(
                message.clone(),
            ))),
            None => Ok(self.queue_result),
        }
    }
}

/// A verbose in-memory pass log.
pub fn memory_log() -> (LogManager, MemorySink) {
    let sink = MemorySink::new(true);
    (LogManager::new().with_sink(sink.clone()), sink)
}

/// `Random TV Network` → `My Things To Watch` → `queue`
pub fn watch_list_pass(queue: PassAction) -> PassItem {
    single_action_pass(
        PassAction::scan("Random TV Network")
            .with_action(PassAction::scan("My Things To Watch").with_action(queue)),
    )
}

pub fn single_action_pass(action: PassAction) -> PassItem {
    PassItem::new("Test Pass", true).with_action(action)
}

pub fn count_messages(sink: &MemorySink, message: &str) -> usize {
    sink.messages().iter().filter(|m| *m == message).count()
}
