//! Queue lists remember which videos were already queued or skipped so later
//! runs leave them alone.

use crate::models::{QueueListConfig, QueueListProvider, VideoDetails};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::fs;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Suffix of the marker files written by [`FileQueueList`]
pub const SKIP_FILE_EXTENSION: &str = ".playpass.skip";

#[derive(Error, Debug)]
pub enum QueueListError {
    #[error("Queue List data source is not specified")]
    MissingDataSource,

    #[error("Queue List data path does not exist: {0}")]
    DataPathNotFound(Utf8PathBuf),

    #[error("Failed to record {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Membership store for already handled media.
#[cfg_attr(test, mockall::automock)]
pub trait QueueList: Send + Sync {
    /// Whether the media was already recorded.
    fn media_in_list(&self, media: &VideoDetails) -> bool;

    /// Record the media. Recording twice is a no-op.
    fn add_media_to_list(&self, media: &VideoDetails) -> Result<(), QueueListError>;
}

/// Keeps one empty marker file per handled video in a directory.
#[derive(Debug, Clone)]
pub struct FileQueueList {
    skip_file_path: Utf8PathBuf,
}

impl FileQueueList {
    pub fn new<P: AsRef<Utf8Path>>(skip_file_path: P) -> Result<Self, QueueListError> {
        let skip_file_path = skip_file_path.as_ref().to_path_buf();
        if !skip_file_path.is_dir() {
            return Err(QueueListError::DataPathNotFound(skip_file_path));
        }
        Ok(Self { skip_file_path })
    }

    pub fn data_path(&self) -> &Utf8Path {
        &self.skip_file_path
    }

    /// Marker file for a media item.
    pub fn skip_file_name(&self, media: &VideoDetails) -> Utf8PathBuf {
        self.skip_file_path
            .join(format!("{}{}", media.queue_key(), SKIP_FILE_EXTENSION))
    }
}

impl QueueList for FileQueueList {
    fn media_in_list(&self, media: &VideoDetails) -> bool {
        self.skip_file_name(media).exists()
    }

    fn add_media_to_list(&self, media: &VideoDetails) -> Result<(), QueueListError> {
        if self.media_in_list(media) {
            return Ok(());
        }
        let path = self.skip_file_name(media);
        fs::File::create(&path).map_err(|source| QueueListError::Io {
            key: media.queue_key(),
            source,
        })?;
        tracing::debug!("Created skip file {}", path);
        Ok(())
    }
}

/// Keeps handled videos in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryQueueList {
    keys: RwLock<IndexSet<String>>,
}

impl MemoryQueueList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl QueueList for MemoryQueueList {
    fn media_in_list(&self, media: &VideoDetails) -> bool {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&media.queue_key())
    }

    fn add_media_to_list(&self, media: &VideoDetails) -> Result<(), QueueListError> {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(media.queue_key());
        Ok(())
    }
}

/// Build the queue list named by the configuration.
pub fn build_queue_list(config: &QueueListConfig) -> Result<Box<dyn QueueList>, QueueListError> {
    match config.provider {
        QueueListProvider::File => {
            let path = config
                .data_source
                .as_ref()
                .ok_or(QueueListError::MissingDataSource)?;
            tracing::info!("Using file queue list at {}", path);
            Ok(Box::new(FileQueueList::new(path)?))
        }
        QueueListProvider::Memory => {
            tracing::info!("Using in-memory queue list");
            Ok(Box::new(MemoryQueueList::new()))
        }
    }
}
