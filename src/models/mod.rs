//! Data models for PlayPass.
//!
//! - [`PassItem`] / [`PassAction`]: the rule tree a run executes
//! - [`CatalogItem`]: the remote PlayOn catalog, a tree of [`Folder`]s and [`Video`]s
//!   whose children and details are fetched lazily and cached
//! - [`PlayPassConfig`]: the YAML rule file, converted into passes with
//!   [`PlayPassConfig::passes`]

pub mod catalog;
pub mod config;
pub mod pass;

pub use catalog::{CatalogItem, Folder, UNKNOWN_RUNTIME, Video, VideoDetails};
pub use config::{
    ActionConfig, ActionSettings, LimitSettings, LoggingSettings, PassConfig, PlayOnSettings,
    PlayPassConfig, QueueListConfig, QueueListProvider, Settings,
};
pub use pass::{ActionKind, PassAction, PassItem};
