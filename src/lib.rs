// PlayPass - automatic queueing of PlayOn catalog videos into PlayLater
//
// This is the library crate containing the pass interpreter, the queue
// admission controller and their collaborators.
// The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod timespan;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use logging::{LogManager, LogSink, MemorySink, TracingSink};
pub use metrics::Metrics;
pub use models::{CatalogItem, Folder, PassAction, PassItem, PlayPassConfig, Video, VideoDetails};
pub use services::{PassProcessor, PlayOnApi, PlayOnClient, RunMode};
pub use state::{QueueValidator, Rejection};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
