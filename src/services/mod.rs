//! Services module - the moving parts of a PlayPass run.
//!
//! # Components
//!
//! - [`PassProcessor`]: interprets passes against the catalog. It owns the
//!   traversal policy (matching, reversal, type-mismatch aborts, per-pass
//!   failure isolation) and decides each video's fate together with the
//!   [`QueueValidator`](crate::state::QueueValidator).
//! - [`playon`]: the catalog transport. [`PlayOnApi`] is the seam the processor
//!   depends on; [`PlayOnClient`] implements it over HTTP and XML.
//! - [`queue_list`]: stores that remember which videos were already handled.
//! - [`matcher`]: wildcard name patterns.
//!
//! Everything here is synchronous. Network calls block the calling thread and
//! the traversal is single-threaded.

pub mod matcher;
pub mod playon;
pub mod processor;
pub mod queue_list;

pub use matcher::matches_pattern;
pub use playon::{PlayOnApi, PlayOnClient, PlayOnError, QueueVideoResult};
pub use processor::{PassProcessor, RunMode};
pub use queue_list::{
    FileQueueList, MemoryQueueList, QueueList, QueueListError, build_queue_list,
};
