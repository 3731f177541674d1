//! The pass interpreter.
//!
//! Walks each pass's action tree depth-first against the lazily fetched
//! catalog. Scan actions descend into matching folders, search actions run a
//! remote search and continue on the results, queue actions hand matching
//! videos to the admission controller and, in queue mode, to PlayLater.
//!
//! Failures are contained at two levels. A failed submission is logged as a
//! skipped video and the walk continues. Any other error aborts the current
//! pass only; it is written to the pass log and the next pass runs.

use crate::logging::LogManager;
use crate::metrics::Metrics;
use crate::models::{ActionKind, Folder, PassAction, PassItem, Video, VideoDetails};
use crate::services::matcher::matches_pattern;
use crate::services::playon::{PlayOnApi, QueueVideoResult};
use crate::state::QueueValidator;
use anyhow::{Context, Result};
use std::fmt;

/// Run-wide switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Submit videos to PlayLater. Without it the run is a preview.
    pub queue: bool,
    /// Record every matched video as handled without submitting it.
    pub skip: bool,
}

/// Final decision for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Queued(String),
    Skipped(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, message) = match self {
            Outcome::Queued(message) => ("Queued", message),
            Outcome::Skipped(message) => ("Skipped", message),
        };
        if message.is_empty() {
            write!(f, "{}", label)
        } else {
            write!(f, "{}: {}", label, message)
        }
    }
}

/// Executes passes against a PlayOn catalog.
pub struct PassProcessor<'a> {
    api: &'a dyn PlayOnApi,
    log: &'a LogManager,
    validator: &'a QueueValidator,
    mode: RunMode,
    metrics: Metrics,
}

impl<'a> PassProcessor<'a> {
    pub fn new(api: &'a dyn PlayOnApi, log: &'a LogManager, validator: &'a QueueValidator) -> Self {
        Self {
            api,
            log,
            validator,
            mode: RunMode::default(),
            metrics: Metrics::new(),
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Process every pass in order. A failing pass never stops the ones after it.
    pub fn run_passes(&self, passes: &[PassItem]) {
        for pass in passes {
            self.process_pass(pass);
        }
    }

    /// Process a single pass, logging (not returning) any error it raises.
    pub fn process_pass(&self, pass: &PassItem) {
        if !pass.enabled {
            self.log
                .log(&format!("Skipping pass \"{}\".", pass.description));
            self.metrics.record_pass_skipped();
            return;
        }

        self.log
            .log(&format!("Processing pass \"{}\"...", pass.description));
        match self.process_root(pass) {
            Ok(()) => self.metrics.record_pass_processed(),
            Err(e) => {
                tracing::debug!("Pass \"{}\" failed: {:?}", pass.description, e);
                self.log.log_error(&e);
                self.metrics.record_pass_failed();
            }
        }
        self.log
            .log(&format!("Finished processing pass \"{}\"...", pass.description));
    }

    fn process_root(&self, pass: &PassItem) -> Result<()> {
        let root = self
            .api
            .get_catalog()
            .context("Failed to load the catalog")?;
        match root.as_folder() {
            Some(folder) => self.process_actions(folder, &pass.actions),
            None => Ok(()),
        }
    }

    fn process_actions(&self, folder: &Folder, actions: &[PassAction]) -> Result<()> {
        for action in actions {
            let _verbose = self.log.next_verbose_depth();
            match action.kind {
                ActionKind::Search { .. } => self.process_search_action(folder, action)?,
                ActionKind::Scan { .. } => self.process_match_action(folder, action)?,
                ActionKind::Queue {
                    count_limit,
                    duration_limit,
                } => {
                    let _limits = self
                        .validator
                        .enter_temporary_limits(count_limit, duration_limit);
                    self.process_match_action(folder, action)?;
                }
            }
        }
        Ok(())
    }

    /// Scan or queue the children of `folder` that match the action's pattern.
    fn process_match_action(&self, folder: &Folder, action: &PassAction) -> Result<()> {
        self.log.log(&format!("Matching \"{}\"...", action.name));
        let _depth = self.log.next_depth();

        let children = folder
            .children(self.api)
            .with_context(|| format!("Failed to list \"{}\"", folder.name()))?;

        let mut matched = Vec::new();
        for child in children {
            self.log
                .log_verbose(&format!("Checking \"{}\"...", child.name()));
            if !matches_pattern(child.name(), &action.name) {
                continue;
            }
            if matches_pattern(child.name(), &action.exclude) {
                self.log.log_verbose("Excluded match.");
                continue;
            }
            matched.push(child);
        }

        if matched.is_empty() {
            self.log
                .log(&format!("No matches for \"{}\".", action.name));
            return Ok(());
        }
        if action.reverse {
            matched.reverse();
        }

        let queue = matches!(action.kind, ActionKind::Queue { .. });
        for item in matched {
            // A mismatched item type ends the whole action, not just this item.
            if queue {
                let Some(video) = item.as_video() else {
                    self.log
                        .log_verbose(&format!("\"{}\" is not a video.", item.name()));
                    break;
                };
                self.log.log(&format!("Queuing \"{}\"...", video.name()));
                let _depth = self.log.next_depth();
                self.queue_media(video)?;
            } else {
                let Some(subfolder) = item.as_folder() else {
                    self.log
                        .log_verbose(&format!("\"{}\" is not a folder.", item.name()));
                    break;
                };
                let _verbose = self.log.next_verbose_depth();
                self.log
                    .log_verbose(&format!("Entering \"{}\"", subfolder.name()));
                self.process_actions(subfolder, action.actions())?;
                self.log
                    .log_verbose(&format!("Leaving \"{}\"", subfolder.name()));
            }
        }
        Ok(())
    }

    fn process_search_action(&self, folder: &Folder, action: &PassAction) -> Result<()> {
        if !folder.is_searchable() {
            self.log
                .log(&format!("\"{}\" is not searchable.", folder.name()));
            return Ok(());
        }

        self.log
            .log(&format!("Searching for \"{}\"...", action.name));
        let _depth = self.log.next_depth();

        let results = folder
            .search(self.api, &action.name)
            .with_context(|| format!("Failed to search \"{}\"", folder.name()))?;
        if results.children(self.api)?.is_empty() {
            self.log
                .log(&format!("No matches for \"{}\".", action.name));
            return Ok(());
        }
        self.process_actions(&results, action.actions())
    }

    /// Decide what happens to one matched video and log the outcome.
    fn queue_media(&self, video: &Video) -> Result<()> {
        let details = video
            .details(self.api)
            .with_context(|| format!("Failed to load details for \"{}\"", video.name()))?;

        let outcome = if self.mode.skip {
            self.validator.add_media_to_queue_list(details)?;
            self.metrics.record_video_skipped();
            Outcome::Skipped("Manually skipped.".to_string())
        } else if let Err(rejection) = self.validator.can_queue_media(details) {
            self.metrics.record_video_skipped();
            Outcome::Skipped(rejection.to_string())
        } else if !self.mode.queue {
            self.validator.add_media_to_counts(details);
            self.metrics.record_video_previewed();
            Outcome::Queued("Pending queue mode.".to_string())
        } else {
            self.submit(video, details)?
        };

        self.log.log(&outcome.to_string());
        Ok(())
    }

    /// Submit to PlayLater. Transport errors become a skipped outcome.
    fn submit(&self, video: &Video, details: &VideoDetails) -> Result<Outcome> {
        let outcome = match self.api.queue_media(video) {
            Ok(QueueVideoResult::Success) => {
                self.validator.add_media_to_queue_list(details)?;
                self.metrics.record_video_queued();
                Outcome::Queued(String::new())
            }
            Ok(QueueVideoResult::AlreadyInQueue) => {
                self.metrics.record_video_skipped();
                Outcome::Skipped("Already queued.".to_string())
            }
            Ok(QueueVideoResult::PlayLaterNotFound) => {
                self.metrics.record_queue_failure();
                Outcome::Skipped(
                    "PlayLater queue link not found. PlayLater may not be running.".to_string(),
                )
            }
            Ok(QueueVideoResult::Failed) => {
                self.metrics.record_queue_failure();
                Outcome::Skipped("Queue request was rejected.".to_string())
            }
            Err(e) => {
                tracing::warn!("Failed to queue {}: {}", video.url(), e);
                self.metrics.record_queue_failure();
                Outcome::Skipped(e.to_string())
            }
        };
        Ok(outcome)
    }
}
