use std::cell::Cell;
use std::sync::{Arc, Mutex, PoisonError};

/// `tracing` target of pass log lines.
pub const PASS_LOG_TARGET: &str = "playpass::pass";

const INDENT: &str = "  ";

/// Destination for pass log lines.
pub trait LogSink {
    /// Verbose sinks also receive verbose lines and indent for verbose depth.
    fn is_verbose(&self) -> bool;

    fn write_line(&self, depth: usize, message: &str);

    fn write_error(&self, depth: usize, message: &str);
}

/// Fans pass log lines out to its sinks and tracks nesting depth.
///
/// Normal depth indents every sink. Verbose depth only indents verbose sinks,
/// so a quiet log stays flat where the verbose log shows folder nesting.
#[derive(Default)]
pub struct LogManager {
    sinks: Vec<Box<dyn LogSink>>,
    depth: Cell<usize>,
    verbose_depth: Cell<usize>,
}

impl LogManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn add_sink(&mut self, sink: impl LogSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn verbose_depth(&self) -> usize {
        self.verbose_depth.get()
    }

    fn depth_for(&self, sink: &dyn LogSink) -> usize {
        if sink.is_verbose() {
            self.depth.get() + self.verbose_depth.get()
        } else {
            self.depth.get()
        }
    }

    /// Increase the depth until the guard is dropped.
    pub fn next_depth(&self) -> DepthGuard<'_> {
        DepthGuard::enter(&self.depth)
    }

    /// Increase the verbose depth until the guard is dropped.
    pub fn next_verbose_depth(&self) -> DepthGuard<'_> {
        DepthGuard::enter(&self.verbose_depth)
    }

    pub fn log(&self, message: &str) {
        for sink in &self.sinks {
            sink.write_line(self.depth_for(sink.as_ref()), message);
        }
    }

    pub fn log_verbose(&self, message: &str) {
        for sink in self.sinks.iter().filter(|sink| sink.is_verbose()) {
            sink.write_line(self.depth_for(sink.as_ref()), message);
        }
    }

    /// Log an error with its full context chain.
    pub fn log_error(&self, error: &anyhow::Error) {
        let message = format!("The following exception has occurred: {:#}", error);
        for sink in &self.sinks {
            sink.write_error(self.depth_for(sink.as_ref()), &message);
        }
    }
}

/// Restores a depth counter on drop.
#[must_use = "the depth is restored as soon as the guard is dropped"]
pub struct DepthGuard<'a> {
    counter: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self { counter }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.counter.set(self.counter.get().saturating_sub(1));
    }
}

fn indented(depth: usize, message: &str) -> String {
    format!("{}{}", INDENT.repeat(depth), message)
}

/// Writes pass log lines as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    verbose: bool,
}

impl TracingSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl LogSink for TracingSink {
    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn write_line(&self, depth: usize, message: &str) {
        tracing::info!(target: PASS_LOG_TARGET, "{}", indented(depth, message));
    }

    fn write_error(&self, depth: usize, message: &str) {
        tracing::error!(target: PASS_LOG_TARGET, "{}", indented(depth, message));
    }
}

/// Keeps pass log lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    verbose: bool,
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            lines: Arc::default(),
        }
    }

    /// Captured lines, indentation included.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured lines without indentation.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| line.trim_start().to_string())
            .collect()
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn write_line(&self, depth: usize, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(indented(depth, message));
    }

    fn write_error(&self, depth: usize, message: &str) {
        self.write_line(depth, message);
    }
}
