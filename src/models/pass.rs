//! Runnable passes and the action tree they walk.

use std::time::Duration;

/// A top-level rule: an ordered list of actions run against the catalog root.
#[derive(Debug, Clone, PartialEq)]
pub struct PassItem {
    pub description: String,
    pub enabled: bool,
    pub actions: Vec<PassAction>,
}

impl PassItem {
    pub fn new(description: impl Into<String>, enabled: bool) -> Self {
        Self {
            description: description.into(),
            enabled,
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: PassAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// One node of a pass's rule tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PassAction {
    /// Name pattern (or search term for [`ActionKind::Search`]).
    pub name: String,
    /// Exclusion pattern; empty excludes nothing.
    pub exclude: String,
    /// Visit matches in reverse listing order.
    pub reverse: bool,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Enter every matching sub-folder and run the nested actions there.
    Scan { actions: Vec<PassAction> },
    /// Search the current folder and run the nested actions on the results.
    Search { actions: Vec<PassAction> },
    /// Queue every matching video. Zero limits mean "no temporary limit".
    Queue {
        count_limit: u32,
        duration_limit: Duration,
    },
}

impl PassAction {
    pub fn scan(name: impl Into<String>) -> Self {
        Self::with_kind(name, ActionKind::Scan { actions: Vec::new() })
    }

    pub fn search(name: impl Into<String>) -> Self {
        Self::with_kind(name, ActionKind::Search { actions: Vec::new() })
    }

    pub fn queue(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            ActionKind::Queue {
                count_limit: 0,
                duration_limit: Duration::ZERO,
            },
        )
    }

    fn with_kind(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            exclude: String::new(),
            reverse: false,
            kind,
        }
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = pattern.into();
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Append a nested action. Queue actions are leaves, so this is a no-op for them.
    pub fn with_action(mut self, action: PassAction) -> Self {
        match &mut self.kind {
            ActionKind::Scan { actions } | ActionKind::Search { actions } => actions.push(action),
            ActionKind::Queue { .. } => {}
        }
        self
    }

    /// Set temporary queue limits. Ignored for scan and search actions.
    pub fn limits(mut self, count: u32, duration: Duration) -> Self {
        if let ActionKind::Queue {
            count_limit,
            duration_limit,
        } = &mut self.kind
        {
            *count_limit = count;
            *duration_limit = duration;
        }
        self
    }

    /// Nested actions; always empty for queue actions.
    pub fn actions(&self) -> &[PassAction] {
        match &self.kind {
            ActionKind::Scan { actions } | ActionKind::Search { actions } => actions,
            ActionKind::Queue { .. } => &[],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ActionKind::Scan { .. } => "scan",
            ActionKind::Search { .. } => "search",
            ActionKind::Queue { .. } => "queue",
        }
    }
}
