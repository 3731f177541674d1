//! Rule file schema: server and limit settings plus the pass definitions.

use crate::models::pass::{ActionKind, PassAction, PassItem};
use crate::timespan::serde_time_span;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default PlayOn server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default PlayOn server port
pub const DEFAULT_PORT: u16 = 54479;

/// Rule file contents (`PlayPass.yaml`).
///
/// Holds the server, limit, queue list and logging settings plus the list of passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayPassConfig {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub passes: Vec<PassConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub playon: PlayOnSettings,

    #[serde(default)]
    pub limits: LimitSettings,

    #[serde(default)]
    pub queue_list: QueueListConfig,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayOnSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for PlayOnSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Run-wide queue limits. Zero means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitSettings {
    #[serde(default)]
    pub queue_count: u32,

    #[serde(default, with = "serde_time_span")]
    pub queue_duration: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueListProvider {
    #[default]
    File,
    Memory,
}

/// Which queue list implementation to build, and where it keeps its data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueListConfig {
    #[serde(default)]
    pub provider: QueueListProvider,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    #[serde(default = "default_true")]
    pub console: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            console: true,
            debug: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassConfig {
    #[serde(default)]
    pub description: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// An action entry, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionConfig {
    Scan(ActionSettings),
    Search(ActionSettings),
    Queue(ActionSettings),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSettings {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exclude: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit_count: u32,

    #[serde(
        default,
        with = "serde_time_span",
        skip_serializing_if = "Duration::is_zero"
    )]
    pub limit_duration: Duration,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionConfig>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "playpass".to_string()
}

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl From<&ActionConfig> for PassAction {
    fn from(config: &ActionConfig) -> Self {
        let (settings, kind) = match config {
            ActionConfig::Scan(s) => (
                s,
                ActionKind::Scan {
                    actions: s.actions.iter().map(PassAction::from).collect(),
                },
            ),
            ActionConfig::Search(s) => (
                s,
                ActionKind::Search {
                    actions: s.actions.iter().map(PassAction::from).collect(),
                },
            ),
            // Queue actions are leaves; nested entries are dropped.
            ActionConfig::Queue(s) => (
                s,
                ActionKind::Queue {
                    count_limit: s.limit_count,
                    duration_limit: s.limit_duration,
                },
            ),
        };

        PassAction {
            name: settings.name.clone(),
            exclude: settings.exclude.clone(),
            reverse: settings.reverse,
            kind,
        }
    }
}

impl From<&PassConfig> for PassItem {
    fn from(config: &PassConfig) -> Self {
        PassItem {
            description: config.description.clone(),
            enabled: config.enabled,
            actions: config.actions.iter().map(PassAction::from).collect(),
        }
    }
}

impl PlayPassConfig {
    /// Build the runnable passes from the rule file entries.
    pub fn passes(&self) -> Vec<PassItem> {
        self.passes.iter().map(PassItem::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.playon.host, "localhost");
        assert_eq!(settings.playon.port, 54479);
        assert_eq!(settings.limits.queue_count, 0);
        assert_eq!(settings.limits.queue_duration, Duration::ZERO);
        assert_eq!(settings.queue_list.provider, QueueListProvider::File);
        assert!(settings.logging.console);
        assert!(!settings.logging.verbose);
    }

    #[test]
    fn test_parse_action_tree() {
        let yaml = r#"
passes:
  - description: Watch list
    actions:
      - type: scan
        name: Random TV Network
        reverse: true
        actions:
          - type: queue
            name: "*"
            exclude: "*Trailer*"
            limit_count: 2
            limit_duration: "01:30:00"
            actions:
              - type: scan
                name: ignored
"#;
        let config: PlayPassConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let passes = config.passes();

        assert_eq!(passes.len(), 1);
        assert!(passes[0].enabled);
        let scan = &passes[0].actions[0];
        assert_eq!(scan.name, "Random TV Network");
        assert!(scan.reverse);

        let queue = &scan.actions()[0];
        assert_eq!(queue.exclude, "*Trailer*");
        assert_eq!(
            queue.kind,
            ActionKind::Queue {
                count_limit: 2,
                duration_limit: Duration::from_secs(5400)
            }
        );
        assert!(queue.actions().is_empty());
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let yaml = r#"
settings:
  limits:
    queue_duration: "two hours"
"#;
        let result: Result<PlayPassConfig, _> = serde_yaml_ng::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_action_type_is_rejected() {
        let yaml = r#"
passes:
  - description: Bad
    actions:
      - type: record
        name: "*"
"#;
        let result: Result<PlayPassConfig, _> = serde_yaml_ng::from_str(yaml);
        assert!(result.is_err());
    }
}
