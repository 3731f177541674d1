use crate::models::{
    ActionConfig, ActionSettings, LimitSettings, PassConfig, PlayPassConfig, QueueListConfig,
    QueueListProvider, Settings,
};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::time::Duration;

/// Default rule file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "PlayPass.yaml";

/// Configuration manager for loading and saving the YAML rule file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for the rule file at `config_path`.
    ///
    /// The file does not need to exist yet.
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Path of the rule file.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    pub fn exists(&self) -> bool {
        self.config_path.is_file()
    }

    /// Load and parse the rule file.
    ///
    /// Unlike a missing settings file, a missing rule file is an error: there
    /// is nothing to run without passes.
    pub fn load_config(&self) -> Result<PlayPassConfig> {
        if !self.exists() {
            bail!("Config file not found: {}", self.config_path);
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: PlayPassConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!(
            "Loaded config from {} ({} passes)",
            self.config_path,
            config.passes.len()
        );
        Ok(config)
    }

    /// Save the rule file, creating its parent directory if needed.
    pub fn save_config(&self, config: &PlayPassConfig) -> Result<()> {
        let parent = self
            .config_path
            .parent()
            .filter(|parent| !parent.as_str().is_empty());
        if let Some(parent) = parent {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {}", parent))?;
            }
        }

        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Write the starter rule file. Refuses to overwrite an existing file.
    pub fn init_config(&self) -> Result<PlayPassConfig> {
        if self.config_path.exists() {
            bail!("Config file already exists: {}", self.config_path);
        }
        let config = Self::default_config();
        self.save_config(&config)?;
        Ok(config)
    }

    /// Starter rule file: one pass that previews the two newest videos of a
    /// watch list, backed by an in-memory queue list.
    pub fn default_config() -> PlayPassConfig {
        let queue = ActionConfig::Queue(ActionSettings {
            name: "*".to_string(),
            reverse: true,
            limit_count: 2,
            ..Default::default()
        });
        let watch_list = ActionConfig::Scan(ActionSettings {
            name: "My Things To Watch".to_string(),
            actions: vec![queue],
            ..Default::default()
        });
        let network = ActionConfig::Scan(ActionSettings {
            name: "Random TV Network".to_string(),
            actions: vec![watch_list],
            ..Default::default()
        });

        PlayPassConfig {
            settings: Settings {
                limits: LimitSettings {
                    queue_count: 10,
                    queue_duration: Duration::from_secs(8 * 60 * 60),
                },
                queue_list: QueueListConfig {
                    provider: QueueListProvider::Memory,
                    data_source: None,
                },
                ..Default::default()
            },
            passes: vec![PassConfig {
                description: "Watch list".to_string(),
                enabled: true,
                actions: vec![network],
            }],
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}
