// SPDX-License-Identifier: LGPL-3.0-only
use anyhow::Result;
use serde::Deserialize;
use smol::fs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xdg::BaseDirectories;

use crate::policy::{ExportPolicy, ImportPolicy};

/// The configuration file name looked up in every XDG location.
pub const CONFIG_FILE: &str = "config.toml";

/// The main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,
    /// Settings of the import engine
    #[serde(default)]
    pub import: ImportSettings,
    /// Settings of the export engine
    #[serde(default)]
    pub export: ExportSettings,
    /// Any other sections are captured here
    #[serde(flatten)]
    pub other: HashMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralSettings {
    pub debug: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportSettings {
    pub filter_placeholder_stubs: Option<bool>,
    pub provisional_enable: Option<bool>,
    pub preload_delay_ms: Option<u64>,
    pub coalesce_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportSettings {
    pub mnemonics: Option<bool>,
    pub action_namespace: Option<String>,
}

impl Config {
    fn defaults() -> Self {
        let import = ImportPolicy::default();
        let export = ExportPolicy::default();
        Self {
            general: GeneralSettings {
                debug: Some(false),
                log_level: None,
            },
            import: ImportSettings {
                filter_placeholder_stubs: Some(import.filter_placeholder_stubs),
                provisional_enable: Some(import.provisional_enable),
                preload_delay_ms: Some(import.preload_delay.as_millis() as u64),
                coalesce_delay_ms: Some(import.coalesce_delay.as_millis() as u64),
            },
            export: ExportSettings {
                mnemonics: Some(export.mnemonics),
                action_namespace: Some(export.action_namespace),
            },
            other: HashMap::new(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Registry for managing settings.
pub struct SettingsRegistry {
    config: Config,
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self {
            config: Config::defaults(),
        }
    }
}

impl SettingsRegistry {
    /// Create a new SettingsRegistry and load configuration from standard locations.
    pub async fn new() -> Result<Self> {
        let mut registry = Self::default();
        registry.load().await?;
        Ok(registry)
    }

    /// Load configuration from standard locations in precedence order.
    ///
    /// Order (later overrides earlier):
    /// 1. System Data: /usr/share/appmenu-0/config.toml (and XDG_DATA_DIRS)
    /// 2. System Config: /etc/appmenu-0/config.toml (and XDG_CONFIG_DIRS)
    /// 3. User Config: ~/.config/appmenu-0/config.toml (XDG_CONFIG_HOME)
    pub async fn load(&mut self) -> Result<()> {
        let xdg_dirs = BaseDirectories::with_prefix("appmenu-0")?;

        // 1. System data directories
        let mut paths: Vec<PathBuf> = xdg_dirs.find_data_files(CONFIG_FILE).rev().collect();

        // 2. System config directories, ending with the user config home
        paths.extend(xdg_dirs.find_config_files(CONFIG_FILE).rev());

        // 3. User config directory
        let user_config_path = xdg_dirs.get_config_home().join(CONFIG_FILE);
        if user_config_path.exists() {
            paths.push(user_config_path);
        }

        for path in layered(paths) {
            self.load_file(&path).await;
        }

        Ok(())
    }

    async fn load_file(&mut self, path: &Path) {
        log::info!("Loading config from: {:?}", path);
        match fs::read_to_string(path).await {
            Ok(content) => match Config::from_toml(&content) {
                Ok(loaded_config) => {
                    self.merge(loaded_config);
                },
                Err(e) => {
                    log::error!("Failed to parse config file {:?}: {}", path, e);
                },
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
            },
        }
    }

    /// Merge a loaded config into the current config.
    pub fn merge(&mut self, other: Config) {
        // General
        if let Some(debug) = other.general.debug {
            self.config.general.debug = Some(debug);
        }
        if other.general.log_level.is_some() {
            self.config.general.log_level = other.general.log_level;
        }

        // Import
        let import = &mut self.config.import;
        if let Some(filter) = other.import.filter_placeholder_stubs {
            import.filter_placeholder_stubs = Some(filter);
        }
        if let Some(provisional) = other.import.provisional_enable {
            import.provisional_enable = Some(provisional);
        }
        if let Some(delay) = other.import.preload_delay_ms {
            import.preload_delay_ms = Some(delay);
        }
        if let Some(delay) = other.import.coalesce_delay_ms {
            import.coalesce_delay_ms = Some(delay);
        }

        // Export
        if let Some(mnemonics) = other.export.mnemonics {
            self.config.export.mnemonics = Some(mnemonics);
        }
        if other.export.action_namespace.is_some() {
            self.config.export.action_namespace = other.export.action_namespace;
        }

        // Other
        self.config.other.extend(other.other);
    }

    /// Get the current configuration.
    pub fn get(&self) -> &Config {
        &self.config
    }

    /// Resolve the import engine behaviour from the merged configuration.
    pub fn import_policy(&self) -> ImportPolicy {
        let defaults = ImportPolicy::default();
        let import = &self.config.import;
        ImportPolicy {
            filter_placeholder_stubs: import
                .filter_placeholder_stubs
                .unwrap_or(defaults.filter_placeholder_stubs),
            provisional_enable: import.provisional_enable.unwrap_or(defaults.provisional_enable),
            preload_delay: import
                .preload_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.preload_delay),
            coalesce_delay: import
                .coalesce_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.coalesce_delay),
        }
    }

    /// Resolve the export engine behaviour from the merged configuration.
    pub fn export_policy(&self) -> ExportPolicy {
        let defaults = ExportPolicy::default();
        let export = &self.config.export;
        ExportPolicy {
            mnemonics: export.mnemonics.unwrap_or(defaults.mnemonics),
            action_namespace: export
                .action_namespace
                .clone()
                .unwrap_or(defaults.action_namespace),
        }
    }

    /// Load configuration from multiple custom paths asynchronously.
    pub async fn load_from_paths_async(&mut self, paths: Vec<std::path::PathBuf>) -> Vec<anyhow::Result<()>> {
        let mut results = Vec::new();

        for path in paths {
            let result = async {
                let content = smol::fs::read_to_string(&path)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;

                let loaded_config = Config::from_toml(&content)
                    .map_err(|e| anyhow::anyhow!("Failed to parse config file {:?}: {}", path, e))?;

                self.merge(loaded_config);
                Ok(())
            }
            .await;

            results.push(result);
        }

        results
    }

    /// Reload configuration asynchronously (re-runs the full load process).
    pub async fn reload_async(&mut self) -> anyhow::Result<()> {
        *self = Self::default();
        self.load().await
    }
}

/// Keep each path once, at its last position in load order.
fn layered(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut ordered: Vec<PathBuf> = Vec::with_capacity(paths.len());
    for path in paths {
        ordered.retain(|seen| *seen != path);
        ordered.push(path);
    }
    ordered
}
