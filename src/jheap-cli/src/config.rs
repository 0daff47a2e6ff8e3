//! Configuration management for the jheap CLI

use crate::cli::ScanArgs;
use anyhow::{Context, Result};
use jheap::TreeScan;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub target_class: Option<String>,
    pub parent_fields: Option<Vec<String>>,
    pub id_field: Option<String>,
    pub label_path: Option<String>,
    pub value_limit: Option<usize>,
    pub group_threshold: Option<u64>,
    pub cluster_threshold: Option<u64>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("jheap");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Build the scan configuration: command-line arguments override the
    /// config file, which overrides the built-in defaults
    pub fn tree_scan(&self, args: &ScanArgs) -> TreeScan {
        let mut scan = TreeScan::default();

        if let Some(target) = &self.target_class {
            scan.target_class = target.clone();
        }
        if let Some(fields) = &self.parent_fields {
            if !fields.is_empty() {
                scan.parent_fields = fields.clone();
            }
        }
        if let Some(id_field) = &self.id_field {
            scan.id_field = id_field.clone();
        }
        if let Some(label) = &self.label_path {
            scan.label_path = Some(label.clone());
        }

        if let Some(target) = &args.class {
            scan.target_class = target.clone();
        }
        if !args.parent_fields.is_empty() {
            scan.parent_fields = args.parent_fields.clone();
        }
        if let Some(id_field) = &args.id_field {
            scan.id_field = id_field.clone();
        }
        if let Some(label) = &args.label {
            scan.label_path = Some(label.clone());
        }

        scan
    }
}
