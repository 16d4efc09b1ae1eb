use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
}

/// General settings: hostname override for the records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Hostname stamped onto every record; the machine's own name when unset.
    #[serde(default)]
    pub hostname: Option<String>,
}

/// Collection settings: privilege escalation and command time bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Prefix command for the diagnostic tool; empty string runs it directly.
    #[serde(default = "default_sudo_command")]
    pub sudo_command: String,
    /// Bound on each external command's execution time.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

/// Telemetry-index endpoint and document indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_disk_index")]
    pub disk_index: String,
    #[serde(default = "default_system_index")]
    pub system_index: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

// --- Defaults ---

fn default_sudo_command() -> String {
    "sudo".into()
}

const fn default_command_timeout() -> u64 {
    30
}

fn default_endpoint() -> String {
    "http://localhost:9200".into()
}

fn default_disk_index() -> String {
    "diskhealth".into()
}

fn default_system_index() -> String {
    "cpuusage".into()
}

const fn default_http_timeout() -> u64 {
    5
}

// --- Default impls ---

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            sudo_command: default_sudo_command(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            disk_index: default_disk_index(),
            system_index: default_system_index(),
            timeout_secs: default_http_timeout(),
        }
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from default path or create default config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or the TOML content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_create(&path)
    }

    /// Load from a specific path, or create a default config file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or the default config file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML content is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("drivewatch").join("config.toml"))
    }
}
