//! Application configuration

use anyhow::{bail, Result};
use led_ticker_core::{DEFAULT_MAX_SINK_FAILURES, DEFAULT_TICK_INTERVAL};
use led_ticker_render::{DEFAULT_SNAPSHOT_INTERVAL, DEFAULT_SNAPSHOT_PATH};
use led_ticker_types::{
    ClockProviderConfig, ContentSourceConfig, ProviderConfig, ProviderEntry, Quote, QuoteKind,
    TickerProviderConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_version() -> u32 {
    1
}

/// Application-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Extra BDF faces, name -> file
    #[serde(default)]
    pub fonts: BTreeMap<String, PathBuf>,
    /// Rotation, in display order
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "led-ticker", "led-ticker")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.display.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Providers that take part in the rotation
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderEntry> {
        self.providers.iter().filter(|p| p.enabled)
    }
}

impl Default for AppConfig {
    /// A clock and a sample ticker, enough to see the rotation work
    fn default() -> Self {
        let ticker = TickerProviderConfig {
            source: ContentSourceConfig::Static {
                value: vec![
                    Quote::new("AAPL", QuoteKind::Stock, Some(190.0)),
                    Quote::new("BTC", QuoteKind::Crypto, Some(65000.0)),
                ],
            },
            ..Default::default()
        };

        Self {
            version: default_version(),
            display: DisplayConfig::default(),
            fonts: BTreeMap::new(),
            providers: vec![
                ProviderEntry::new(ProviderConfig::Clock(ClockProviderConfig::default()), 15),
                ProviderEntry::new(ProviderConfig::Ticker(ticker), 15),
            ],
        }
    }
}

fn default_width() -> u32 {
    128
}

fn default_height() -> u32 {
    32
}

fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_max_sink_failures() -> u32 {
    DEFAULT_MAX_SINK_FAILURES
}

/// Matrix geometry and loop pacing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Consecutive rejected frames tolerated before giving up
    #[serde(default = "default_max_sink_failures")]
    pub max_sink_failures: u32,
    #[serde(default)]
    pub sink: SinkConfig,
}

impl DisplayConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Reject geometry and pacing the loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("display size {}x{} must be non-zero", self.width, self.height);
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be at least 1");
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            tick_interval_ms: default_tick_interval(),
            max_sink_failures: default_max_sink_failures(),
            sink: SinkConfig::default(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_PATH)
}

fn default_snapshot_interval() -> u64 {
    DEFAULT_SNAPSHOT_INTERVAL.as_millis() as u64
}

/// Where frames go when there is no matrix hardware
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    Console {
        #[serde(default)]
        ascii_art: bool,
    },
    Snapshot {
        #[serde(default = "default_snapshot_path")]
        path: PathBuf,
        #[serde(default = "default_snapshot_interval")]
        min_interval_ms: u64,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Console { ascii_art: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "display": { "width": 64, "sink": { "type": "snapshot" } },
            "providers": [ { "provider_type": "clock", "display_duration_secs": 5 } ]
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.display.width, 64);
        assert_eq!(config.display.height, 32);
        assert_eq!(config.display.tick_interval(), Duration::from_millis(250));
        assert_eq!(
            config.display.sink,
            SinkConfig::Snapshot {
                path: PathBuf::from("/tmp/led_matrix_preview.png"),
                min_interval_ms: 200
            }
        );
        assert_eq!(config.providers.len(), 1);
        assert!(config.providers[0].enabled);
        assert_eq!(config.providers[0].display_duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_disabled_providers_are_skipped() {
        let mut config = AppConfig::default();
        config.providers[0].enabled = false;
        let types: Vec<&str> = config
            .enabled_providers()
            .map(|p| p.config.provider_type())
            .collect();
        assert_eq!(types, ["ticker"]);
    }

    #[test]
    fn test_save_and_load_path() {
        let path =
            std::env::temp_dir().join(format!("led-ticker-config-{}.json", std::process::id()));
        let config = AppConfig::default();
        config.save_to_path(&path).unwrap();
        let loaded = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_zero_tick_interval_is_rejected() {
        let path =
            std::env::temp_dir().join(format!("led-ticker-zero-tick-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "display": { "tick_interval_ms": 0 } }"#).unwrap();
        let err = AppConfig::load_from_path(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.to_string().contains("tick_interval_ms"));

        let mut display = DisplayConfig::default();
        assert!(display.validate().is_ok());
        display.height = 0;
        assert!(display.validate().is_err());
    }
}
