//! Ticker provider configuration types.

use super::{default_refresh_budget, ContentSourceConfig};
use crate::color::Rgb;
use crate::content::Quote;
use serde::{Deserialize, Serialize};

fn default_update_interval() -> u64 {
    60_000
}

fn default_font() -> String {
    "6x10".to_string()
}

fn default_color() -> Rgb {
    Rgb::WHITE
}

/// Stock/crypto ticker provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerProviderConfig {
    #[serde(default)]
    pub source: ContentSourceConfig<Vec<Quote>>,
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    /// Upper bound for a single background fetch
    #[serde(default = "default_refresh_budget")]
    pub refresh_budget_ms: u64,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_color")]
    pub color: Rgb,
}

impl Default for TickerProviderConfig {
    fn default() -> Self {
        Self {
            source: ContentSourceConfig::default(),
            update_interval_ms: default_update_interval(),
            refresh_budget_ms: default_refresh_budget(),
            font: default_font(),
            color: default_color(),
        }
    }
}
