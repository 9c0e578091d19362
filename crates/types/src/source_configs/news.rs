//! News headline provider configuration types.

use super::{default_refresh_budget, ContentSourceConfig};
use crate::color::Rgb;
use serde::{Deserialize, Serialize};

fn default_update_interval() -> u64 {
    300_000
}

fn default_max_headlines() -> usize {
    5
}

fn default_font() -> String {
    "5x8".to_string()
}

fn default_color() -> Rgb {
    Rgb::WHITE
}

/// News headline provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsProviderConfig {
    /// Headline titles, newest first
    #[serde(default)]
    pub source: ContentSourceConfig<Vec<String>>,
    #[serde(default = "default_max_headlines")]
    pub max_headlines: usize,
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    #[serde(default = "default_refresh_budget")]
    pub refresh_budget_ms: u64,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_color")]
    pub color: Rgb,
}

impl Default for NewsProviderConfig {
    fn default() -> Self {
        Self {
            source: ContentSourceConfig::default(),
            max_headlines: default_max_headlines(),
            update_interval_ms: default_update_interval(),
            refresh_budget_ms: default_refresh_budget(),
            font: default_font(),
            color: default_color(),
        }
    }
}
