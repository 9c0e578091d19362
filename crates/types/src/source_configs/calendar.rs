//! Calendar provider configuration types.

use super::{default_refresh_budget, ContentSourceConfig};
use crate::color::Rgb;
use crate::content::CalendarEvent;
use serde::{Deserialize, Serialize};

fn default_update_interval() -> u64 {
    300_000
}

fn default_max_events() -> usize {
    3
}

fn default_date_font() -> String {
    "5x8".to_string()
}

fn default_title_font() -> String {
    "5x7".to_string()
}

fn default_color() -> Rgb {
    Rgb::WHITE
}

/// Calendar provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarProviderConfig {
    /// Upcoming events, ordered by start
    #[serde(default)]
    pub source: ContentSourceConfig<Vec<CalendarEvent>>,
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    #[serde(default = "default_refresh_budget")]
    pub refresh_budget_ms: u64,
    #[serde(default = "default_date_font")]
    pub date_font: String,
    #[serde(default = "default_title_font")]
    pub title_font: String,
    #[serde(default = "default_color")]
    pub date_color: Rgb,
    #[serde(default = "default_color")]
    pub text_color: Rgb,
}

impl Default for CalendarProviderConfig {
    fn default() -> Self {
        Self {
            source: ContentSourceConfig::default(),
            max_events: default_max_events(),
            update_interval_ms: default_update_interval(),
            refresh_budget_ms: default_refresh_budget(),
            date_font: default_date_font(),
            title_font: default_title_font(),
            date_color: default_color(),
            text_color: default_color(),
        }
    }
}
