//! Clock provider configuration types.

use crate::color::Rgb;
use serde::{Deserialize, Serialize};

/// Time format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TimeFormat {
    #[serde(rename = "24h")]
    Hour24,
    #[serde(rename = "12h")]
    #[default]
    Hour12,
}

fn default_update_interval() -> u64 {
    1000
}

fn default_timezone() -> String {
    "Local".to_string()
}

fn default_font() -> String {
    "5x8".to_string()
}

fn default_time_color() -> Rgb {
    Rgb::WHITE
}

fn default_ampm_color() -> Rgb {
    Rgb::WARM_YELLOW
}

fn default_date_color() -> Rgb {
    Rgb::ORANGE
}

/// Clock provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClockProviderConfig {
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    #[serde(default)]
    pub time_format: TimeFormat,
    #[serde(default)]
    pub show_seconds: bool,
    /// Timezone ID (e.g., "America/New_York", "Europe/London", "Local")
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_time_color")]
    pub time_color: Rgb,
    #[serde(default = "default_ampm_color")]
    pub ampm_color: Rgb,
    #[serde(default = "default_date_color")]
    pub date_color: Rgb,
}

impl Default for ClockProviderConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval(),
            time_format: TimeFormat::Hour12,
            show_seconds: false,
            timezone: default_timezone(),
            font: default_font(),
            time_color: default_time_color(),
            ampm_color: default_ampm_color(),
            date_color: default_date_color(),
        }
    }
}
