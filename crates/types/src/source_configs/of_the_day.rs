//! "Of the day" provider configuration types.

use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

/// One category (e.g. "word of the day") and its data file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfTheDayCategory {
    pub name: String,
    /// JSON object keyed by day of year ("1".."366"); relative paths are
    /// resolved against `data_dir`
    pub data_file: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_update_interval() -> u64 {
    3600
}

fn default_subtitle_rotate_interval() -> u64 {
    10
}

fn default_display_rotate_interval() -> u64 {
    30
}

fn default_advance_guard() -> u64 {
    5
}

fn default_title_font() -> String {
    "5x8".to_string()
}

fn default_body_font() -> String {
    "4x6".to_string()
}

fn default_title_color() -> Rgb {
    Rgb::WHITE
}

fn default_body_color() -> Rgb {
    Rgb::LIGHT_GRAY
}

/// "Of the day" provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfTheDayProviderConfig {
    /// Categories in display order
    #[serde(default)]
    pub categories: Vec<OfTheDayCategory>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// How often the data files are re-read (seconds)
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
    /// Subtitle/description alternation period (seconds)
    #[serde(default = "default_subtitle_rotate_interval")]
    pub subtitle_rotate_interval_secs: u64,
    /// Category rotation period (seconds)
    #[serde(default = "default_display_rotate_interval")]
    pub display_rotate_interval_secs: u64,
    /// External advances are ignored when the next category rotation is
    /// due within this many seconds
    #[serde(default = "default_advance_guard")]
    pub advance_guard_secs: u64,
    #[serde(default = "default_title_font")]
    pub title_font: String,
    #[serde(default = "default_body_font")]
    pub body_font: String,
    #[serde(default = "default_title_color")]
    pub title_color: Rgb,
    #[serde(default = "default_body_color")]
    pub body_color: Rgb,
}

impl Default for OfTheDayProviderConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            data_dir: None,
            update_interval_secs: default_update_interval(),
            subtitle_rotate_interval_secs: default_subtitle_rotate_interval(),
            display_rotate_interval_secs: default_display_rotate_interval(),
            advance_guard_secs: default_advance_guard(),
            title_font: default_title_font(),
            body_font: default_body_font(),
            title_color: default_title_color(),
            body_color: default_body_color(),
        }
    }
}
