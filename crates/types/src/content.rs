//! Content payloads handed to providers by their content sources.
//!
//! These are plain value objects. Each carries (or derives) an identity key
//! which providers compare to tell "same content, no redraw needed" from
//! "new content, force redraw".

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A generic piece of rotating content (e.g. an "of the day" fact)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContentItem {
    /// Source-defined identity key
    #[serde(default)]
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ContentItem {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            subtitle: None,
            description: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Subtitle, treating blank strings as absent
    pub fn subtitle_text(&self) -> Option<&str> {
        non_blank(self.subtitle.as_deref())
    }

    /// Description, treating blank strings as absent
    pub fn description_text(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Start of a calendar event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventStart {
    /// All-day event on a date
    AllDay(NaiveDate),
    /// Event starting at a specific time, in the calendar's own offset
    At(DateTime<FixedOffset>),
}

/// An already-authenticated, already-fetched calendar event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Calendar-assigned event id (identity key)
    pub id: String,
    #[serde(default = "default_summary")]
    pub summary: String,
    pub start: EventStart,
}

fn default_summary() -> String {
    "No Title".to_string()
}

/// Kind of instrument a quote belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuoteKind {
    #[default]
    Stock,
    Crypto,
}

/// Last known price for a stock or crypto symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    #[serde(deserialize_with = "uppercase")]
    pub symbol: String,
    #[serde(default)]
    pub kind: QuoteKind,
    /// None when the price could not be fetched
    #[serde(default)]
    pub price: Option<f64>,
}

fn uppercase<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|s| s.to_uppercase())
}

impl Quote {
    pub fn new(symbol: impl Into<String>, kind: QuoteKind, price: Option<f64>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            kind,
            price,
        }
    }

    /// Ticker segment, e.g. `AAPL:190.00` or `BTC:N/A`
    pub fn label(&self) -> String {
        match self.price {
            Some(price) => format!("{}:{:.2}", self.symbol, price),
            None => format!("{}:N/A", self.symbol),
        }
    }
}
