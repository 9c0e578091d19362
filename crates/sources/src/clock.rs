//! Clock provider
//!
//! Shows the time (12 h with AM/PM, or 24 h), the weekday and the date with
//! an ordinal suffix. The clock is always ready; it has no sub-rotation.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use chrono_tz::Tz;
use led_ticker_core::{ContentProvider, PaintedKey, ProviderMetadata, RotationState};
use led_ticker_render::{Canvas, FontBook, FontMetrics, RenderError, TextBlock, TextLayoutEngine};
use led_ticker_types::{ClockProviderConfig, TimeFormat};
use log::{debug, warn};
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Row positions (from the top, or from the bottom for weekday and date)
const TIME_Y: i32 = 4;
const WEEKDAY_FROM_BOTTOM: i32 = 18;
const DATE_FROM_BOTTOM: i32 = 9;
const AMPM_GAP: i32 = 4;

/// The strings a clock frame is made of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub time: String,
    pub ampm: Option<String>,
    pub weekday: String,
    pub date: String,
}

impl ClockFace {
    fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.time,
            self.ampm.as_deref().unwrap_or_default(),
            self.weekday,
            self.date
        )
    }
}

/// English ordinal suffix for a day of the month
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (10..=20).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Format a timestamp the way the clock shows it
pub fn format_clock<Z: TimeZone>(
    at: &DateTime<Z>,
    format: TimeFormat,
    show_seconds: bool,
) -> ClockFace
where
    Z::Offset: Display,
{
    let (time, ampm) = match format {
        TimeFormat::Hour12 => {
            let pattern = if show_seconds { "%I:%M:%S" } else { "%I:%M" };
            let time = at.format(pattern).to_string();
            // 12 h drops the leading zero: "9:05", not "09:05"
            let time = time.strip_prefix('0').map(str::to_string).unwrap_or(time);
            (time, Some(at.format("%p").to_string()))
        }
        TimeFormat::Hour24 => {
            let pattern = if show_seconds { "%H:%M:%S" } else { "%H:%M" };
            (at.format(pattern).to_string(), None)
        }
    };

    ClockFace {
        time,
        ampm,
        weekday: at.format("%A").to_string(),
        date: format!("{} {}{}", at.format("%B"), at.day(), ordinal_suffix(at.day())),
    }
}

enum Zone {
    Local,
    Named(Tz),
}

fn parse_zone(name: &str) -> Zone {
    if name == "Local" {
        return Zone::Local;
    }
    match name.parse::<Tz>() {
        Ok(tz) => Zone::Named(tz),
        Err(e) => {
            // Fallback to local time if timezone parsing fails
            warn!("Unknown timezone '{}' ({}), using local time", name, e);
            Zone::Local
        }
    }
}

pub struct ClockProvider {
    metadata: ProviderMetadata,
    config: ClockProviderConfig,
    zone: Zone,
    font: Arc<FontMetrics>,
    now: Box<dyn Fn() -> DateTime<Utc> + Send>,
    face: Option<ClockFace>,
    painted: PaintedKey,
}

impl ClockProvider {
    pub fn new(config: ClockProviderConfig, fonts: &FontBook) -> Self {
        let metadata = ProviderMetadata {
            id: "clock".to_string(),
            name: "Clock".to_string(),
            description: "Current time, weekday and date".to_string(),
            update_interval: Duration::from_millis(config.update_interval_ms),
        };

        Self {
            metadata,
            zone: parse_zone(&config.timezone),
            font: fonts.get_or_default(&config.font),
            config,
            now: Box::new(Utc::now),
            face: None,
            painted: PaintedKey::default(),
        }
    }

    /// Replace the wall clock (tests and replays)
    pub fn with_clock(mut self, now: impl Fn() -> DateTime<Utc> + Send + 'static) -> Self {
        self.now = Box::new(now);
        self
    }

    pub fn face(&self) -> Option<&ClockFace> {
        self.face.as_ref()
    }

    fn current_face(&self) -> ClockFace {
        let utc = (self.now)();
        let format = self.config.time_format;
        let seconds = self.config.show_seconds;
        match &self.zone {
            Zone::Local => format_clock(&utc.with_timezone(&Local), format, seconds),
            Zone::Named(tz) => format_clock(&utc.with_timezone(tz), format, seconds),
        }
    }
}

impl ContentProvider for ClockProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn update(&mut self, now: Instant, state: &mut RotationState) {
        if !state.is_stale(now, self.metadata.update_interval) {
            return;
        }
        let face = self.current_face();
        if self.face.as_ref() != Some(&face) {
            debug!("Clock now {} {}", face.time, face.ampm.as_deref().unwrap_or_default());
        }
        self.face = Some(face);
        state.mark_updated(now);
    }

    fn is_ready(&self) -> bool {
        self.face.is_some()
    }

    fn render(
        &mut self,
        canvas: &mut Canvas,
        layout: &TextLayoutEngine,
        state: &mut RotationState,
    ) -> Result<bool, RenderError> {
        let face = self
            .face
            .as_ref()
            .ok_or_else(|| RenderError::Content("clock has not been updated".to_string()))?;
        let key = face.key();
        if !self.painted.needs_paint(&key, state) {
            return Ok(false);
        }

        let font = self.font.as_ref();
        let width = canvas.width();
        let height = canvas.height() as i32;

        let time_x = layout.center_x(&face.time, font, width);
        let time_color = self.config.time_color;
        let time = TextBlock::new(face.time.as_str(), font, time_color, (time_x, TIME_Y));
        canvas.draw_text_block(&time);

        if let Some(ampm) = &face.ampm {
            let time_width = layout.measure(&face.time, font) as i32;
            let ampm_x = (width as i32 + time_width).div_euclid(2) + AMPM_GAP;
            let origin = (ampm_x, TIME_Y);
            let color = self.config.ampm_color;
            canvas.draw_text_block(&TextBlock::new(ampm.as_str(), font, color, origin));
        }

        let rows = [(&face.weekday, WEEKDAY_FROM_BOTTOM), (&face.date, DATE_FROM_BOTTOM)];
        for (text, from_bottom) in rows {
            let x = layout.center_x(text, font, width);
            let origin = (x, height - from_bottom);
            let color = self.config.date_color;
            canvas.draw_text_block(&TextBlock::new(text.as_str(), font, color, origin));
        }

        self.painted.painted(key, state);
        Ok(true)
    }
}
