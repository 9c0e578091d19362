//! Calendar provider
//!
//! Shows one upcoming event at a time: its date/time on the first line and
//! the summary wrapped into two lines below. `advance` steps to the next
//! event, wrapping around.

use chrono::Datelike;
use led_ticker_core::{
    ContentFeed, ContentProvider, PaintedKey, ProviderMetadata, RotationPhase, RotationState,
};
use led_ticker_render::{Canvas, FontBook, FontMetrics, RenderError, TextBlock, TextLayoutEngine};
use led_ticker_types::{CalendarEvent, CalendarProviderConfig, EventStart};
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TOP: i32 = 2;
const SUMMARY_GAP: i32 = 2;
const MARGIN: u32 = 2;
const SUMMARY_LINES: usize = 2;

/// Date and time line, e.g. `Fri 10/16 07:30PM` or `Sat 10/17 All Day`
pub fn event_datetime_text(start: &EventStart) -> String {
    match start {
        EventStart::AllDay(date) => {
            format!("{} {}/{} All Day", date.format("%a"), date.month(), date.day())
        }
        EventStart::At(at) => format!(
            "{} {}/{} {}",
            at.format("%a"),
            at.month(),
            at.day(),
            at.format("%I:%M%p")
        ),
    }
}

pub struct CalendarProvider {
    metadata: ProviderMetadata,
    config: CalendarProviderConfig,
    feed: ContentFeed<Vec<CalendarEvent>>,
    date_font: Arc<FontMetrics>,
    title_font: Arc<FontMetrics>,
    events: Vec<CalendarEvent>,
    painted: PaintedKey,
}

impl CalendarProvider {
    pub fn new(
        config: CalendarProviderConfig,
        feed: ContentFeed<Vec<CalendarEvent>>,
        fonts: &FontBook,
    ) -> Self {
        let metadata = ProviderMetadata {
            id: "calendar".to_string(),
            name: "Calendar".to_string(),
            description: "Upcoming calendar events".to_string(),
            update_interval: Duration::from_millis(config.update_interval_ms),
        };

        Self {
            metadata,
            date_font: fonts.get_or_default(&config.date_font),
            title_font: fonts.get_or_default(&config.title_font),
            config,
            feed,
            events: Vec::new(),
            painted: PaintedKey::default(),
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    fn index(&self, state: &RotationState) -> usize {
        match state.phase {
            RotationPhase::Event(i) if i < self.events.len() => i,
            _ => 0,
        }
    }

    fn apply_events(&mut self, mut events: Vec<CalendarEvent>, state: &mut RotationState) {
        events.truncate(self.config.max_events);
        let same_events = events.len() == self.events.len()
            && events.iter().zip(&self.events).all(|(a, b)| a.id == b.id);

        if same_events {
            // Same events, possibly edited: keep the position
            self.events = events;
        } else {
            info!("Calendar now has {} events", events.len());
            self.events = events;
            state.phase = RotationPhase::Event(0);
            state.dirty = true;
        }
    }
}

impl ContentProvider for CalendarProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn update(&mut self, now: Instant, state: &mut RotationState) {
        if state.is_stale(now, self.metadata.update_interval) {
            self.feed.request_refresh();
            state.mark_updated(now);
        }
        if let Some(snapshot) = self.feed.take_new() {
            self.apply_events(snapshot.value.clone(), state);
        }
    }

    fn is_ready(&self) -> bool {
        !self.events.is_empty()
    }

    fn render(
        &mut self,
        canvas: &mut Canvas,
        layout: &TextLayoutEngine,
        state: &mut RotationState,
    ) -> Result<bool, RenderError> {
        let event = self
            .events
            .get(self.index(state))
            .ok_or_else(|| RenderError::Content("no calendar events".to_string()))?;
        let datetime = event_datetime_text(&event.start);
        let key = format!("{}|{}|{}", event.id, datetime, event.summary);
        if !self.painted.needs_paint(&key, state) {
            return Ok(false);
        }

        let width = canvas.width();
        let date_font = self.date_font.as_ref();
        let title_font = self.title_font.as_ref();

        let x = layout.center_x(&datetime, date_font, width);
        let date_color = self.config.date_color;
        canvas.draw_text_block(&TextBlock::new(datetime.as_str(), date_font, date_color, (x, TOP)));

        let max_width = width.saturating_sub(2 * MARGIN);
        let summary = layout.wrap(&event.summary, max_width, title_font, SUMMARY_LINES);
        let summary_top = TOP + date_font.height() as i32 + SUMMARY_GAP;
        let color = self.config.text_color;
        let blocks =
            layout.stack_centered(summary.lines(), title_font, color, summary_top, 0, width);
        for block in blocks {
            canvas.draw_text_block(&block);
        }

        self.painted.painted(key, state);
        Ok(true)
    }

    fn advance(&mut self, _now: Instant, state: &mut RotationState) {
        if self.events.is_empty() {
            return;
        }
        let next = (self.index(state) + 1) % self.events.len();
        debug!("Calendar advanced to event {}", next);
        state.phase = RotationPhase::Event(next);
        state.dirty = true;
    }
}
