//! "Of the day" provider
//!
//! Rotates along two axes: the category (word of the day, fact of the
//! day...) on a long interval, and within a category between the item's
//! subtitle and description on a short interval. When both are due in the
//! same tick the category wins and the text phase restarts at the subtitle.

use crate::fetchers::CategoryItem;
use chrono::{Local, NaiveDate};
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
};
use led_ticker_core::{
    ContentFeed, ContentProvider, PaintedKey, ProviderMetadata, RotationPhase, RotationState,
    TextPhase, LINE_GAP,
};
use led_ticker_render::{Canvas, FontBook, FontMetrics, RenderError, TextBlock, TextLayoutEngine};
use led_ticker_types::OfTheDayProviderConfig;
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

const BODY_LINES: usize = 3;
const BODY_MARGIN: u32 = 1;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct OfTheDayProvider {
    metadata: ProviderMetadata,
    config: OfTheDayProviderConfig,
    feed: ContentFeed<Vec<CategoryItem>>,
    title_font: Arc<FontMetrics>,
    body_font: Arc<FontMetrics>,
    items: Vec<CategoryItem>,
    today: fn() -> NaiveDate,
    current_day: Option<NaiveDate>,
    category_since: Option<Instant>,
    phase_since: Option<Instant>,
    painted: PaintedKey,
}

impl OfTheDayProvider {
    pub fn new(
        config: OfTheDayProviderConfig,
        feed: ContentFeed<Vec<CategoryItem>>,
        fonts: &FontBook,
    ) -> Self {
        let metadata = ProviderMetadata {
            id: "of_the_day".to_string(),
            name: "Of The Day".to_string(),
            description: "Daily word, fact or quote by category".to_string(),
            update_interval: Duration::from_secs(config.update_interval_secs),
        };

        Self {
            metadata,
            title_font: fonts.get_or_default(&config.title_font),
            body_font: fonts.get_or_default(&config.body_font),
            config,
            feed,
            items: Vec::new(),
            today: local_today,
            current_day: None,
            category_since: None,
            phase_since: None,
            painted: PaintedKey::default(),
        }
    }

    /// Replace the calendar day source (tests)
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn items(&self) -> &[CategoryItem] {
        &self.items
    }

    fn category_interval(&self) -> Duration {
        Duration::from_secs(self.config.display_rotate_interval_secs)
    }

    fn phase_interval(&self) -> Duration {
        Duration::from_secs(self.config.subtitle_rotate_interval_secs)
    }

    fn position(&self, state: &RotationState) -> (usize, TextPhase) {
        match state.phase {
            RotationPhase::OfTheDay { category, phase } if category < self.items.len() => {
                (category, phase)
            }
            _ => (0, TextPhase::Subtitle),
        }
    }

    fn restart_timers(&mut self, now: Instant) {
        self.category_since = Some(now);
        self.phase_since = Some(now);
    }

    fn next_category(&mut self, now: Instant, state: &mut RotationState) {
        let (category, _) = self.position(state);
        let next = (category + 1) % self.items.len();
        if next != category {
            info!("Rotating to category {}", self.items[next].category);
        }
        state.phase = RotationPhase::OfTheDay {
            category: next,
            phase: TextPhase::Subtitle,
        };
        self.restart_timers(now);
    }

    fn apply_items(&mut self, items: Vec<CategoryItem>, now: Instant, state: &mut RotationState) {
        let same_items = items.len() == self.items.len()
            && items.iter().zip(&self.items).all(|(a, b)| a.item.key == b.item.key);
        self.items = items;
        if !same_items {
            debug!("Loaded {} of-the-day items", self.items.len());
            state.phase = RotationPhase::OfTheDay {
                category: 0,
                phase: TextPhase::Subtitle,
            };
            state.dirty = true;
            self.restart_timers(now);
        }
    }

    /// Advance the two rotation axes. Category rotation takes precedence.
    fn rotate(&mut self, now: Instant, state: &mut RotationState) {
        let (Some(category_since), Some(phase_since)) = (self.category_since, self.phase_since)
        else {
            self.restart_timers(now);
            return;
        };

        if now.saturating_duration_since(category_since) >= self.category_interval() {
            self.next_category(now, state);
        } else if now.saturating_duration_since(phase_since) >= self.phase_interval() {
            let (category, phase) = self.position(state);
            state.phase = RotationPhase::OfTheDay {
                category,
                phase: phase.toggled(),
            };
            self.phase_since = Some(now);
        }
    }

    /// Text for the body area: the requested phase, or the other text when
    /// that one is missing
    fn body_text<'a>(item: &'a CategoryItem, phase: TextPhase) -> &'a str {
        let (first, second) = match phase {
            TextPhase::Subtitle => (item.item.subtitle_text(), item.item.description_text()),
            TextPhase::Description => (item.item.description_text(), item.item.subtitle_text()),
        };
        first.or(second).unwrap_or_default()
    }
}

impl ContentProvider for OfTheDayProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn update(&mut self, now: Instant, state: &mut RotationState) {
        let today = (self.today)();
        if self.current_day != Some(today) {
            info!("New day {}, loading items", today);
            self.current_day = Some(today);
            self.feed.request_refresh();
            state.mark_updated(now);
        } else if state.is_stale(now, self.metadata.update_interval) {
            self.feed.request_refresh();
            state.mark_updated(now);
        }

        if let Some(snapshot) = self.feed.take_new() {
            self.apply_items(snapshot.value.clone(), now, state);
        }
        if !self.items.is_empty() {
            self.rotate(now, state);
        }
    }

    fn is_ready(&self) -> bool {
        !self.items.is_empty()
    }

    fn render(
        &mut self,
        canvas: &mut Canvas,
        layout: &TextLayoutEngine,
        state: &mut RotationState,
    ) -> Result<bool, RenderError> {
        let (category, phase) = self.position(state);
        let item = self
            .items
            .get(category)
            .ok_or_else(|| RenderError::Content("no items for today".to_string()))?;
        let key = format!("{}|{:?}", item.item.key, phase);
        if !self.painted.needs_paint(&key, state) {
            return Ok(false);
        }

        let width = canvas.width();
        let title_font = self.title_font.as_ref();
        let body_font = self.body_font.as_ref();
        let title = item.item.title.as_str();

        let title_x = layout.center_x(title, title_font, width);
        let title_color = self.config.title_color;
        canvas.draw_text_block(&TextBlock::new(title, title_font, title_color, (title_x, 0)));

        let underline_y = title_font.height() as i32 + 1;
        let title_width = layout.measure(title, title_font) as i32;
        if title_width > 0 {
            let c = self.config.title_color;
            // Canvas drawing is infallible
            let _ = Line::new(
                Point::new(title_x, underline_y),
                Point::new(title_x + title_width - 1, underline_y),
            )
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::new(c.r, c.g, c.b), 1))
            .draw(canvas);
        }

        let body = Self::body_text(item, phase);
        let max_width = width.saturating_sub(2 * BODY_MARGIN);
        let wrapped = layout.wrap(body, max_width, body_font, BODY_LINES);
        let body_top = underline_y + 2;
        let color = self.config.body_color;
        let blocks =
            layout.stack_centered(wrapped.lines(), body_font, color, body_top, LINE_GAP, width);
        for block in blocks {
            canvas.draw_text_block(&block);
        }

        self.painted.painted(key, state);
        Ok(true)
    }

    /// External advance, e.g. when the scheduler moves on. Suppressed when
    /// the internal category rotation is due within the guard window.
    fn advance(&mut self, now: Instant, state: &mut RotationState) {
        if self.items.is_empty() {
            return;
        }
        let Some(category_since) = self.category_since else {
            self.next_category(now, state);
            return;
        };

        let remaining = self
            .category_interval()
            .saturating_sub(now.saturating_duration_since(category_since));
        if remaining <= Duration::from_secs(self.config.advance_guard_secs) {
            debug!("Category rotation due in {:?}, skipping external advance", remaining);
            return;
        }
        self.next_category(now, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use led_ticker_types::ContentItem;

    fn item(category: &str, subtitle: Option<&str>, description: Option<&str>) -> CategoryItem {
        let mut item =
            ContentItem::new(format!("{}:2026:289", category), format!("{} title", category));
        item.subtitle = subtitle.map(str::to_string);
        item.description = description.map(str::to_string);
        CategoryItem {
            category: category.to_string(),
            item,
        }
    }

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn provider() -> OfTheDayProvider {
        let items = vec![
            item("word", Some("noun"), Some("a happy accident")),
            item("fact", Some("Space"), Some("Venus spins backwards")),
            item("quote", None, Some("Stay hungry")),
        ];
        OfTheDayProvider::new(
            OfTheDayProviderConfig::default(),
            ContentFeed::preloaded(items),
            &FontBook::with_builtin(),
        )
        .with_today(fixed_day)
    }

    fn at(start: Instant, secs: u64) -> Instant {
        start + Duration::from_secs(secs)
    }

    fn phase(category: usize, phase: TextPhase) -> RotationPhase {
        RotationPhase::OfTheDay { category, phase }
    }

    #[test]
    fn test_phase_rotates_within_category() {
        let mut otd = provider();
        let mut state = RotationState::new();
        let start = Instant::now();
        otd.update(start, &mut state);
        assert!(otd.is_ready());
        assert_eq!(state.phase, phase(0, TextPhase::Subtitle));

        otd.update(at(start, 10), &mut state);
        assert_eq!(state.phase, phase(0, TextPhase::Description));
        otd.update(at(start, 20), &mut state);
        assert_eq!(state.phase, phase(0, TextPhase::Subtitle));
    }

    #[test]
    fn test_category_rotation_wins_tie() {
        let mut otd = provider();
        let mut state = RotationState::new();
        let start = Instant::now();
        otd.update(start, &mut state);

        // Phase timer last reset at 20s, so at 30s both timers are due
        otd.update(at(start, 10), &mut state);
        otd.update(at(start, 20), &mut state);
        otd.update(at(start, 30), &mut state);
        assert_eq!(state.phase, phase(1, TextPhase::Subtitle));
    }

    #[test]
    fn test_external_advance_guard() {
        let mut otd = provider();
        let mut state = RotationState::new();
        let start = Instant::now();
        otd.update(start, &mut state);

        // 26s into a 30s rotation: within the 5s guard
        otd.advance(at(start, 26), &mut state);
        assert_eq!(state.phase, phase(0, TextPhase::Subtitle));

        // 15s in: advances and restarts the category timer
        let mut state = RotationState::new();
        let mut otd = provider();
        otd.update(start, &mut state);
        otd.advance(at(start, 15), &mut state);
        assert_eq!(state.phase, phase(1, TextPhase::Subtitle));
        otd.update(at(start, 44), &mut state);
        assert!(matches!(state.phase, RotationPhase::OfTheDay { category: 1, .. }));
        otd.update(at(start, 45), &mut state);
        assert_eq!(state.phase, phase(2, TextPhase::Subtitle));
    }

    #[test]
    fn test_missing_text_falls_back_to_other_body() {
        let quote = item("quote", None, Some("Stay hungry"));
        assert_eq!(OfTheDayProvider::body_text(&quote, TextPhase::Subtitle), "Stay hungry");
        let bare = item("bare", None, None);
        assert_eq!(OfTheDayProvider::body_text(&bare, TextPhase::Description), "");
    }

    #[test]
    fn test_render_title_underline_and_body() {
        let mut otd = provider();
        let mut state = RotationState::new();
        let layout = TextLayoutEngine::new();
        let mut canvas = Canvas::new(128, 32);
        otd.update(Instant::now(), &mut state);
        assert!(otd.render(&mut canvas, &layout, &mut state).unwrap());
        assert!(!otd.render(&mut canvas, &layout, &mut state).unwrap());

        let frame = canvas.swap();
        assert_eq!(frame.text(), "word title\nnoun");
        // 5x8 title: underline on row 9 spans the title width
        let underline = (0..128).filter(|x| frame.pixel(*x, 9).is_some_and(|c| c.is_lit())).count();
        assert_eq!(underline, 50);
    }
}
