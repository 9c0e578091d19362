//! Headline provider

use crate::paint::paint_paragraph;
use led_ticker_core::{ContentFeed, ContentProvider, PaintedKey, ProviderMetadata, RotationState};
use led_ticker_render::{Canvas, FontBook, FontMetrics, RenderError, TextLayoutEngine};
use led_ticker_types::NewsProviderConfig;
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SEPARATOR: &str = " | ";
/// Horizontal margin on each side
const MARGIN: u32 = 1;

/// First `max` non-blank headlines joined into one line
pub fn headline_text(headlines: &[String], max: usize) -> String {
    headlines
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .take(max)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub struct NewsProvider {
    metadata: ProviderMetadata,
    config: NewsProviderConfig,
    feed: ContentFeed<Vec<String>>,
    font: Arc<FontMetrics>,
    text: String,
    painted: PaintedKey,
}

impl NewsProvider {
    pub fn new(
        config: NewsProviderConfig,
        feed: ContentFeed<Vec<String>>,
        fonts: &FontBook,
    ) -> Self {
        let metadata = ProviderMetadata {
            id: "news".to_string(),
            name: "News".to_string(),
            description: "Latest headlines".to_string(),
            update_interval: Duration::from_millis(config.update_interval_ms),
        };

        Self {
            metadata,
            font: fonts.get_or_default(&config.font),
            config,
            feed,
            text: String::new(),
            painted: PaintedKey::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl ContentProvider for NewsProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn update(&mut self, now: Instant, state: &mut RotationState) {
        if state.is_stale(now, self.metadata.update_interval) {
            self.feed.request_refresh();
            state.mark_updated(now);
        }
        if let Some(snapshot) = self.feed.take_new() {
            let text = headline_text(&snapshot.value, self.config.max_headlines);
            if text != self.text {
                debug!("News content changed ({} headlines)", snapshot.value.len());
                self.text = text;
            }
        }
    }

    fn is_ready(&self) -> bool {
        !self.text.is_empty()
    }

    fn render(
        &mut self,
        canvas: &mut Canvas,
        layout: &TextLayoutEngine,
        state: &mut RotationState,
    ) -> Result<bool, RenderError> {
        if self.text.is_empty() {
            return Err(RenderError::Content("no headlines yet".to_string()));
        }
        if !self.painted.needs_paint(&self.text, state) {
            return Ok(false);
        }
        paint_paragraph(canvas, layout, &self.font, self.config.color, &self.text, MARGIN);
        self.painted.painted(self.text.clone(), state);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_text_takes_first_non_blank() {
        let headlines: Vec<String> =
            ["One", " ", "Two", "Three"].iter().map(|s| s.to_string()).collect();
        assert_eq!(headline_text(&headlines, 2), "One | Two");
        assert_eq!(headline_text(&headlines, 5), "One | Two | Three");
        assert_eq!(headline_text(&[], 5), "");
    }

    #[test]
    fn test_new_headlines_force_repaint() {
        let feed = ContentFeed::preloaded(vec!["Rates hold".to_string()]);
        let slot = feed.slot().clone();
        let fonts = FontBook::with_builtin();
        let mut news = NewsProvider::new(NewsProviderConfig::default(), feed, &fonts);
        let layout = TextLayoutEngine::new();
        let mut canvas = Canvas::new(128, 32);
        let mut state = RotationState::new();
        let start = Instant::now();

        news.update(start, &mut state);
        assert!(news.render(&mut canvas, &layout, &mut state).unwrap());
        assert!(!news.render(&mut canvas, &layout, &mut state).unwrap());
        assert_eq!(canvas.swap().text(), "Rates hold");

        slot.publish(vec!["Storm heads north".to_string()]);
        news.update(start + Duration::from_millis(250), &mut state);
        assert!(news.render(&mut canvas, &layout, &mut state).unwrap());
        assert_eq!(canvas.swap().text(), "Storm heads north");
    }
}
