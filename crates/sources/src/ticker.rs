//! Stock/crypto ticker provider

use crate::paint::paint_paragraph;
use led_ticker_core::{ContentFeed, ContentProvider, PaintedKey, ProviderMetadata, RotationState};
use led_ticker_render::{Canvas, FontBook, FontMetrics, RenderError, TextLayoutEngine};
use led_ticker_types::{Quote, TickerProviderConfig};
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SEPARATOR: &str = " | ";

/// Ticker line for a set of quotes: stocks first, then crypto, each sorted
/// by symbol
pub fn ticker_text(quotes: &[Quote]) -> String {
    let mut sorted: Vec<&Quote> = quotes.iter().collect();
    sorted.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.symbol.cmp(&b.symbol)));
    sorted
        .iter()
        .map(|q| q.label())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub struct TickerProvider {
    metadata: ProviderMetadata,
    config: TickerProviderConfig,
    feed: ContentFeed<Vec<Quote>>,
    font: Arc<FontMetrics>,
    text: String,
    painted: PaintedKey,
}

impl TickerProvider {
    pub fn new(
        config: TickerProviderConfig,
        feed: ContentFeed<Vec<Quote>>,
        fonts: &FontBook,
    ) -> Self {
        let metadata = ProviderMetadata {
            id: "ticker".to_string(),
            name: "Ticker".to_string(),
            description: "Stock and crypto prices".to_string(),
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

impl ContentProvider for TickerProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn update(&mut self, now: Instant, state: &mut RotationState) {
        if state.is_stale(now, self.metadata.update_interval) {
            self.feed.request_refresh();
            state.mark_updated(now);
        }
        if let Some(snapshot) = self.feed.take_new() {
            let text = ticker_text(&snapshot.value);
            if text != self.text {
                debug!("Ticker content changed: {}", text);
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
            return Err(RenderError::Content("no quotes yet".to_string()));
        }
        if !self.painted.needs_paint(&self.text, state) {
            return Ok(false);
        }
        paint_paragraph(canvas, layout, &self.font, self.config.color, &self.text, 0);
        self.painted.painted(self.text.clone(), state);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use led_ticker_types::QuoteKind;

    #[test]
    fn test_ticker_text_orders_stocks_then_crypto() {
        let quotes = vec![
            Quote::new("eth", QuoteKind::Crypto, Some(2500.5)),
            Quote::new("msft", QuoteKind::Stock, None),
            Quote::new("btc", QuoteKind::Crypto, Some(65000.0)),
            Quote::new("aapl", QuoteKind::Stock, Some(190.0)),
        ];
        assert_eq!(
            ticker_text(&quotes),
            "AAPL:190.00 | MSFT:N/A | BTC:65000.00 | ETH:2500.50"
        );
    }

    #[test]
    fn test_ready_after_first_snapshot() {
        let feed = ContentFeed::preloaded(vec![Quote::new("AAPL", QuoteKind::Stock, Some(190.0))]);
        let fonts = FontBook::with_builtin();
        let mut ticker = TickerProvider::new(TickerProviderConfig::default(), feed, &fonts);
        let mut state = RotationState::new();
        assert!(!ticker.is_ready());
        ticker.update(Instant::now(), &mut state);
        assert!(ticker.is_ready());
        assert_eq!(ticker.text(), "AAPL:190.00");

        let layout = TextLayoutEngine::new();
        let mut canvas = Canvas::new(128, 32);
        assert!(ticker.render(&mut canvas, &layout, &mut state).unwrap());
        assert!(!ticker.render(&mut canvas, &layout, &mut state).unwrap());
        assert_eq!(canvas.swap().text(), "AAPL:190.00");
    }

    #[test]
    fn test_empty_snapshot_keeps_provider_unready() {
        let feed = ContentFeed::preloaded(Vec::new());
        let fonts = FontBook::with_builtin();
        let mut ticker = TickerProvider::new(TickerProviderConfig::default(), feed, &fonts);
        ticker.update(Instant::now(), &mut RotationState::new());
        assert!(!ticker.is_ready());
    }
}
