//! led-ticker-sources: Content provider implementations for the led-ticker
//! matrix display.

mod calendar;
mod clock;
mod fetchers;
mod news;
mod of_the_day;
mod paint;
mod ticker;

pub use calendar::{event_datetime_text, CalendarProvider};
pub use clock::{format_clock, ordinal_suffix, ClockFace, ClockProvider};
pub use fetchers::{feed_for, CategoryItem, JsonFileFetcher, OfTheDayFetcher, StaticFetcher};
pub use news::{headline_text, NewsProvider};
pub use of_the_day::OfTheDayProvider;
pub use ticker::{ticker_text, TickerProvider};

use anyhow::{bail, Result};
use led_ticker_core::{BoxedProvider, ContentFeed, ProviderContext, ProviderRegistry};
use led_ticker_types::ProviderConfig;
use std::time::Duration;

/// Register all built-in providers with `registry`
pub fn register_all(registry: &mut ProviderRegistry) {
    registry.register("clock", "Clock", create_clock);
    registry.register("ticker", "Ticker", create_ticker);
    registry.register("news", "News", create_news);
    registry.register("calendar", "Calendar", create_calendar);
    registry.register("of_the_day", "Of The Day", create_of_the_day);
}

/// Registry with every built-in provider
pub fn builtin_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    register_all(&mut registry);
    registry
}

fn create_clock(config: &ProviderConfig, ctx: &ProviderContext) -> Result<BoxedProvider> {
    let ProviderConfig::Clock(cfg) = config else {
        bail!("clock factory got {} config", config.provider_type());
    };
    Ok(Box::new(ClockProvider::new(cfg.clone(), &ctx.fonts)))
}

fn create_ticker(config: &ProviderConfig, ctx: &ProviderContext) -> Result<BoxedProvider> {
    let ProviderConfig::Ticker(cfg) = config else {
        bail!("ticker factory got {} config", config.provider_type());
    };
    let budget = Duration::from_millis(cfg.refresh_budget_ms);
    let feed = feed_for("ticker", &cfg.source, budget, ctx)?;
    Ok(Box::new(TickerProvider::new(cfg.clone(), feed, &ctx.fonts)))
}

fn create_news(config: &ProviderConfig, ctx: &ProviderContext) -> Result<BoxedProvider> {
    let ProviderConfig::News(cfg) = config else {
        bail!("news factory got {} config", config.provider_type());
    };
    let budget = Duration::from_millis(cfg.refresh_budget_ms);
    let feed = feed_for("news", &cfg.source, budget, ctx)?;
    Ok(Box::new(NewsProvider::new(cfg.clone(), feed, &ctx.fonts)))
}

fn create_calendar(config: &ProviderConfig, ctx: &ProviderContext) -> Result<BoxedProvider> {
    let ProviderConfig::Calendar(cfg) = config else {
        bail!("calendar factory got {} config", config.provider_type());
    };
    let budget = Duration::from_millis(cfg.refresh_budget_ms);
    let feed = feed_for("calendar", &cfg.source, budget, ctx)?;
    Ok(Box::new(CalendarProvider::new(cfg.clone(), feed, &ctx.fonts)))
}

fn create_of_the_day(config: &ProviderConfig, ctx: &ProviderContext) -> Result<BoxedProvider> {
    let ProviderConfig::OfTheDay(cfg) = config else {
        bail!("of_the_day factory got {} config", config.provider_type());
    };
    let fetcher = OfTheDayFetcher::new(cfg.categories.clone(), cfg.data_dir.clone());
    let feed = ContentFeed::spawn(
        "of_the_day",
        fetcher,
        led_ticker_core::DEFAULT_REFRESH_BUDGET,
        &ctx.runtime()?,
    );
    Ok(Box::new(OfTheDayProvider::new(cfg.clone(), feed, &ctx.fonts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use led_ticker_core::ContentProvider;
    use led_ticker_render::FontBook;
    use led_ticker_types::{ClockProviderConfig, TickerProviderConfig};
    use std::sync::Arc;

    #[test]
    fn test_register_all_lists_every_provider() {
        let registry = builtin_registry();
        let types: Vec<String> = registry.list().into_iter().map(|i| i.provider_type).collect();
        assert_eq!(types, ["calendar", "clock", "news", "of_the_day", "ticker"]);
    }

    #[test]
    fn test_clock_needs_no_runtime() {
        let registry = builtin_registry();
        let ctx = ProviderContext::new(Arc::new(FontBook::with_builtin()), None);
        let provider = registry
            .create(&ProviderConfig::Clock(ClockProviderConfig::default()), &ctx)
            .unwrap();
        assert_eq!(provider.metadata().id, "clock");
    }

    #[tokio::test]
    async fn test_ticker_spawns_on_current_runtime() {
        let registry = builtin_registry();
        let ctx = ProviderContext::new(Arc::new(FontBook::with_builtin()), None);
        let provider = registry
            .create(&ProviderConfig::Ticker(TickerProviderConfig::default()), &ctx)
            .unwrap();
        assert_eq!(provider.metadata().id, "ticker");
    }
}
