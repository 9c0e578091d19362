//! Building a ready-to-run orchestrator from an [`AppConfig`]

use crate::config::{AppConfig, DisplayConfig, SinkConfig};
use crate::core::{DisplayOrchestrator, OrchestratorConfig};
use anyhow::{Context, Result};
use led_ticker_core::{ProviderContext, ProviderRegistry};
use led_ticker_render::{ConsoleSink, FontBook, PixelSink, SnapshotSink};
use log::{info, warn};
use std::time::Duration;

/// Built-in faces plus the configured BDF files. A face that fails to load
/// is skipped with a warning; providers asking for it get the default face.
pub fn load_fonts(config: &AppConfig) -> FontBook {
    let mut fonts = FontBook::with_builtin();
    for (name, path) in &config.fonts {
        match fonts.load_bdf_file(name, path) {
            Ok(()) => info!("Loaded font {} from {}", name, path.display()),
            Err(e) => warn!("Failed to load font {} from {}: {}", name, path.display(), e),
        }
    }
    fonts
}

pub fn build_sink(display: &DisplayConfig) -> Box<dyn PixelSink> {
    match &display.sink {
        SinkConfig::Console { ascii_art } => Box::new(ConsoleSink::stdout(*ascii_art)),
        SinkConfig::Snapshot { path, min_interval_ms } => {
            Box::new(SnapshotSink::new(path.clone(), Duration::from_millis(*min_interval_ms)))
        }
    }
}

impl From<&DisplayConfig> for OrchestratorConfig {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            width: display.width,
            height: display.height,
            tick_interval: display.tick_interval(),
            max_sink_failures: display.max_sink_failures,
        }
    }
}

/// Create every enabled provider and register it, in configuration order
pub fn build_orchestrator(
    config: &AppConfig,
    registry: &ProviderRegistry,
    ctx: &ProviderContext,
    sink: Box<dyn PixelSink>,
) -> Result<DisplayOrchestrator> {
    let mut orchestrator =
        DisplayOrchestrator::new(OrchestratorConfig::from(&config.display), sink);

    for entry in config.enabled_providers() {
        let provider = registry
            .create(&entry.config, ctx)
            .with_context(|| {
                format!("Failed to create {} provider", entry.config.provider_type())
            })?;
        orchestrator.register_provider(entry.provider_id(), provider, entry.display_duration());
    }

    Ok(orchestrator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use led_ticker_render::MemorySink;
    use std::sync::Arc;

    #[test]
    fn test_missing_font_file_is_skipped() {
        let mut config = AppConfig::default();
        config.fonts.insert("big".into(), "/nonexistent/big.bdf".into());
        let fonts = load_fonts(&config);
        assert!(fonts.get("big").is_err());
        assert!(fonts.get("6x10").is_ok());
    }

    #[tokio::test]
    async fn test_default_config_builds_rotation() {
        let config = AppConfig::default();
        let registry = led_ticker_sources::builtin_registry();
        let ctx = ProviderContext::new(Arc::new(load_fonts(&config)), None);
        let orchestrator =
            build_orchestrator(&config, &registry, &ctx, Box::new(MemorySink::new())).unwrap();
        let ids: Vec<String> = orchestrator
            .scheduler()
            .statuses()
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(ids, ["clock", "ticker"]);
    }
}
