//! Registry of content provider factories

use crate::provider::BoxedProvider;
use anyhow::{anyhow, Result};
use led_ticker_render::FontBook;
use led_ticker_types::ProviderConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;

/// What a factory gets besides the provider's own configuration
#[derive(Clone)]
pub struct ProviderContext {
    pub fonts: Arc<FontBook>,
    /// Runtime background refresh tasks are spawned on
    pub runtime: Option<Handle>,
}

impl ProviderContext {
    pub fn new(fonts: Arc<FontBook>, runtime: Option<Handle>) -> Self {
        Self { fonts, runtime }
    }

    /// The configured runtime, or the one the caller is running inside
    pub fn runtime(&self) -> Result<Handle> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current()
                .map_err(|e| anyhow!("No tokio runtime for background refresh: {}", e)),
        }
    }
}

/// Function that creates a provider from its configuration
pub type ProviderFactory = fn(&ProviderConfig, &ProviderContext) -> Result<BoxedProvider>;

/// Registration info for one provider type
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub provider_type: String,
    pub name: String,
}

/// Maps provider type ids to factories.
///
/// Owned by whoever builds the rotation; there is no process-wide instance.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, (ProviderInfo, ProviderFactory)>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider_type: &str, name: &str, factory: ProviderFactory) {
        let info = ProviderInfo {
            provider_type: provider_type.to_string(),
            name: name.to_string(),
        };
        self.factories.insert(provider_type.to_string(), (info, factory));
    }

    /// Build a provider for `config`
    pub fn create(&self, config: &ProviderConfig, ctx: &ProviderContext) -> Result<BoxedProvider> {
        let provider_type = config.provider_type();
        let (_, factory) = self
            .factories
            .get(provider_type)
            .ok_or_else(|| anyhow!("Unknown provider type: {}", provider_type))?;
        factory(config, ctx)
    }

    pub fn contains(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    /// All registered provider types, sorted by id
    pub fn list(&self) -> Vec<ProviderInfo> {
        let mut infos: Vec<ProviderInfo> =
            self.factories.values().map(|(info, _)| info.clone()).collect();
        infos.sort_by(|a, b| a.provider_type.cmp(&b.provider_type));
        infos
    }
}
