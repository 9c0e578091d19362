//! Content provider trait and per-provider rotation state

use led_ticker_render::{Canvas, RenderError, TextLayoutEngine};
use std::time::{Duration, Instant};

/// Metadata about a content provider
#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    /// Provider type identifier (e.g. "clock")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Description of what this provider shows
    pub description: String,
    /// How often the provider's content goes stale
    pub update_interval: Duration,
}

/// Body text shown by providers that alternate two texts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPhase {
    #[default]
    Subtitle,
    Description,
}

impl TextPhase {
    pub fn toggled(self) -> Self {
        match self {
            TextPhase::Subtitle => TextPhase::Description,
            TextPhase::Description => TextPhase::Subtitle,
        }
    }
}

/// Provider-specific sub-rotation position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPhase {
    /// No sub-rotation
    #[default]
    None,
    /// Index into an ordered event list
    Event(usize),
    /// Category index plus the body text shown for it
    OfTheDay { category: usize, phase: TextPhase },
}

/// Mutable bookkeeping the scheduler keeps for each registered provider
#[derive(Debug, Clone, Default)]
pub struct RotationState {
    pub last_update: Option<Instant>,
    pub last_display: Option<Instant>,
    pub phase: RotationPhase,
    /// Force the next render to repaint even if content is unchanged
    pub dirty: bool,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if content has never been refreshed or is older than `interval`
    pub fn is_stale(&self, now: Instant, interval: Duration) -> bool {
        match self.last_update {
            None => true,
            Some(last) => now.saturating_duration_since(last) > interval,
        }
    }

    pub fn mark_updated(&mut self, now: Instant) {
        self.last_update = Some(now);
    }
}

/// Remembers the identity key of the last painted frame so a provider can
/// tell "same content" from "new content"
#[derive(Debug, Clone, Default)]
pub struct PaintedKey {
    key: Option<String>,
}

impl PaintedKey {
    /// Whether `key` must be painted, given the rotation state's dirty flag
    pub fn needs_paint(&self, key: &str, state: &RotationState) -> bool {
        state.dirty || self.key.as_deref() != Some(key)
    }

    /// Record a completed paint and clear the dirty flag
    pub fn painted(&mut self, key: String, state: &mut RotationState) {
        self.key = Some(key);
        state.dirty = false;
    }

    pub fn forget(&mut self) {
        self.key = None;
    }
}

/// Trait for all content providers
///
/// Providers never block: `update` only looks at content already cached
/// by a background refresh task, and `render` paints into the canvas it
/// is lent for the duration of the call.
pub trait ContentProvider: Send {
    /// Get metadata about this provider
    fn metadata(&self) -> &ProviderMetadata;

    /// Refresh internal content if stale. Must return immediately.
    fn update(&mut self, now: Instant, state: &mut RotationState);

    /// False until the provider has content to show
    fn is_ready(&self) -> bool;

    /// Paint current content into the canvas back buffer.
    ///
    /// Returns `Ok(false)` without touching the canvas when the content
    /// identity is unchanged since the last paint and `state.dirty` is not
    /// set.
    fn render(
        &mut self,
        canvas: &mut Canvas,
        layout: &TextLayoutEngine,
        state: &mut RotationState,
    ) -> Result<bool, RenderError>;

    /// Move to the next internal sub-item, if the provider has any
    fn advance(&mut self, _now: Instant, _state: &mut RotationState) {}
}

/// Type-erased content provider for dynamic dispatch
pub type BoxedProvider = Box<dyn ContentProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness() {
        let start = Instant::now();
        let mut state = RotationState::new();
        assert!(state.is_stale(start, Duration::from_secs(1)));
        state.mark_updated(start);
        assert!(!state.is_stale(start + Duration::from_secs(1), Duration::from_secs(1)));
        assert!(state.is_stale(start + Duration::from_millis(1001), Duration::from_secs(1)));
    }

    #[test]
    fn test_painted_key() {
        let mut state = RotationState::new();
        let mut painted = PaintedKey::default();
        assert!(painted.needs_paint("a", &state));
        painted.painted("a".into(), &mut state);
        assert!(!painted.needs_paint("a", &state));
        assert!(painted.needs_paint("b", &state));
        state.dirty = true;
        assert!(painted.needs_paint("a", &state));
    }

    #[test]
    fn test_phase_toggle() {
        assert_eq!(TextPhase::Subtitle.toggled(), TextPhase::Description);
        assert_eq!(TextPhase::Description.toggled(), TextPhase::Subtitle);
    }
}
