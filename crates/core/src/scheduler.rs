//! Rotation scheduler: decides which provider is on screen

use crate::provider::{BoxedProvider, RotationPhase, RotationState};
use led_ticker_render::{Canvas, RenderError, TextLayoutEngine};
use led_ticker_types::ProviderId;
use log::{debug, info, trace};
use std::time::{Duration, Instant};

/// A provider together with its rotation bookkeeping
struct ScheduledProvider {
    id: ProviderId,
    provider: BoxedProvider,
    display_duration: Duration,
    state: RotationState,
}

/// Outcome of one scheduler tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickDecision {
    /// Provider on screen after this tick
    pub selected: Option<ProviderId>,
    /// Selection differs from the previous tick
    pub provider_changed: bool,
    /// A display slot ended (or started) during this tick
    pub rotated: bool,
}

impl TickDecision {
    /// No provider is ready to be shown
    pub fn rotation_empty(&self) -> bool {
        self.selected.is_none()
    }
}

/// Point-in-time view of one registered provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub provider_type: String,
    pub name: String,
    pub ready: bool,
    pub selected: bool,
    pub display_duration: Duration,
    pub phase: RotationPhase,
}

/// Cycles through registered providers in registration order, skipping
/// providers that are not ready
#[derive(Default)]
pub struct RotationScheduler {
    entries: Vec<ScheduledProvider>,
    selected: Option<usize>,
    selected_since: Option<Instant>,
    /// Where the search for a ready provider resumes when nothing is selected
    cursor: usize,
}

impl RotationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected_id(&self) -> Option<&ProviderId> {
        self.selected.map(|i| &self.entries[i].id)
    }

    pub fn contains(&self, id: &ProviderId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &ProviderId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Add a provider at the end of the rotation. Registering an id that is
    /// already present replaces that provider in place.
    pub fn register_provider(
        &mut self,
        id: ProviderId,
        provider: BoxedProvider,
        display_duration: Duration,
    ) -> ProviderId {
        info!(
            "Registering provider {} ({}) for {:?}",
            id,
            provider.metadata().id,
            display_duration
        );
        match self.position(&id) {
            Some(pos) => {
                let entry = &mut self.entries[pos];
                entry.provider = provider;
                entry.display_duration = display_duration;
                entry.state = RotationState::new();
                entry.state.dirty = true;
            }
            None => self.entries.push(ScheduledProvider {
                id: id.clone(),
                provider,
                display_duration,
                state: RotationState::new(),
            }),
        }
        id
    }

    /// Remove a provider; its rotation state is dropped with it
    pub fn deregister_provider(&mut self, id: &ProviderId) -> Option<BoxedProvider> {
        let pos = self.position(id)?;
        let entry = self.entries.remove(pos);
        info!("Deregistered provider {}", id);

        match self.selected {
            Some(sel) if sel == pos => {
                // The entry after the removed one now sits at `pos`
                self.selected = None;
                self.selected_since = None;
                self.cursor = pos;
            }
            Some(sel) if sel > pos => self.selected = Some(sel - 1),
            _ => {
                if self.cursor > pos {
                    self.cursor -= 1;
                }
            }
        }
        Some(entry.provider)
    }

    /// Ask a provider to move to its next internal sub-item
    pub fn force_advance(&mut self, id: &ProviderId, now: Instant) -> bool {
        match self.position(id) {
            Some(pos) => {
                let entry = &mut self.entries[pos];
                debug!("Forced advance of provider {}", id);
                entry.provider.advance(now, &mut entry.state);
                true
            }
            None => false,
        }
    }

    /// Update every provider, then keep or rotate the selection
    pub fn tick(&mut self, now: Instant) -> TickDecision {
        for entry in &mut self.entries {
            entry.provider.update(now, &mut entry.state);
        }

        let previous = self.selected_id().cloned();
        let mut rotated = false;

        match self.selected {
            Some(i) if !self.entries[i].provider.is_ready() => {
                debug!("Provider {} became unready", self.entries[i].id);
                self.select_next_ready(i + 1, now);
                rotated = true;
            }
            Some(i) => {
                let since = self.selected_since.unwrap_or(now);
                if now.saturating_duration_since(since) >= self.entries[i].display_duration {
                    let entry = &mut self.entries[i];
                    entry.provider.advance(now, &mut entry.state);
                    self.select_next_ready(i + 1, now);
                    rotated = true;
                }
            }
            None => {
                self.select_next_ready(self.cursor, now);
                rotated = self.selected.is_some();
            }
        }

        let selected = self.selected_id().cloned();
        let provider_changed = selected != previous;
        if provider_changed {
            trace!("Selection {:?} -> {:?}", previous, selected);
        }

        TickDecision {
            selected,
            provider_changed,
            rotated,
        }
    }

    fn select_next_ready(&mut self, start: usize, now: Instant) {
        let n = self.entries.len();
        for k in 0..n {
            let j = (start + k) % n;
            if self.entries[j].provider.is_ready() {
                let entry = &mut self.entries[j];
                entry.state.last_display = Some(now);
                entry.state.dirty = true;
                self.selected = Some(j);
                self.selected_since = Some(now);
                self.cursor = j;
                return;
            }
        }
        self.selected = None;
        self.selected_since = None;
    }

    /// Let the selected provider paint into the back buffer
    pub fn render_selected(
        &mut self,
        canvas: &mut Canvas,
        layout: &TextLayoutEngine,
    ) -> Result<bool, RenderError> {
        match self.selected {
            Some(i) => {
                let entry = &mut self.entries[i];
                entry.provider.render(canvas, layout, &mut entry.state)
            }
            None => Ok(false),
        }
    }

    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| ProviderStatus {
                id: e.id.clone(),
                provider_type: e.provider.metadata().id.clone(),
                name: e.provider.metadata().name.clone(),
                ready: e.provider.is_ready(),
                selected: self.selected == Some(i),
                display_duration: e.display_duration,
                phase: e.state.phase,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ContentProvider, PaintedKey, ProviderMetadata};
    use led_ticker_render::{FontBook, TextBlock};
    use led_ticker_types::Rgb;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        updates: AtomicUsize,
        advances: AtomicUsize,
        ready: AtomicBool,
    }

    struct FakeProvider {
        metadata: ProviderMetadata,
        text: String,
        painted: PaintedKey,
        counters: Arc<Counters>,
    }

    impl FakeProvider {
        fn boxed(text: &str, ready: bool) -> (BoxedProvider, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            counters.ready.store(ready, Ordering::SeqCst);
            let provider = FakeProvider {
                metadata: ProviderMetadata {
                    id: "fake".into(),
                    name: text.into(),
                    description: String::new(),
                    update_interval: Duration::from_secs(1),
                },
                text: text.into(),
                painted: PaintedKey::default(),
                counters: Arc::clone(&counters),
            };
            (Box::new(provider), counters)
        }
    }

    impl ContentProvider for FakeProvider {
        fn metadata(&self) -> &ProviderMetadata {
            &self.metadata
        }

        fn update(&mut self, _now: Instant, _state: &mut RotationState) {
            self.counters.updates.fetch_add(1, Ordering::SeqCst);
        }

        fn is_ready(&self) -> bool {
            self.counters.ready.load(Ordering::SeqCst)
        }

        fn render(
            &mut self,
            canvas: &mut Canvas,
            _layout: &TextLayoutEngine,
            state: &mut RotationState,
        ) -> Result<bool, RenderError> {
            if !self.painted.needs_paint(&self.text, state) {
                return Ok(false);
            }
            let font = FontBook::with_builtin().default_face();
            canvas.draw_text_block(&TextBlock::new(self.text.clone(), &font, Rgb::WHITE, (0, 0)));
            self.painted.painted(self.text.clone(), state);
            Ok(true)
        }

        fn advance(&mut self, _now: Instant, _state: &mut RotationState) {
            self.counters.advances.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn run_ticks(
        scheduler: &mut RotationScheduler,
        start: Instant,
        span: Duration,
        step: Duration,
    ) -> Vec<ProviderId> {
        let mut shown = Vec::new();
        let mut t = Duration::ZERO;
        while t < span {
            let decision = scheduler.tick(start + t);
            if decision.provider_changed {
                if let Some(id) = decision.selected {
                    shown.push(id);
                }
            }
            t += step;
        }
        shown
    }

    #[test]
    fn test_rotation_is_fair_and_ordered() {
        let mut scheduler = RotationScheduler::new();
        for name in ["a", "b", "c"] {
            let (p, _) = FakeProvider::boxed(name, true);
            scheduler.register_provider(ProviderId::new(name), p, Duration::from_secs(2));
        }
        let step = Duration::from_millis(250);
        let shown = run_ticks(&mut scheduler, Instant::now(), Duration::from_secs(6), step);
        assert_eq!(shown, vec![ProviderId::new("a"), ProviderId::new("b"), ProviderId::new("c")]);
    }

    #[test]
    fn test_unready_provider_is_skipped() {
        let mut scheduler = RotationScheduler::new();
        let (a, _) = FakeProvider::boxed("a", true);
        let (never, never_counters) = FakeProvider::boxed("never", false);
        let (b, _) = FakeProvider::boxed("b", true);
        scheduler.register_provider(ProviderId::new("a"), a, Duration::from_secs(1));
        scheduler.register_provider(ProviderId::new("never"), never, Duration::from_secs(1));
        scheduler.register_provider(ProviderId::new("b"), b, Duration::from_secs(1));

        let step = Duration::from_millis(250);
        let shown = run_ticks(&mut scheduler, Instant::now(), Duration::from_secs(4), step);
        assert_eq!(
            shown,
            ["a", "b", "a", "b"].map(ProviderId::new).to_vec()
        );
        // Still refreshed every tick even though never shown
        assert_eq!(never_counters.updates.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_empty_rotation_selects_nothing() {
        let mut scheduler = RotationScheduler::new();
        let (p, counters) = FakeProvider::boxed("late", false);
        scheduler.register_provider(ProviderId::new("late"), p, Duration::from_secs(1));
        let start = Instant::now();
        assert!(scheduler.tick(start).rotation_empty());

        counters.ready.store(true, Ordering::SeqCst);
        let decision = scheduler.tick(start + Duration::from_millis(250));
        assert_eq!(decision.selected, Some(ProviderId::new("late")));
        assert!(decision.provider_changed);
    }

    #[test]
    fn test_rotation_advances_outgoing_provider() {
        let mut scheduler = RotationScheduler::new();
        let (a, a_counters) = FakeProvider::boxed("a", true);
        scheduler.register_provider(ProviderId::new("a"), a, Duration::from_secs(1));
        let start = Instant::now();
        scheduler.tick(start);
        let decision = scheduler.tick(start + Duration::from_secs(1));
        // Single provider: it stays selected but its slot restarted
        assert!(decision.rotated);
        assert!(!decision.provider_changed);
        assert_eq!(a_counters.advances.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_reports_unchanged_content() {
        let mut scheduler = RotationScheduler::new();
        let (a, _) = FakeProvider::boxed("a", true);
        scheduler.register_provider(ProviderId::new("a"), a, Duration::from_secs(10));
        let layout = TextLayoutEngine::new();
        let mut canvas = Canvas::new(32, 16);
        let start = Instant::now();

        scheduler.tick(start);
        assert!(scheduler.render_selected(&mut canvas, &layout).unwrap());
        scheduler.tick(start + Duration::from_millis(250));
        assert!(!scheduler.render_selected(&mut canvas, &layout).unwrap());
    }

    #[test]
    fn test_deregister_selected_moves_on() {
        let mut scheduler = RotationScheduler::new();
        for name in ["a", "b", "c"] {
            let (p, _) = FakeProvider::boxed(name, true);
            scheduler.register_provider(ProviderId::new(name), p, Duration::from_secs(5));
        }
        let start = Instant::now();
        scheduler.tick(start);
        scheduler.tick(start + Duration::from_secs(5));
        assert_eq!(scheduler.selected_id(), Some(&ProviderId::new("b")));

        assert!(scheduler.deregister_provider(&ProviderId::new("b")).is_some());
        let decision = scheduler.tick(start + Duration::from_secs(6));
        assert_eq!(decision.selected, Some(ProviderId::new("c")));
        assert_eq!(scheduler.len(), 2);
        assert!(scheduler.deregister_provider(&ProviderId::new("b")).is_none());
    }

    #[test]
    fn test_force_advance_reaches_provider() {
        let mut scheduler = RotationScheduler::new();
        let (a, counters) = FakeProvider::boxed("a", true);
        scheduler.register_provider(ProviderId::new("a"), a, Duration::from_secs(5));
        assert!(scheduler.force_advance(&ProviderId::new("a"), Instant::now()));
        assert!(!scheduler.force_advance(&ProviderId::new("missing"), Instant::now()));
        assert_eq!(counters.advances.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_statuses_report_selection() {
        let mut scheduler = RotationScheduler::new();
        let (a, _) = FakeProvider::boxed("a", true);
        let (b, _) = FakeProvider::boxed("b", false);
        scheduler.register_provider(ProviderId::new("a"), a, Duration::from_secs(5));
        scheduler.register_provider(ProviderId::new("b"), b, Duration::from_secs(5));
        scheduler.tick(Instant::now());
        let statuses = scheduler.statuses();
        assert!(statuses[0].selected && statuses[0].ready);
        assert!(!statuses[1].selected && !statuses[1].ready);
    }
}
