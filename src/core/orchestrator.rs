//! Display orchestrator: the tick loop that owns the canvas
//!
//! Each tick lets the rotation scheduler pick a provider, repaints only
//! when the provider changed or reports new content, and hands finished
//! frames to the pixel sink. Provider and render failures stay inside the
//! tick; only a sink that keeps rejecting frames ends the loop.

use super::control::{Command, OrchestratorHandle};
use led_ticker_core::{BoxedProvider, ProviderId, RotationScheduler, TextLayoutEngine};
use led_ticker_render::{Canvas, Frame, PixelSink, SinkError};
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Shortest period the run loop ticks at
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Fatal orchestrator failures
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("pixel sink failed {attempts} times in a row: {source}")]
    SinkFailed {
        attempts: u32,
        #[source]
        source: SinkError,
    },
}

/// Loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub width: u32,
    pub height: u32,
    pub tick_interval: Duration,
    /// Consecutive sink failures tolerated; one more is fatal
    pub max_sink_failures: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
            tick_interval: led_ticker_core::DEFAULT_TICK_INTERVAL,
            max_sink_failures: led_ticker_core::DEFAULT_MAX_SINK_FAILURES,
        }
    }
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub selected: Option<ProviderId>,
    pub provider_changed: bool,
    /// A new frame was produced this tick
    pub painted: bool,
    /// A frame reached the sink this tick
    pub presented: bool,
}

pub struct DisplayOrchestrator {
    config: OrchestratorConfig,
    canvas: Canvas,
    scheduler: RotationScheduler,
    layout: TextLayoutEngine,
    sink: Box<dyn PixelSink>,
    /// Frame the sink has not accepted yet
    pending: Option<Arc<Frame>>,
    sink_failures: u32,
    showing_blank: bool,
}

impl DisplayOrchestrator {
    pub fn new(config: OrchestratorConfig, sink: Box<dyn PixelSink>) -> Self {
        info!(
            "Display {}x{} on {} sink, tick {:?}",
            config.width,
            config.height,
            sink.name(),
            config.tick_interval
        );
        Self {
            canvas: Canvas::new(config.width, config.height),
            config,
            scheduler: RotationScheduler::new(),
            layout: TextLayoutEngine::new(),
            sink,
            pending: None,
            sink_failures: 0,
            showing_blank: false,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    pub fn register_provider(
        &mut self,
        id: ProviderId,
        provider: BoxedProvider,
        display_duration: Duration,
    ) -> ProviderId {
        self.scheduler.register_provider(id, provider, display_duration)
    }

    pub fn deregister_provider(&mut self, id: &ProviderId) -> bool {
        self.scheduler.deregister_provider(id).is_some()
    }

    pub fn force_advance(&mut self, id: &ProviderId, now: Instant) -> bool {
        self.scheduler.force_advance(id, now)
    }

    /// Run one scheduling tick at `now`
    pub fn tick(&mut self, now: Instant) -> Result<TickReport, OrchestratorError> {
        let decision = self.scheduler.tick(now);
        let mut report = TickReport {
            selected: decision.selected.clone(),
            provider_changed: decision.provider_changed,
            ..Default::default()
        };

        if decision.rotation_empty() {
            if !self.showing_blank {
                debug!("No provider ready, blanking display");
                self.canvas.clear();
                self.pending = Some(self.canvas.swap());
                self.showing_blank = true;
                report.painted = true;
            }
        } else {
            self.showing_blank = false;
            if decision.provider_changed {
                // Erase the previous provider's layout
                self.canvas.clear();
            }
            match self.scheduler.render_selected(&mut self.canvas, &self.layout) {
                Ok(true) => {
                    self.pending = Some(self.canvas.swap());
                    report.painted = true;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        "Render of {} failed, keeping previous frame: {}",
                        decision.selected.as_ref().map(ProviderId::as_str).unwrap_or("?"),
                        e
                    );
                    self.canvas.discard_back();
                }
            }
        }

        report.presented = self.present_pending()?;
        Ok(report)
    }

    /// Hand the pending frame to the sink, or let it finish deferred output
    /// when there is none. A rejected frame stays pending and is retried
    /// next tick.
    fn present_pending(&mut self) -> Result<bool, OrchestratorError> {
        let result = match self.pending.as_ref() {
            Some(frame) => self.sink.present(frame).map(|()| {
                trace!("Presented frame: {}", frame.text());
                true
            }),
            None => self.sink.poll().map(|()| false),
        };

        match result {
            Ok(presented) => {
                if presented {
                    self.pending = None;
                }
                self.sink_failures = 0;
                Ok(presented)
            }
            Err(e) => {
                self.sink_failures += 1;
                if self.sink_failures > self.config.max_sink_failures {
                    error!("Sink {} keeps failing, giving up: {}", self.sink.name(), e);
                    return Err(OrchestratorError::SinkFailed {
                        attempts: self.sink_failures,
                        source: e,
                    });
                }
                warn!(
                    "Sink {} rejected frame ({}/{}): {}",
                    self.sink.name(),
                    self.sink_failures,
                    self.config.max_sink_failures,
                    e
                );
                Ok(false)
            }
        }
    }

    /// Command channel for control surfaces
    pub fn channel(buffer: usize) -> (OrchestratorHandle, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(buffer);
        (OrchestratorHandle::new(tx), rx)
    }

    fn apply(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::Register {
                id,
                provider,
                display_duration,
                reply,
            } => {
                let id = id.unwrap_or_else(ProviderId::generate);
                let id = self.register_provider(id, provider, display_duration);
                // The caller may have stopped waiting
                let _ = reply.send(id);
            }
            Command::Deregister { id, reply } => {
                let _ = reply.send(self.deregister_provider(&id));
            }
            Command::ForceAdvance { id, reply } => {
                let _ = reply.send(self.force_advance(&id, now));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.scheduler.statuses());
            }
            Command::Shutdown => return false,
        }
        true
    }

    /// Tick until shutdown or a fatal sink failure.
    ///
    /// Commands are applied between ticks; shutdown never interrupts a paint.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), OrchestratorError> {
        let period = self.config.tick_interval.max(MIN_TICK_INTERVAL);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut commands_open = true;
        let mut shutdown_open = true;

        info!("Orchestrator started with {} providers", self.scheduler.len());
        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed(), if shutdown_open => {
                    if changed.is_err() {
                        debug!("Shutdown sender dropped");
                        shutdown_open = false;
                    } else if *shutdown.borrow() {
                        info!("Shutdown requested");
                        break;
                    }
                }

                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        let now = tokio::time::Instant::now().into_std();
                        if !self.apply(command, now) {
                            info!("Shutdown command received");
                            break;
                        }
                    }
                    None => {
                        debug!("All control handles dropped");
                        commands_open = false;
                    }
                },

                tick = interval.tick() => {
                    let started = std::time::Instant::now();
                    self.tick(tick.into_std())?;
                    trace!("Tick took {:?}", started.elapsed());
                }
            }
        }

        info!("Orchestrator stopped");
        Ok(())
    }
}
