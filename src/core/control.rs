//! Control surface: change the rotation of a running orchestrator

use anyhow::{anyhow, Result};
use led_ticker_core::{BoxedProvider, ProviderId, ProviderStatus};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Requests applied by the orchestrator between ticks
pub enum Command {
    Register {
        /// Generated when absent
        id: Option<ProviderId>,
        provider: BoxedProvider,
        display_duration: Duration,
        reply: oneshot::Sender<ProviderId>,
    },
    Deregister {
        id: ProviderId,
        reply: oneshot::Sender<bool>,
    },
    ForceAdvance {
        id: ProviderId,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<ProviderStatus>>,
    },
    Shutdown,
}

/// Cloneable handle to a running orchestrator
#[derive(Clone)]
pub struct OrchestratorHandle {
    tx: mpsc::Sender<Command>,
}

fn stopped<E>(_: E) -> anyhow::Error {
    anyhow!("orchestrator is not running")
}

impl OrchestratorHandle {
    pub(crate) fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(command(reply)).await.map_err(stopped)?;
        rx.await.map_err(stopped)
    }

    /// Add a provider to the rotation (or replace the one with the same id)
    pub async fn register_provider(
        &self,
        id: Option<ProviderId>,
        provider: BoxedProvider,
        display_duration: Duration,
    ) -> Result<ProviderId> {
        self.request(|reply| Command::Register {
            id,
            provider,
            display_duration,
            reply,
        })
        .await
    }

    /// Returns false if no provider has that id
    pub async fn deregister_provider(&self, id: ProviderId) -> Result<bool> {
        self.request(|reply| Command::Deregister { id, reply }).await
    }

    /// Step the provider's internal sub-rotation
    pub async fn force_advance(&self, id: ProviderId) -> Result<bool> {
        self.request(|reply| Command::ForceAdvance { id, reply }).await
    }

    pub async fn statuses(&self) -> Result<Vec<ProviderStatus>> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(Command::Shutdown).await.map_err(stopped)
    }
}
