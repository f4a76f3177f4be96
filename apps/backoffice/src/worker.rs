//! # Settlement Worker
//!
//! Feeds [`DomainEvent::SaleReturned`] events to the settlement service one
//! at a time, in the order they were published.
//!
//! ```text
//! ┌──────────────────┐   WorkerMessage    ┌──────────────────────────────┐
//! │ SettlementWorker │ ── (bounded mpsc) ─►│ SettlementWorker::run        │
//! │ Handle (Clone)   │                    │   Event    → service.handle  │
//! │  • publish       │                    │   Shutdown → stop            │
//! │  • shutdown      │                    │   closed   → stop            │
//! └──────────────────┘                    └──────────────────────────────┘
//! ```
//!
//! Events and the shutdown signal share one channel, so everything
//! published before `shutdown()` is handled before the loop exits. A failed
//! event is logged and counted; the worker keeps going.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{BackofficeError, BackofficeResult};
use crate::events::DomainEvent;
use crate::services::ReturnSettlementService;

#[derive(Debug)]
enum WorkerMessage {
    Event(DomainEvent),
    Shutdown,
}

/// Counts reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub handled: u64,
    pub failed: u64,
}

pub struct SettlementWorker {
    service: Arc<ReturnSettlementService>,
    rx: mpsc::Receiver<WorkerMessage>,
    stats: WorkerStats,
}

/// Handle for publishing to, and stopping, a [`SettlementWorker`].
#[derive(Clone)]
pub struct SettlementWorkerHandle {
    tx: mpsc::Sender<WorkerMessage>,
}

impl SettlementWorkerHandle {
    /// Queues an event. Waits while the queue is full.
    pub async fn publish(&self, event: DomainEvent) -> BackofficeResult<()> {
        self.tx
            .send(WorkerMessage::Event(event))
            .await
            .map_err(|_| BackofficeError::ShuttingDown)
    }

    /// Asks the worker to stop after the events already queued.
    pub async fn shutdown(&self) -> BackofficeResult<()> {
        self.tx
            .send(WorkerMessage::Shutdown)
            .await
            .map_err(|_| BackofficeError::Channel("Settlement worker already stopped".into()))
    }
}

impl SettlementWorker {
    pub fn new(
        service: Arc<ReturnSettlementService>,
        capacity: usize,
    ) -> (Self, SettlementWorkerHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let worker = SettlementWorker {
            service,
            rx,
            stats: WorkerStats::default(),
        };

        (worker, SettlementWorkerHandle { tx })
    }

    /// Runs until `shutdown()` is received or every handle is dropped.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) -> WorkerStats {
        info!("Settlement worker starting");

        while let Some(message) = self.rx.recv().await {
            match message {
                WorkerMessage::Event(event) => self.dispatch(event).await,
                WorkerMessage::Shutdown => {
                    info!("Settlement worker shutting down");
                    break;
                }
            }
        }

        info!(
            handled = self.stats.handled,
            failed = self.stats.failed,
            "Settlement worker stopped"
        );
        self.stats
    }

    async fn dispatch(&mut self, event: DomainEvent) {
        match event {
            DomainEvent::SaleReturned { sale_return_id } => {
                debug!(sale_return_id = %sale_return_id, "Handling sale return event");
                match self.service.handle(&sale_return_id).await {
                    Ok(()) => self.stats.handled += 1,
                    Err(e) => {
                        self.stats.failed += 1;
                        error!(
                            ?e,
                            sale_return_id = %sale_return_id,
                            retryable = e.is_retryable(),
                            "Failed to settle sale return"
                        );
                    }
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
