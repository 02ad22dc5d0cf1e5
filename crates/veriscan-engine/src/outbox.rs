// crates/veriscan-engine/src/outbox.rs
// ============================================================================
// Module: Alert Outbox
// Description: Bounded fire-and-forget channel between detection and delivery.
// Purpose: Keep scoring and verification latency independent of alert delivery.
// Dependencies: veriscan-core, tokio, tracing
// ============================================================================

//! ## Overview
//! Fraud alerts are enqueued onto a bounded channel and drained by a
//! dedicated task that publishes them through the configured sink. The
//! producing request never blocks: when the channel is full the alert is
//! dropped and counted, and a delivery failure is logged and dropped.
//! Delivery is therefore at-least-once from the sink's perspective only
//! for alerts that reach it; the dedup ledger upstream keeps re-detection
//! from amplifying alerts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use veriscan_core::AlertSink;
use veriscan_core::FraudAlert;

// ============================================================================
// SECTION: Alert Outbox
// ============================================================================

/// Bounded fire-and-forget alert queue.
///
/// # Invariants
/// - `enqueue` never blocks and never fails the caller.
/// - Dropped alerts are counted and logged, not silently discarded.
pub struct AlertOutbox {
    /// Channel into the drain task.
    sender: mpsc::Sender<FraudAlert>,
    /// Number of alerts dropped due to a full or closed channel.
    dropped: Arc<AtomicU64>,
    /// Drain task handle, kept for shutdown.
    drain: JoinHandle<()>,
}

impl AlertOutbox {
    /// Spawns the drain task and returns the outbox.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn(sink: Arc<dyn AlertSink>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<FraudAlert>(capacity);
        let drain = tokio::spawn(async move {
            while let Some(alert) = receiver.recv().await {
                let sink = Arc::clone(&sink);
                let publish =
                    tokio::task::spawn_blocking(move || sink.publish(&alert)).await;
                match publish {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        tracing::warn!(%error, "alert delivery failed; alert dropped");
                    }
                    Err(error) => {
                        tracing::warn!(%error, "alert delivery task failed; alert dropped");
                    }
                }
            }
        });
        Self {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
            drain,
        }
    }

    /// Enqueues one alert without blocking.
    ///
    /// A full or closed channel drops the alert; the producing request is
    /// never failed or delayed by delivery.
    pub fn enqueue(&self, alert: FraudAlert) {
        if let Err(error) = self.sender.try_send(alert) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(%error, "alert outbox full; alert dropped");
        }
    }

    /// Returns the number of alerts dropped so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stops the drain task after the queue empties.
    ///
    /// Pending alerts already enqueued are still delivered.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(error) = self.drain.await {
            tracing::warn!(%error, "alert drain task ended abnormally");
        }
    }
}
