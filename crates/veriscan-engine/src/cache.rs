// crates/veriscan-engine/src/cache.rs
// ============================================================================
// Module: Trust Score Cache
// Description: TTL result cache with per-key single-flight stampede protection.
// Purpose: Collapse concurrent misses into one computation and bound staleness.
// Dependencies: veriscan-core, tokio
// ============================================================================

//! ## Overview
//! The cache maps `(product, fingerprint)` keys to trust scores with a
//! fixed TTL. Concurrent requests for one key during a miss collapse into a
//! single computation: the first arrival becomes the leader, later arrivals
//! subscribe to the leader's result. The map guard is held only to locate
//! or install a slot; waiting and computing happen outside it, so unrelated
//! keys never contend.
//! Invariants:
//! - A cancelled or failed leader abandons its slot; a waiter takes over
//!   and no partial score is ever cached.
//! - Invalidation during an in-flight computation wins: the leader's
//!   result is delivered to waiters but not written back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::watch;
use veriscan_core::ProductId;
use veriscan_core::TrustScore;

use crate::fingerprint::Fingerprint;

// ============================================================================
// SECTION: Keys and Entries
// ============================================================================

/// Cache key addressing one input snapshot of one product.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Product the score belongs to.
    pub product_id: ProductId,
    /// Fingerprint of the scoring-relevant inputs.
    pub fingerprint: Fingerprint,
}

/// One cached score with its expiry deadline.
struct ReadyEntry {
    /// The cached score.
    score: TrustScore,
    /// Instant after which the entry is stale.
    expires_at: Instant,
}

/// Slot state for one key.
enum Slot {
    /// A computed score is available.
    Ready(ReadyEntry),
    /// A leader is computing; waiters subscribe to the receiver.
    InFlight(watch::Receiver<Option<TrustScore>>),
}

/// Outcome of a slot claim.
enum Claim {
    /// A fresh score was found.
    Hit(TrustScore),
    /// The caller became the leader and must compute.
    Lead(watch::Sender<Option<TrustScore>>),
    /// Another task is computing; wait on the receiver.
    Wait(watch::Receiver<Option<TrustScore>>),
}

// ============================================================================
// SECTION: Score Cache
// ============================================================================

/// TTL trust-score cache with single-flight miss handling.
pub struct ScoreCache {
    /// Time a computed entry stays fresh.
    ttl: Duration,
    /// Slot map; the guard is held only for slot bookkeeping.
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl ScoreCache {
    /// Creates a cache with the given entry TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached score for a key when present and fresh.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<TrustScore> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(key) {
            Some(Slot::Ready(entry)) if entry.expires_at > Instant::now() => {
                Some(entry.score.clone())
            }
            _ => None,
        }
    }

    /// Claims the slot for a key: hit, leadership, or wait.
    fn claim(&self, key: &CacheKey) -> Claim {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(key) {
            Some(Slot::Ready(entry)) if entry.expires_at > Instant::now() => {
                return Claim::Hit(entry.score.clone());
            }
            Some(Slot::InFlight(receiver)) => {
                return Claim::Wait(receiver.clone());
            }
            _ => {}
        }
        let (sender, receiver) = watch::channel(None);
        slots.insert(key.clone(), Slot::InFlight(receiver));
        Claim::Lead(sender)
    }

    /// Returns true when the slot still belongs to the given leader channel.
    fn owns_slot(slot: Option<&Slot>, leader: &watch::Receiver<Option<TrustScore>>) -> bool {
        matches!(slot, Some(Slot::InFlight(receiver)) if receiver.same_channel(leader))
    }

    /// Publishes a computed score, writing back only when the slot still
    /// belongs to the leader (an invalidation during computation wins).
    fn publish(
        &self,
        key: &CacheKey,
        sender: &watch::Sender<Option<TrustScore>>,
        score: &TrustScore,
    ) {
        let leader = sender.subscribe();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if Self::owns_slot(slots.get(key), &leader) {
            slots.insert(
                key.clone(),
                Slot::Ready(ReadyEntry {
                    score: score.clone(),
                    expires_at: Instant::now() + self.ttl,
                }),
            );
        }
        drop(slots);
        let _ = sender.send(Some(score.clone()));
    }

    /// Abandons the leader's in-flight slot after failure or cancellation.
    fn abandon(&self, key: &CacheKey, leader: &watch::Receiver<Option<TrustScore>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if Self::owns_slot(slots.get(key), leader) {
            slots.remove(key);
        }
    }

    /// Returns the cached score or computes it exactly once across
    /// concurrent callers.
    ///
    /// The computation runs in the leader's task; if the leader is
    /// cancelled or fails, the slot is abandoned and a waiter retries as
    /// the new leader. Failed computations are never cached.
    ///
    /// # Errors
    ///
    /// Propagates the leader's computation error to the leader; waiters
    /// retry the computation themselves.
    pub async fn get_or_compute<F, Fut, E>(&self, key: CacheKey, compute: F) -> Result<TrustScore, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<TrustScore, E>>,
    {
        loop {
            match self.claim(&key) {
                Claim::Hit(score) => return Ok(score),
                Claim::Lead(sender) => {
                    let mut guard = AbandonGuard {
                        cache: self,
                        key: &key,
                        leader: sender.subscribe(),
                        armed: true,
                    };
                    let score = compute().await?;
                    guard.armed = false;
                    self.publish(&key, &sender, &score);
                    return Ok(score);
                }
                Claim::Wait(mut receiver) => {
                    // A closed channel means the leader abandoned the slot;
                    // loop and contend for leadership.
                    while receiver.changed().await.is_ok() {
                        let ready = receiver.borrow().clone();
                        if let Some(score) = ready {
                            return Ok(score);
                        }
                    }
                }
            }
        }
    }

    /// Removes every entry belonging to a product, in-flight slots
    /// included, so a pending computation cannot write back a score that
    /// predates the invalidation.
    pub fn invalidate_product(&self, product_id: &ProductId) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|key, _| key.product_id != *product_id);
    }

    /// Returns the number of ready entries currently cached.
    #[must_use]
    pub fn ready_len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }
}

// ============================================================================
// SECTION: Abandon Guard
// ============================================================================

/// Removes the leader's in-flight slot when it unwinds without publishing.
struct AbandonGuard<'a> {
    /// Cache owning the slot.
    cache: &'a ScoreCache,
    /// Key of the in-flight slot.
    key: &'a CacheKey,
    /// Channel identity of the leader.
    leader: watch::Receiver<Option<TrustScore>>,
    /// Whether the guard should abandon on drop.
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.abandon(self.key, &self.leader);
        }
    }
}
