// crates/veriscan-engine/src/lib.rs
// ============================================================================
// Module: Veriscan Engine
// Description: Async trust-score aggregation over the core runtime logic.
// Purpose: Layer fan-out, timeouts, caching, and alerting on the pure core.
// Dependencies: veriscan-core, veriscan-config, tokio, tracing
// ============================================================================

//! ## Overview
//! The engine crate is the async edge of Veriscan: it fans out to the
//! signal sources with per-source timeout budgets, collapses concurrent
//! cache misses into single-flight computations, drains fraud alerts
//! through a bounded fire-and-forget outbox, and runs the duplicate-serial
//! monitor against the scan-history store.
//! Invariants:
//! - Collaborator traits stay synchronous; the engine wraps them in
//!   blocking tasks, so the core never depends on a runtime.
//! - A request always returns within the sum of the configured budgets
//!   plus a small fixed overhead.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod engine;
pub mod fingerprint;
pub mod outbox;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::cache::CacheKey;
pub use crate::cache::ScoreCache;
pub use crate::engine::EngineBuildError;
pub use crate::engine::EngineError;
pub use crate::engine::TrustEngine;
pub use crate::engine::TrustEngineBuilder;
pub use crate::fingerprint::Fingerprint;
pub use crate::fingerprint::FingerprintError;
pub use crate::fingerprint::fingerprint_request;
pub use crate::outbox::AlertOutbox;
