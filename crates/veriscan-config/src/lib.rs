// crates/veriscan-config/src/lib.rs
// ============================================================================
// Module: Veriscan Configuration
// Description: Immutable engine configuration with load-time validation.
// Purpose: Enforce weight and budget invariants once, never at request time.
// Dependencies: serde, thiserror, toml, veriscan-core
// ============================================================================

//! ## Overview
//! Engine configuration is an immutable snapshot validated at load time:
//! signal weight tables (base plus per-category overrides) must sum to 1.0,
//! timeout budgets and cache TTLs must be positive. A configuration that
//! fails validation never reaches the engine, so weight errors are fatal at
//! startup and impossible at request time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use veriscan_core::CategoryId;
use veriscan_core::SignalWeights;
use veriscan_core::core::score::WEIGHT_SUM_TOLERANCE;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default budget for cheap lookups (registry, ledger, freshness, social
/// proof, scan history), in milliseconds.
const DEFAULT_LOOKUP_BUDGET_MS: u64 = 500;
/// Default budget for visual and OCR calls, in milliseconds.
const DEFAULT_VISUAL_BUDGET_MS: u64 = 5_000;
/// Default trust-score cache TTL, in milliseconds (1 hour).
const DEFAULT_CACHE_TTL_MS: u64 = 60 * 60 * 1_000;
/// Default alert outbox capacity.
const DEFAULT_OUTBOX_CAPACITY: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors, fatal at load time.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A weight table does not sum to 1.0.
    #[error("weights for {scope} must sum to 1.0 (got {sum})")]
    WeightSum {
        /// Scope name: `base` or the category identifier.
        scope: String,
        /// Actual weight sum.
        sum: f64,
    },
    /// A weight is negative.
    #[error("weights for {scope} must be non-negative")]
    NegativeWeight {
        /// Scope name: `base` or the category identifier.
        scope: String,
    },
    /// A timeout budget is zero.
    #[error("{field} must be greater than zero")]
    ZeroBudget {
        /// Field name for the rejected budget.
        field: &'static str,
    },
}

// ============================================================================
// SECTION: Timeout Budgets
// ============================================================================

/// Per-source timeout budgets.
///
/// # Invariants
/// - All budgets are positive; the aggregator always returns within the
///   sum of configured budgets plus a small fixed overhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimeoutBudgets {
    /// Budget for cheap lookups, in milliseconds.
    #[serde(default = "default_lookup_budget_ms")]
    pub lookup_ms: u64,
    /// Budget for visual and OCR calls, in milliseconds.
    #[serde(default = "default_visual_budget_ms")]
    pub visual_ms: u64,
}

/// Returns the default cheap-lookup budget.
const fn default_lookup_budget_ms() -> u64 {
    DEFAULT_LOOKUP_BUDGET_MS
}

/// Returns the default visual-call budget.
const fn default_visual_budget_ms() -> u64 {
    DEFAULT_VISUAL_BUDGET_MS
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            lookup_ms: DEFAULT_LOOKUP_BUDGET_MS,
            visual_ms: DEFAULT_VISUAL_BUDGET_MS,
        }
    }
}

// ============================================================================
// SECTION: Engine Config
// ============================================================================

/// Immutable Veriscan engine configuration.
///
/// # Invariants
/// - `validate` has been called before the configuration reaches the
///   engine; every weight table sums to 1.0 and every budget is positive.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Base signal weights applied when no category override matches.
    #[serde(default)]
    pub weights: SignalWeights,
    /// Per-category weight overrides.
    #[serde(default)]
    pub category_weights: BTreeMap<CategoryId, SignalWeights>,
    /// Per-source timeout budgets.
    #[serde(default)]
    pub timeouts: TimeoutBudgets,
    /// Trust-score cache TTL, in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    /// Alert outbox capacity.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

/// Returns the default cache TTL.
const fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

/// Returns the default outbox capacity.
const fn default_outbox_capacity() -> usize {
    DEFAULT_OUTBOX_CAPACITY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: SignalWeights::BASE,
            category_weights: BTreeMap::new(),
            timeouts: TimeoutBudgets::default(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_toml(&raw)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every invariant of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weights("base", &self.weights)?;
        for (category, weights) in &self.category_weights {
            validate_weights(category.as_str(), weights)?;
        }
        if self.timeouts.lookup_ms == 0 {
            return Err(ConfigError::ZeroBudget {
                field: "timeouts.lookup_ms",
            });
        }
        if self.timeouts.visual_ms == 0 {
            return Err(ConfigError::ZeroBudget {
                field: "timeouts.visual_ms",
            });
        }
        if self.cache_ttl_ms == 0 {
            return Err(ConfigError::ZeroBudget {
                field: "cache_ttl_ms",
            });
        }
        if self.outbox_capacity == 0 {
            return Err(ConfigError::ZeroBudget {
                field: "outbox_capacity",
            });
        }
        Ok(())
    }

    /// Returns the weight table for a category, falling back to the base
    /// table when no override exists.
    #[must_use]
    pub fn weights_for(&self, category: Option<&CategoryId>) -> &SignalWeights {
        category
            .and_then(|category| self.category_weights.get(category))
            .unwrap_or(&self.weights)
    }
}

/// Validates one weight table against the sum and sign invariants.
fn validate_weights(scope: &str, weights: &SignalWeights) -> Result<(), ConfigError> {
    if [
        weights.authenticity,
        weights.tampering,
        weights.freshness,
        weights.social_proof,
    ]
    .iter()
    .any(|weight| *weight < 0.0 || !weight.is_finite())
    {
        return Err(ConfigError::NegativeWeight {
            scope: scope.to_string(),
        });
    }
    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::WeightSum {
            scope: scope.to_string(),
            sum,
        });
    }
    Ok(())
}
