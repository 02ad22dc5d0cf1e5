// crates/veriscan-config/tests/weights_validation.rs
// ============================================================================
// Module: Weight Validation Tests
// Description: Sum-to-one enforcement, override validation, and budget bounds.
// Purpose: Ensure invalid configuration never reaches the engine.
// ============================================================================

//! Validation tests for weight tables and timeout budgets.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use veriscan_config::ConfigError;
use veriscan_config::EngineConfig;
use veriscan_core::CategoryId;
use veriscan_core::SignalWeights;

type TestResult = Result<(), String>;

/// Assert that a validation result is an error containing a specific substring.
fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Base Weight Validation
// ============================================================================

#[test]
fn default_config_is_valid() -> TestResult {
    let config = EngineConfig::default();
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn base_weights_not_summing_to_one_rejected() -> TestResult {
    let mut config = EngineConfig::default();
    config.weights = SignalWeights {
        authenticity: 0.30,
        tampering: 0.30,
        freshness: 0.25,
        social_proof: 0.25,
    };
    assert_invalid(config.validate(), "must sum to 1.0")?;
    Ok(())
}

#[test]
fn negative_weight_rejected() -> TestResult {
    let mut config = EngineConfig::default();
    config.weights = SignalWeights {
        authenticity: 1.30,
        tampering: -0.30,
        freshness: 0.0,
        social_proof: 0.0,
    };
    assert_invalid(config.validate(), "must be non-negative")?;
    Ok(())
}

#[test]
fn weight_sum_within_tolerance_accepted() -> TestResult {
    let mut config = EngineConfig::default();
    config.weights = SignalWeights {
        authenticity: 0.30,
        tampering: 0.30,
        freshness: 0.25,
        social_proof: 0.15 + 1e-12,
    };
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

// ============================================================================
// SECTION: Category Override Validation
// ============================================================================

#[test]
fn valid_category_override_accepted() -> TestResult {
    let mut config = EngineConfig::default();
    config.category_weights.insert(
        CategoryId::parse("electronics").map_err(|err| err.to_string())?,
        SignalWeights {
            authenticity: 0.50,
            tampering: 0.30,
            freshness: 0.05,
            social_proof: 0.15,
        },
    );
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn invalid_category_override_rejected_with_scope() -> TestResult {
    let mut config = EngineConfig::default();
    config.category_weights.insert(
        CategoryId::parse("groceries").map_err(|err| err.to_string())?,
        SignalWeights {
            authenticity: 0.50,
            tampering: 0.50,
            freshness: 0.50,
            social_proof: 0.50,
        },
    );
    assert_invalid(config.validate(), "groceries")?;
    Ok(())
}

#[test]
fn weights_for_falls_back_to_base() -> TestResult {
    let mut config = EngineConfig::default();
    let electronics = CategoryId::parse("electronics").map_err(|err| err.to_string())?;
    let override_weights = SignalWeights {
        authenticity: 0.50,
        tampering: 0.30,
        freshness: 0.05,
        social_proof: 0.15,
    };
    config.category_weights.insert(electronics.clone(), override_weights);

    let resolved = config.weights_for(Some(&electronics));
    if (resolved.authenticity - 0.50).abs() > 1e-12 {
        return Err("override not resolved".to_string());
    }

    let other = CategoryId::parse("toys").map_err(|err| err.to_string())?;
    let resolved = config.weights_for(Some(&other));
    if (resolved.authenticity - 0.30).abs() > 1e-12 {
        return Err("fallback not resolved".to_string());
    }

    let resolved = config.weights_for(None);
    if (resolved.authenticity - 0.30).abs() > 1e-12 {
        return Err("base not resolved".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Budget Validation
// ============================================================================

#[test]
fn zero_lookup_budget_rejected() -> TestResult {
    let mut config = EngineConfig::default();
    config.timeouts.lookup_ms = 0;
    assert_invalid(config.validate(), "timeouts.lookup_ms must be greater than zero")?;
    Ok(())
}

#[test]
fn zero_visual_budget_rejected() -> TestResult {
    let mut config = EngineConfig::default();
    config.timeouts.visual_ms = 0;
    assert_invalid(config.validate(), "timeouts.visual_ms must be greater than zero")?;
    Ok(())
}

#[test]
fn zero_cache_ttl_rejected() -> TestResult {
    let mut config = EngineConfig::default();
    config.cache_ttl_ms = 0;
    assert_invalid(config.validate(), "cache_ttl_ms must be greater than zero")?;
    Ok(())
}

#[test]
fn zero_outbox_capacity_rejected() -> TestResult {
    let mut config = EngineConfig::default();
    config.outbox_capacity = 0;
    assert_invalid(config.validate(), "outbox_capacity must be greater than zero")?;
    Ok(())
}

// ============================================================================
// SECTION: TOML Loading
// ============================================================================

#[test]
fn toml_round_trip_with_overrides() -> TestResult {
    let raw = r#"
        cache_ttl_ms = 1800000

        [weights]
        authenticity = 0.30
        tampering = 0.30
        freshness = 0.25
        social_proof = 0.15

        [timeouts]
        lookup_ms = 250
        visual_ms = 4000

        [category_weights.electronics]
        authenticity = 0.50
        tampering = 0.30
        freshness = 0.05
        social_proof = 0.15
    "#;

    let config = EngineConfig::from_toml(raw).map_err(|err| err.to_string())?;
    if config.cache_ttl_ms != 1_800_000 {
        return Err("cache_ttl_ms not parsed".to_string());
    }
    if config.timeouts.lookup_ms != 250 {
        return Err("lookup_ms not parsed".to_string());
    }
    if config.category_weights.len() != 1 {
        return Err("override not parsed".to_string());
    }
    Ok(())
}

#[test]
fn toml_with_bad_override_rejected_at_load() -> TestResult {
    let raw = r#"
        [category_weights.electronics]
        authenticity = 0.90
        tampering = 0.30
        freshness = 0.05
        social_proof = 0.15
    "#;

    match EngineConfig::from_toml(raw) {
        Err(error) => {
            if error.to_string().contains("electronics") {
                Ok(())
            } else {
                Err(format!("unexpected error: {error}"))
            }
        }
        Ok(_) => Err("expected load failure".to_string()),
    }
}

#[test]
fn load_reads_and_validates_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("veriscan.toml");
    std::fs::write(&path, "cache_ttl_ms = 60000\n").map_err(|err| err.to_string())?;

    let config = EngineConfig::load(&path).map_err(|err| err.to_string())?;
    if config.cache_ttl_ms != 60_000 {
        return Err("cache_ttl_ms not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    match EngineConfig::load(&dir.path().join("missing.toml")) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(error) => Err(format!("unexpected error: {error}")),
        Ok(_) => Err("expected io failure".to_string()),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    match EngineConfig::from_toml("weights = 3") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(error) => Err(format!("unexpected error: {error}")),
        Ok(_) => Err("expected parse failure".to_string()),
    }
}
