// crates/veriscan-providers/src/http.rs
// ============================================================================
// Module: HTTP Registry Strategy
// Description: Verification strategy backed by a manufacturer registry endpoint.
// Purpose: Provide registry attempts over HTTP with strict transport limits.
// Dependencies: veriscan-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The HTTP registry strategy issues bounded GET requests against a
//! manufacturer registry endpoint and converts the JSON response into a
//! verification attempt. It enforces scheme restrictions, host allowlists,
//! redirects disabled, and size limits to preserve fail-closed behavior:
//! any transport or parse failure surfaces as source unavailability, which
//! the cascade absorbs as an inconclusive attempt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use url::Url;
use veriscan_core::AttemptOutcome;
use veriscan_core::Confidence;
use veriscan_core::SourceError;
use veriscan_core::VerificationAttempt;
use veriscan_core::VerificationMethod;
use veriscan_core::VerificationRequest;
use veriscan_core::VerificationStrategy;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP registry strategy.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` URLs.
/// - `max_response_bytes` is enforced as a hard upper bound on response
///   bodies.
/// - If `allowed_hosts` is set, only listed hosts are permitted.
/// - URLs with embedded credentials are rejected.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpRegistryConfig {
    /// Registry endpoint URL; serial and batch are passed as query
    /// parameters.
    pub endpoint: String,
    /// Allow cleartext HTTP (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Optional host allowlist.
    #[serde(default)]
    pub allowed_hosts: Option<BTreeSet<String>>,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    500
}

/// Returns the default response size cap.
const fn default_max_response_bytes() -> usize {
    64 * 1024
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    "veriscan/0.1".to_string()
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// JSON body returned by the registry endpoint.
#[derive(Debug, Deserialize)]
struct RegistryResponse {
    /// Lookup outcome: `pass`, `fail`, or `inconclusive`.
    outcome: String,
    /// Confidence in the outcome.
    confidence: f64,
    /// Optional human-readable detail.
    detail: Option<String>,
}

// ============================================================================
// SECTION: Strategy Implementation
// ============================================================================

/// Verification strategy for manufacturer registry lookups over HTTP.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding configured limits fail closed.
pub struct HttpRegistryStrategy {
    /// Strategy configuration, including limits and policy.
    config: HttpRegistryConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpRegistryStrategy {
    /// Creates a new HTTP registry strategy with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the HTTP client cannot be created.
    pub fn new(config: HttpRegistryConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Builds and validates the lookup URL for one request.
    fn lookup_url(&self, request: &VerificationRequest) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.config.endpoint)
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;

        match url.scheme() {
            "https" => {}
            "http" if self.config.allow_http => {}
            scheme => {
                return Err(SourceError::Unavailable(format!("scheme not allowed: {scheme}")));
            }
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(SourceError::Unavailable(
                "embedded credentials are not allowed".to_string(),
            ));
        }
        let host = url
            .host_str()
            .ok_or_else(|| SourceError::Unavailable("endpoint has no host".to_string()))?;
        if let Some(allowed) = &self.config.allowed_hosts
            && !allowed.contains(host)
        {
            return Err(SourceError::Unavailable(format!("host not allowed: {host}")));
        }

        url.query_pairs_mut().append_pair("serial", request.serial.as_str());
        if let Some(batch) = &request.batch {
            url.query_pairs_mut().append_pair("batch", batch.as_str());
        }
        Ok(url)
    }

    /// Reads the response body up to the configured size cap.
    fn read_limited(&self, response: reqwest::blocking::Response) -> Result<Vec<u8>, SourceError> {
        let cap = self.config.max_response_bytes;
        let mut body = Vec::new();
        let mut limited = response.take(cap as u64 + 1);
        limited
            .read_to_end(&mut body)
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        if body.len() > cap {
            return Err(SourceError::Unavailable(format!("response exceeds {cap} bytes")));
        }
        Ok(body)
    }
}

impl VerificationStrategy for HttpRegistryStrategy {
    fn method(&self) -> VerificationMethod {
        VerificationMethod::Registry
    }

    fn attempt(&self, request: &VerificationRequest) -> Result<VerificationAttempt, SourceError> {
        let url = self.lookup_url(request)?;
        let response = self.client.get(url).send().map_err(|err| {
            if err.is_timeout() {
                SourceError::Timeout {
                    budget_ms: self.config.timeout_ms,
                }
            } else {
                SourceError::Unavailable(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "registry returned status {}",
                response.status().as_u16()
            )));
        }

        let body = self.read_limited(response)?;
        let parsed: RegistryResponse = serde_json::from_slice(&body)
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;

        let outcome = match parsed.outcome.as_str() {
            "pass" => AttemptOutcome::Pass,
            "fail" => AttemptOutcome::Fail,
            "inconclusive" => AttemptOutcome::Inconclusive,
            other => {
                return Err(SourceError::Unavailable(format!("unknown outcome: {other}")));
            }
        };
        let confidence = Confidence::new(parsed.confidence).ok_or_else(|| {
            SourceError::Unavailable(format!("confidence out of range: {}", parsed.confidence))
        })?;

        Ok(VerificationAttempt {
            method: VerificationMethod::Registry,
            outcome,
            confidence,
            detail: parsed.detail,
        })
    }
}
