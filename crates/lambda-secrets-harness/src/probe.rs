// crates/lambda-secrets-harness/src/probe.rs
// ============================================================================
// Module: Target Probe
// Description: Single HTTP GET against the provisioned target.
// Purpose: Capture the status and JSON body the checks consume.
// Dependencies: reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`TargetProbe`] is the seam between the session fixture and HTTP
//! transport. [`HttpTargetProbe`] issues one unauthenticated GET with a
//! bounded timeout and does not follow redirects. Transport failures are
//! fatal [`HarnessError`]s; a timeout is reported as
//! [`HarnessError::Timeout`] so it stays distinct from a refused connection
//! or from a 200 with a wrong body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::checks::CheckFailure;
use crate::error::HarnessError;

/// User agent sent with probe requests.
const PROBE_USER_AGENT: &str = concat!("lambda-secrets-harness/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Probe Response
// ============================================================================

/// Snapshot of the single probe request.
///
/// # Invariants
/// - Immutable once captured.
/// - `fields` is decoded from `body` exactly once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Probed URL.
    url: String,
    /// HTTP status code.
    status: u16,
    /// Raw response body.
    body: String,
    /// Body decoded as a JSON object, or the decode failure.
    fields: Result<BTreeMap<String, Value>, String>,
}

impl ProbeResponse {
    /// Captures a response, decoding the body as a JSON object.
    #[must_use]
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let fields = serde_json::from_str::<BTreeMap<String, Value>>(&body)
            .map_err(|err| format!("response body is not a json object: {err}"));
        Self {
            url: url.into(),
            status,
            body,
            fields,
        }
    }

    /// Returns the probed URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the names of the decoded body fields.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields
            .as_ref()
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns a string field from the decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`CheckFailure::BodyDecode`] when the body is not a JSON
    /// object, [`CheckFailure::MissingField`] when the field is absent, and
    /// [`CheckFailure::NotAString`] when it holds a non-string value.
    pub fn field(&self, name: &str) -> Result<&str, CheckFailure> {
        let fields = self.fields.as_ref().map_err(|message| CheckFailure::BodyDecode {
            message: message.clone(),
        })?;
        let value = fields.get(name).ok_or_else(|| CheckFailure::MissingField {
            field: name.to_string(),
        })?;
        value.as_str().ok_or_else(|| CheckFailure::NotAString {
            field: name.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Probe Interface
// ============================================================================

/// Issues the single request against the target under test.
pub trait TargetProbe: Send + Sync {
    /// Fetches `url` and captures the response.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] or [`HarnessError::Timeout`] when
    /// no response is received.
    fn probe(&self, url: &str) -> Result<ProbeResponse, HarnessError>;
}

// ============================================================================
// SECTION: HTTP Probe
// ============================================================================

/// Blocking HTTP implementation of [`TargetProbe`].
///
/// # Invariants
/// - Redirects are not followed.
/// - `timeout` applies to the full request lifecycle.
#[derive(Debug, Clone)]
pub struct HttpTargetProbe {
    /// HTTP client used for the probe.
    client: Client,
    /// Configured request timeout.
    timeout: Duration,
}

impl HttpTargetProbe {
    /// Creates a probe with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, HarnessError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .user_agent(PROBE_USER_AGENT)
            .build()
            .map_err(|err| HarnessError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            timeout,
        })
    }

    /// Maps a reqwest failure onto the harness taxonomy.
    fn transport_error(&self, url: &str, err: &reqwest::Error) -> HarnessError {
        if err.is_timeout() {
            return HarnessError::Timeout {
                url: url.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        HarnessError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl TargetProbe for HttpTargetProbe {
    fn probe(&self, url: &str) -> Result<ProbeResponse, HarnessError> {
        let parsed = Url::parse(url).map_err(|err| HarnessError::Transport {
            url: url.to_string(),
            message: format!("invalid url: {err}"),
        })?;
        debug!(url = %parsed, "probing target");
        let response =
            self.client.get(parsed).send().map_err(|err| self.transport_error(url, &err))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|err| self.transport_error(url, &err))?;
        info!(url, status, body_bytes = body.len(), "target probe completed");
        Ok(ProbeResponse::new(url, status, body))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
