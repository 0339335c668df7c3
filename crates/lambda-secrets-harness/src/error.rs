// crates/lambda-secrets-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Session-level error taxonomy for the secret-delivery harness.
// Purpose: Separate fatal session failures from per-check failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`HarnessError`] covers every failure that aborts a session: configuration,
//! provisioning, missing plan outputs, and probe transport failures.
//! Per-assertion failures live in [`crate::checks::CheckFailure`] and never
//! abort the session.
//!
//! The error is `Clone` so a memoized setup failure can be reported by every
//! test that enters the fixture.

use thiserror::Error;

/// Fatal harness errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never embed secret values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or failed validation.
    #[error("invalid harness configuration: {0}")]
    Config(String),
    /// The provisioning tool failed to initialize, plan, apply, or destroy.
    #[error("provisioning failed during {step}: {message}")]
    Provisioning {
        /// Provisioning step that failed (`init`, `plan`, `show`, ...).
        step: String,
        /// Failure description, usually tool stderr.
        message: String,
    },
    /// The plan result does not expose the requested output.
    #[error("plan output `{0}` is missing")]
    MissingOutput(String),
    /// The plan output exists but cannot be used as a probe URL.
    #[error("plan output `{name}` is not a usable url: {message}")]
    InvalidOutput {
        /// Output name.
        name: String,
        /// Validation failure description.
        message: String,
    },
    /// The probe request failed before a response was received.
    #[error("probe transport failure for {url}: {message}")]
    Transport {
        /// Probed URL.
        url: String,
        /// Transport failure description.
        message: String,
    },
    /// The probe request exceeded the configured timeout.
    #[error("probe timed out after {timeout_ms}ms for {url}")]
    Timeout {
        /// Probed URL.
        url: String,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },
    /// Run artifacts could not be written.
    #[error("report artifact failure: {0}")]
    Report(String),
}

impl HarnessError {
    /// Builds a provisioning error for the named step.
    pub(crate) fn provisioning(step: &str, message: impl Into<String>) -> Self {
        Self::Provisioning {
            step: step.to_string(),
            message: message.into(),
        }
    }

    /// Returns true when the error originates from the probe transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}
