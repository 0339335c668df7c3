// crates/lambda-secrets-harness/src/checks.rs
// ============================================================================
// Module: Secret Assertion Set
// Description: Independent checks over the shared probe response and plan.
// Purpose: Verify connectivity and each secret-delivery discipline.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Five read-only checks consume the single cached [`ProbeResponse`] and the
//! [`PlanResult`] variables. Each returns its own [`CheckFailure`], so one
//! failing secret never prevents the others from being evaluated.
//!
//! Comparison disciplines:
//! - `PLAIN`, multiline, and `BINARY` secrets compare as exact strings.
//! - `JSON` secrets compare structurally after decoding both sides.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::kind::SecretKind;
use crate::kind::type_field;
use crate::plan::PlanResult;
use crate::probe::ProbeResponse;
use crate::report::CheckOutcome;
use crate::report::SuiteReport;
use crate::session::SessionContext;

/// Status code a healthy target returns.
pub const EXPECTED_STATUS: u16 = 200;

// ============================================================================
// SECTION: Check Identifiers
// ============================================================================

/// Identifier of one check in the assertion set.
///
/// # Invariants
/// - Labels are stable and match the test names of the suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    /// Target answered with HTTP 200.
    Connectivity,
    /// Plain secret delivered verbatim.
    SecretPlain,
    /// JSON secret delivered with equal structure.
    SecretJson,
    /// Multiline secret delivered byte-for-byte.
    SecretMultiline,
    /// Binary secret delivered in its text-safe form.
    SecretBinary,
}

impl CheckId {
    /// Every check, in evaluation order.
    pub const ALL: [Self; 5] = [
        Self::Connectivity,
        Self::SecretPlain,
        Self::SecretJson,
        Self::SecretMultiline,
        Self::SecretBinary,
    ];

    /// Returns the stable label for the check.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::SecretPlain => "secret_plain",
            Self::SecretJson => "secret_json",
            Self::SecretMultiline => "secret_multiline",
            Self::SecretBinary => "secret_binary",
        }
    }

    /// Returns the secret case behind the check, if any.
    #[must_use]
    pub const fn secret_case(self) -> Option<&'static SecretCase> {
        match self {
            Self::Connectivity => None,
            Self::SecretPlain => Some(&PLAIN_SECRET),
            Self::SecretJson => Some(&JSON_SECRET),
            Self::SecretMultiline => Some(&MULTILINE_SECRET),
            Self::SecretBinary => Some(&BINARY_SECRET),
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Secret Cases
// ============================================================================

/// How a delivered value is compared with its provisioning variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Exact string equality, including embedded newlines.
    Exact,
    /// Equality of the decoded JSON documents.
    Structural,
}

/// One delivered secret and how to verify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretCase {
    /// Check that verifies this secret.
    pub check: CheckId,
    /// Response field carrying the delivered value.
    pub field: &'static str,
    /// Provisioning variable holding the expected value.
    pub variable: &'static str,
    /// Expected kind label in `<field>_TYPE`.
    pub kind: SecretKind,
    /// Comparison discipline.
    pub comparison: Comparison,
}

/// Plain text secret.
pub const PLAIN_SECRET: SecretCase = SecretCase {
    check: CheckId::SecretPlain,
    field: "LAMBDASECRETS_PLAIN",
    variable: "secret-plain",
    kind: SecretKind::Plain,
    comparison: Comparison::Exact,
};

/// JSON document secret.
pub const JSON_SECRET: SecretCase = SecretCase {
    check: CheckId::SecretJson,
    field: "LAMBDASECRETS_JSON",
    variable: "secret-json",
    kind: SecretKind::Json,
    comparison: Comparison::Structural,
};

/// Multiline plain text secret.
pub const MULTILINE_SECRET: SecretCase = SecretCase {
    check: CheckId::SecretMultiline,
    field: "LAMBDASECRETS_MULTILINE",
    variable: "secret-multiline",
    kind: SecretKind::Plain,
    comparison: Comparison::Exact,
};

/// Binary secret carried as base64 text.
pub const BINARY_SECRET: SecretCase = SecretCase {
    check: CheckId::SecretBinary,
    field: "LAMBDASECRETS_BINARY",
    variable: "secret-binary",
    kind: SecretKind::Binary,
    comparison: Comparison::Exact,
};

/// All delivered secrets, in evaluation order.
pub const SECRET_CASES: [SecretCase; 4] =
    [PLAIN_SECRET, JSON_SECRET, MULTILINE_SECRET, BINARY_SECRET];

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Side of a JSON comparison that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeSide {
    /// Value delivered by the target.
    Response,
    /// Value supplied as a provisioning variable.
    Plan,
}

impl fmt::Display for DecodeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Response => "response",
            Self::Plan => "plan variable",
        })
    }
}

/// Failure of a single check.
///
/// # Invariants
/// - Failures are isolated to the check that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    /// The target answered with an unexpected status code.
    #[error("status mismatch: expected {expected}, actual {actual}")]
    StatusMismatch {
        /// Expected status code.
        expected: u16,
        /// Observed status code.
        actual: u16,
    },
    /// A delivered value differs from its provisioning variable.
    #[error("value mismatch for `{field}`: expected {expected:?}, actual {actual:?}")]
    Mismatch {
        /// Response field.
        field: String,
        /// Expected value.
        expected: String,
        /// Delivered value.
        actual: String,
    },
    /// A delivered kind label differs from the expected kind.
    #[error("kind mismatch for `{field}`: expected {expected}, actual {actual:?}")]
    KindMismatch {
        /// Kind label field.
        field: String,
        /// Expected kind.
        expected: SecretKind,
        /// Delivered label.
        actual: String,
    },
    /// The response does not contain the field.
    #[error("response field `{field}` not found")]
    MissingField {
        /// Missing field.
        field: String,
    },
    /// The response field is not a string.
    #[error("response field `{field}` is not a string")]
    NotAString {
        /// Offending field.
        field: String,
    },
    /// The response body is not a JSON object.
    #[error("response body could not be decoded: {message}")]
    BodyDecode {
        /// Decoder message.
        message: String,
    },
    /// A JSON secret could not be decoded.
    #[error("`{field}` from the {side} is not valid json: {message}")]
    Decode {
        /// Response field being compared.
        field: String,
        /// Side that failed to decode.
        side: DecodeSide,
        /// Decoder message.
        message: String,
    },
    /// The plan does not supply the expected variable as a string.
    #[error("plan variable `{variable}` is missing or not a string")]
    MissingVariable {
        /// Variable name.
        variable: String,
    },
}

impl CheckFailure {
    /// Returns true for expected-versus-actual mismatches.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Self::StatusMismatch { .. } | Self::Mismatch { .. } | Self::KindMismatch { .. }
        )
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Checks that the target answered with HTTP 200.
///
/// # Errors
///
/// Returns [`CheckFailure::StatusMismatch`] for any other status.
pub fn check_connectivity(response: &ProbeResponse) -> Result<(), CheckFailure> {
    if response.status() == EXPECTED_STATUS {
        return Ok(());
    }
    Err(CheckFailure::StatusMismatch {
        expected: EXPECTED_STATUS,
        actual: response.status(),
    })
}

/// Checks the plain secret and its `PLAIN` label.
///
/// # Errors
///
/// Returns the first [`CheckFailure`] found for the plain secret.
pub fn check_secret_plain(response: &ProbeResponse, plan: &PlanResult) -> Result<(), CheckFailure> {
    check_secret(&PLAIN_SECRET, response, plan)
}

/// Checks the JSON secret structurally and its `JSON` label.
///
/// # Errors
///
/// Returns the first [`CheckFailure`] found for the JSON secret.
pub fn check_secret_json(response: &ProbeResponse, plan: &PlanResult) -> Result<(), CheckFailure> {
    check_secret(&JSON_SECRET, response, plan)
}

/// Checks the multiline secret byte-for-byte and its `PLAIN` label.
///
/// # Errors
///
/// Returns the first [`CheckFailure`] found for the multiline secret.
pub fn check_secret_multiline(
    response: &ProbeResponse,
    plan: &PlanResult,
) -> Result<(), CheckFailure> {
    check_secret(&MULTILINE_SECRET, response, plan)
}

/// Checks the binary secret text and its `BINARY` label.
///
/// # Errors
///
/// Returns the first [`CheckFailure`] found for the binary secret.
pub fn check_secret_binary(
    response: &ProbeResponse,
    plan: &PlanResult,
) -> Result<(), CheckFailure> {
    check_secret(&BINARY_SECRET, response, plan)
}

/// Checks one delivered secret: value first, then its kind label.
///
/// # Errors
///
/// Returns [`CheckFailure`] describing the first problem found.
pub fn check_secret(
    case: &SecretCase,
    response: &ProbeResponse,
    plan: &PlanResult,
) -> Result<(), CheckFailure> {
    let expected =
        plan.variable_str(case.variable).ok_or_else(|| CheckFailure::MissingVariable {
            variable: case.variable.to_string(),
        })?;
    let actual = response.field(case.field)?;

    let equal = match case.comparison {
        Comparison::Exact => actual == expected,
        Comparison::Structural => {
            decode_json(case.field, actual, DecodeSide::Response)?
                == decode_json(case.field, expected, DecodeSide::Plan)?
        }
    };
    if !equal {
        return Err(CheckFailure::Mismatch {
            field: case.field.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }

    let label_field = type_field(case.field);
    let label = response.field(&label_field)?;
    if label != case.kind.as_str() {
        return Err(CheckFailure::KindMismatch {
            field: label_field,
            expected: case.kind,
            actual: label.to_string(),
        });
    }
    Ok(())
}

/// Evaluates one check against a session context.
///
/// # Errors
///
/// Returns the [`CheckFailure`] produced by the check.
pub fn evaluate(check: CheckId, context: &SessionContext) -> Result<(), CheckFailure> {
    match check.secret_case() {
        None => check_connectivity(context.response()),
        Some(case) => check_secret(case, context.response(), context.plan()),
    }
}

/// Evaluates every check without short-circuiting.
#[must_use]
pub fn run_checks(context: &SessionContext) -> SuiteReport {
    let outcomes = CheckId::ALL
        .iter()
        .map(|check| CheckOutcome::from_result(*check, evaluate(*check, context)))
        .collect();
    SuiteReport::new(outcomes)
}

/// Decodes one side of a structural comparison.
fn decode_json(field: &str, text: &str, side: DecodeSide) -> Result<Value, CheckFailure> {
    serde_json::from_str(text).map_err(|err| CheckFailure::Decode {
        field: field.to_string(),
        side,
        message: err.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
