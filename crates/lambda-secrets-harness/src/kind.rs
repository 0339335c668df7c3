// crates/lambda-secrets-harness/src/kind.rs
// ============================================================================
// Module: Secret Encoding Kinds
// Description: Encoding disciplines for delivered secrets.
// Purpose: Label delivered secrets and fix the binary text encoding.
// Dependencies: base64, serde, serde_json
// ============================================================================

//! ## Overview
//! Every delivered secret is accompanied by a `<NAME>_TYPE` field naming its
//! [`SecretKind`]. Multiline plaintext is labelled `PLAIN`. Binary secrets
//! travel over JSON as standard padded base64 text.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Suffix of the response field carrying a secret's kind label.
pub const TYPE_FIELD_SUFFIX: &str = "_TYPE";

/// Encoding discipline of a delivered secret.
///
/// # Invariants
/// - Labels returned by [`SecretKind::as_str`] are stable wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecretKind {
    /// Plain text, including multiline text.
    Plain,
    /// Text holding a JSON document.
    Json,
    /// Binary payload carried as base64 text.
    Binary,
}

impl SecretKind {
    /// Returns the wire label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Json => "JSON",
            Self::Binary => "BINARY",
        }
    }

    /// Classifies a raw secret the way the delivering extension labels it.
    ///
    /// Binary payloads are `BINARY`; text that decodes to a JSON object or
    /// array is `JSON`; everything else, including bare JSON scalars, is
    /// `PLAIN`.
    #[must_use]
    pub fn classify(payload: &SecretPayload<'_>) -> Self {
        match payload {
            SecretPayload::Binary(_) => Self::Binary,
            SecretPayload::Text(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(_) | Value::Array(_)) => Self::Json,
                _ => Self::Plain,
            },
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown kind label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown secret kind label `{0}`")]
pub struct UnknownSecretKind(pub String);

impl FromStr for SecretKind {
    type Err = UnknownSecretKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PLAIN" => Ok(Self::Plain),
            "JSON" => Ok(Self::Json),
            "BINARY" => Ok(Self::Binary),
            other => Err(UnknownSecretKind(other.to_string())),
        }
    }
}

/// Raw secret value as stored by the secret backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretPayload<'a> {
    /// String secret.
    Text(&'a str),
    /// Binary secret.
    Binary(&'a [u8]),
}

impl SecretPayload<'_> {
    /// Returns the text-safe representation delivered over JSON.
    #[must_use]
    pub fn delivered_text(&self) -> String {
        match self {
            Self::Text(text) => (*text).to_string(),
            Self::Binary(bytes) => encode_binary(bytes),
        }
    }
}

/// Returns the response field name carrying the kind label for `field`.
#[must_use]
pub fn type_field(field: &str) -> String {
    format!("{field}{TYPE_FIELD_SUFFIX}")
}

/// Encodes binary secret bytes into their delivered text form.
#[must_use]
pub fn encode_binary(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decodes the delivered text form of a binary secret.
///
/// # Errors
///
/// Returns [`base64::DecodeError`] when the text is not standard padded base64.
pub fn decode_binary(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(text)
}
