// crates/lambda-secrets-harness/src/plan.rs
// ============================================================================
// Module: Plan Result
// Description: Immutable plan outputs and provisioning variables.
// Purpose: Decode the provisioning tool's machine-readable plan.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`PlanResult`] is decoded once per session from `terraform show -json`
//! and then shared read-only with every check.
//!
//! Outputs come from `planned_values.outputs`; outputs only present in
//! `output_changes` fall back to their known `after` value. Outputs that are
//! unknown until apply are absent.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Plan Result
// ============================================================================

/// Outputs and variables of a computed plan.
///
/// # Invariants
/// - Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanResult {
    /// Output name to planned value.
    pub outputs: BTreeMap<String, Value>,
    /// Variable name to the value supplied at provisioning time.
    pub variables: BTreeMap<String, Value>,
}

impl PlanResult {
    /// Builds a plan result from explicit maps.
    #[must_use]
    pub const fn new(outputs: BTreeMap<String, Value>, variables: BTreeMap<String, Value>) -> Self {
        Self {
            outputs,
            variables,
        }
    }

    /// Decodes the JSON document produced by `terraform show -json <planfile>`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provisioning`] when the document is not valid
    /// plan JSON.
    pub fn from_show_json(bytes: &[u8]) -> Result<Self, HarnessError> {
        let doc: ShowDocument = serde_json::from_slice(bytes)
            .map_err(|err| HarnessError::provisioning("show", format!("invalid plan json: {err}")))?;

        let variables = doc
            .variables
            .into_iter()
            .map(|(name, variable)| (name, variable.value))
            .collect();

        let mut outputs: BTreeMap<String, Value> = doc
            .planned_values
            .map(|values| values.outputs)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, output)| output.value.map(|value| (name, value)))
            .collect();
        for (name, change) in doc.output_changes {
            if outputs.contains_key(&name) {
                continue;
            }
            if let Some(after) = change.known_after() {
                outputs.insert(name, after);
            }
        }

        Ok(Self {
            outputs,
            variables,
        })
    }

    /// Returns an output value.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    /// Returns a string output.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MissingOutput`] when the output is absent and
    /// [`HarnessError::InvalidOutput`] when it is not a string.
    pub fn output_str(&self, name: &str) -> Result<&str, HarnessError> {
        let value = self.output(name).ok_or_else(|| HarnessError::MissingOutput(name.to_string()))?;
        value.as_str().ok_or_else(|| HarnessError::InvalidOutput {
            name: name.to_string(),
            message: "value is not a string".to_string(),
        })
    }

    /// Returns a provisioning variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Returns a provisioning variable when it holds a string.
    #[must_use]
    pub fn variable_str(&self, name: &str) -> Option<&str> {
        self.variable(name).and_then(Value::as_str)
    }
}

// ============================================================================
// SECTION: Plan JSON Shape
// ============================================================================

/// Subset of the `terraform show -json` plan representation.
#[derive(Debug, Deserialize)]
struct ShowDocument {
    /// Root module input variables.
    #[serde(default)]
    variables: BTreeMap<String, ShowVariable>,
    /// Planned state values.
    #[serde(default)]
    planned_values: Option<PlannedValues>,
    /// Per-output change records.
    #[serde(default)]
    output_changes: BTreeMap<String, OutputChange>,
}

/// Input variable entry.
#[derive(Debug, Deserialize)]
struct ShowVariable {
    /// Supplied value.
    #[serde(default)]
    value: Value,
}

/// Planned values section.
#[derive(Debug, Deserialize)]
struct PlannedValues {
    /// Root module outputs.
    #[serde(default)]
    outputs: BTreeMap<String, PlannedOutput>,
}

/// Planned output entry; `value` is absent while unknown.
#[derive(Debug, Deserialize)]
struct PlannedOutput {
    /// Known planned value.
    #[serde(default)]
    value: Option<Value>,
}

/// Output change record.
#[derive(Debug, Deserialize)]
struct OutputChange {
    /// Value after the change, `null` while unknown.
    #[serde(default)]
    after: Option<Value>,
    /// `true` when the after value is only known after apply.
    #[serde(default)]
    after_unknown: Value,
}

impl OutputChange {
    /// Returns the after value when it is known at plan time.
    fn known_after(self) -> Option<Value> {
        if self.after_unknown == Value::Bool(true) {
            return None;
        }
        self.after.filter(|value| !value.is_null())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
