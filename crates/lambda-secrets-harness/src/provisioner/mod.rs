// crates/lambda-secrets-harness/src/provisioner/mod.rs
// ============================================================================
// Module: Environment Provisioner
// Description: Seam to the external infrastructure-as-code tool.
// Purpose: Prepare, plan, and optionally apply or destroy the test environment.
// Dependencies: crate::plan
// ============================================================================

//! ## Overview
//! The provisioning tool is an opaque collaborator. The harness only needs
//! [`Provisioner::setup`] and [`Provisioner::plan`]; `apply` and `destroy`
//! are opt-in lifecycle steps driven by configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod terraform;


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use terraform::TerraformProvisioner;

use crate::error::HarnessError;
use crate::plan::PlanResult;

// ============================================================================
// SECTION: Provisioner Interface
// ============================================================================

/// Infrastructure provisioning backend.
pub trait Provisioner: Send + Sync {
    /// Prepares the tool's working state.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provisioning`] when the tool cannot initialize.
    fn setup(&self) -> Result<(), HarnessError>;

    /// Computes a plan without applying changes.
    ///
    /// When `capture_output` is false the tool's human-readable output is
    /// streamed to the console instead of being captured.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provisioning`] when planning fails or the plan
    /// cannot be decoded.
    fn plan(&self, capture_output: bool) -> Result<PlanResult, HarnessError>;

    /// Applies the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provisioning`] when apply fails.
    fn apply(&self) -> Result<(), HarnessError> {
        Ok(())
    }

    /// Destroys the environment.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provisioning`] when destroy fails.
    fn destroy(&self) -> Result<(), HarnessError> {
        Ok(())
    }
}
