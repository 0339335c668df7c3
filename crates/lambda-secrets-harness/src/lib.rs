// crates/lambda-secrets-harness/src/lib.rs
// ============================================================================
// Module: Lambda Secrets Harness Library
// Description: Secret-delivery verification harness for provisioned Lambdas.
// Purpose: Provision once, probe once, and check delivered secrets.
// Dependencies: reqwest, serde, serde_jcs, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate verifies that secrets supplied as provisioning variables reach a
//! remote execution environment intact. A [`SessionFixture`] composes two
//! explicit steps, [`Provisioner::plan`] and [`TargetProbe::probe`], memoizes
//! their results for the whole test session, and hands the resulting
//! [`SessionContext`] to the check functions in [`checks`].
//!
//! Provisioning and HTTP transport are external collaborators reached through
//! the [`Provisioner`] and [`TargetProbe`] traits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod checks;
pub mod config;
pub mod error;
pub mod kind;
pub mod plan;
pub mod probe;
pub mod provisioner;
pub mod report;
pub mod session;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use checks::CheckFailure;
pub use checks::CheckId;
pub use checks::SecretCase;
pub use checks::run_checks;
pub use config::HarnessConfig;
pub use error::HarnessError;
pub use kind::SecretKind;
pub use plan::PlanResult;
pub use probe::HttpTargetProbe;
pub use probe::ProbeResponse;
pub use probe::TargetProbe;
pub use provisioner::Provisioner;
pub use provisioner::TerraformProvisioner;
pub use report::CheckOutcome;
pub use report::CheckStatus;
pub use report::RunArtifacts;
pub use report::RunReporter;
pub use report::SuiteReport;
pub use session::SessionContext;
pub use session::SessionFixture;

/// Plan output holding the URL of the Lambda container under test.
pub const CONTAINER_URL_OUTPUT: &str = "lambda-container-url";
