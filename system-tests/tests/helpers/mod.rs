// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for the secret-delivery system-tests.
// Purpose: Provide the target stub, counting collaborators, and reporters.
// Dependencies: lambda-secrets-harness, axum, tokio
// ============================================================================

//! ## Overview
//! Shared helpers for the contract suites. The target stub speaks real HTTP,
//! so suites exercise the production probe end to end.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod spies;
pub mod target_stub;
