// crates/lambda-secrets-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for the secret-delivery harness.
// Purpose: Provide typed access to harness settings and defaults.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables and mapped into a
//! small typed structure shared by the fixture, the CLI, and the system tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::DEFAULT_TERRAFORM_BIN;
pub use env::DEFAULT_TERRAFORM_DIR;
pub use env::DEFAULT_TIMEOUT;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::read_env_strict;
