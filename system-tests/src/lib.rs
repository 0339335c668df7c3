// system-tests/src/lib.rs
// ============================================================================
// Module: Lambda Secrets System Tests Library
// Description: Shared configuration for the system-test binaries.
// Purpose: Resolve the live harness configuration against this crate.
// Dependencies: lambda-secrets-harness
// ============================================================================

//! ## Overview
//! The live suite runs Terraform against the declarations shipped in
//! `system-tests/tests/terraform`. Relative declaration paths resolve against
//! this crate's manifest directory unless `LAMBDA_SECRETS_TEST_BASE_DIR`
//! points somewhere else.

use std::path::Path;
use std::path::PathBuf;

use lambda_secrets_harness::HarnessConfig;
use lambda_secrets_harness::HarnessError;
use lambda_secrets_harness::config::DEFAULT_TERRAFORM_DIR;

/// Manifest directory of this crate.
const MANIFEST_DIR: &str = env!("CARGO_MANIFEST_DIR");

/// Returns the base directory used for relative declaration paths.
#[must_use]
pub fn default_base_dir() -> &'static Path {
    Path::new(MANIFEST_DIR)
}

/// Returns the bundled Terraform declarations directory.
#[must_use]
pub fn bundled_declarations_dir() -> PathBuf {
    default_base_dir().join(DEFAULT_TERRAFORM_DIR)
}

/// Loads harness configuration for the live suite.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] when an environment override is invalid.
pub fn live_config() -> Result<HarnessConfig, HarnessError> {
    let mut config = HarnessConfig::load()?;
    if config.base_dir.is_none() {
        config.base_dir = Some(default_base_dir().to_path_buf());
    }
    Ok(config)
}
