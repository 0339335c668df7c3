// crates/lambda-secrets-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for the harness.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::CONTAINER_URL_OUTPUT;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Infrastructure declarations directory, relative to the base directory.
pub const DEFAULT_TERRAFORM_DIR: &str = "tests/terraform";
/// Provisioning tool binary resolved through `PATH`.
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";
/// Probe request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Infrastructure declarations directory override.
    TerraformDir,
    /// Base directory used to resolve a relative declarations directory.
    BaseDir,
    /// Provisioning tool binary override.
    TerraformBin,
    /// Optional variable file forwarded to plan/apply/destroy.
    VarFile,
    /// Plan output holding the probe URL.
    OutputName,
    /// Probe timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Apply the configuration before planning (`true`/`false` or `1`/`0`).
    Apply,
    /// Destroy the environment on teardown (`true`/`false` or `1`/`0`).
    Destroy,
    /// Stream plan output to the console (`true`/`false` or `1`/`0`).
    StreamPlan,
    /// Optional run root override for report artifacts.
    RunRoot,
}

impl HarnessEnv {
    /// Every configuration key, in load order.
    pub const ALL: [Self; 10] = [
        Self::TerraformDir,
        Self::BaseDir,
        Self::TerraformBin,
        Self::VarFile,
        Self::OutputName,
        Self::TimeoutSeconds,
        Self::Apply,
        Self::Destroy,
        Self::StreamPlan,
        Self::RunRoot,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TerraformDir => "LAMBDA_SECRETS_TEST_TERRAFORM_DIR",
            Self::BaseDir => "LAMBDA_SECRETS_TEST_BASE_DIR",
            Self::TerraformBin => "LAMBDA_SECRETS_TEST_TERRAFORM_BIN",
            Self::VarFile => "LAMBDA_SECRETS_TEST_VAR_FILE",
            Self::OutputName => "LAMBDA_SECRETS_TEST_OUTPUT_NAME",
            Self::TimeoutSeconds => "LAMBDA_SECRETS_TEST_TIMEOUT_SEC",
            Self::Apply => "LAMBDA_SECRETS_TEST_APPLY",
            Self::Destroy => "LAMBDA_SECRETS_TEST_DESTROY",
            Self::StreamPlan => "LAMBDA_SECRETS_TEST_STREAM_PLAN",
            Self::RunRoot => "LAMBDA_SECRETS_TEST_RUN_ROOT",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration.
///
/// # Invariants
/// - `timeout` is always greater than zero.
/// - `output_name` and `terraform_bin` are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Infrastructure declarations directory.
    pub terraform_dir: PathBuf,
    /// Base directory for a relative `terraform_dir`; current dir when unset.
    pub base_dir: Option<PathBuf>,
    /// Provisioning tool binary.
    pub terraform_bin: String,
    /// Optional variable file forwarded to the provisioning tool.
    pub var_file: Option<PathBuf>,
    /// Plan output holding the probe URL.
    pub output_name: String,
    /// Probe request timeout.
    pub timeout: Duration,
    /// Apply the configuration before planning.
    pub apply: bool,
    /// Destroy the environment on teardown.
    pub destroy: bool,
    /// Stream plan output instead of capturing it.
    pub stream_plan: bool,
    /// Optional run root override for report artifacts.
    pub run_root: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            terraform_dir: PathBuf::from(DEFAULT_TERRAFORM_DIR),
            base_dir: None,
            terraform_bin: DEFAULT_TERRAFORM_BIN.to_string(),
            var_file: None,
            output_name: CONTAINER_URL_OUTPUT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            apply: false,
            destroy: false,
            stream_plan: false,
            run_root: None,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from environment variables over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when an environment value is not valid
    /// UTF-8, is empty, or fails validation (for example, an invalid timeout
    /// or boolean value).
    pub fn load() -> Result<Self, HarnessError> {
        Self::load_env().map_err(HarnessError::Config)
    }

    /// Loads configuration, reporting failures as plain strings.
    fn load_env() -> Result<Self, String> {
        let defaults = Self::default();
        let terraform_dir = read_env_nonempty(HarnessEnv::TerraformDir.as_str())?
            .map_or(defaults.terraform_dir, PathBuf::from);
        let base_dir = read_env_nonempty(HarnessEnv::BaseDir.as_str())?.map(PathBuf::from);
        let terraform_bin = read_env_nonempty(HarnessEnv::TerraformBin.as_str())?
            .unwrap_or(defaults.terraform_bin);
        let var_file = read_env_nonempty(HarnessEnv::VarFile.as_str())?.map(PathBuf::from);
        let output_name =
            read_env_nonempty(HarnessEnv::OutputName.as_str())?.unwrap_or(defaults.output_name);
        let timeout = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?
            .unwrap_or(defaults.timeout);
        let apply = parse_bool_env(
            HarnessEnv::Apply.as_str(),
            read_env_nonempty(HarnessEnv::Apply.as_str())?,
        )?;
        let destroy = parse_bool_env(
            HarnessEnv::Destroy.as_str(),
            read_env_nonempty(HarnessEnv::Destroy.as_str())?,
        )?;
        let stream_plan = parse_bool_env(
            HarnessEnv::StreamPlan.as_str(),
            read_env_nonempty(HarnessEnv::StreamPlan.as_str())?,
        )?;
        let run_root = read_env_nonempty(HarnessEnv::RunRoot.as_str())?.map(PathBuf::from);
        Ok(Self {
            terraform_dir,
            base_dir,
            terraform_bin,
            var_file,
            output_name,
            timeout,
            apply,
            destroy,
            stream_plan,
            run_root,
        })
    }

    /// Returns the declarations directory resolved against the base directory.
    #[must_use]
    pub fn resolved_terraform_dir(&self) -> PathBuf {
        if self.terraform_dir.is_absolute() {
            return self.terraform_dir.clone();
        }
        self.base_dir.as_deref().unwrap_or_else(|| Path::new(".")).join(&self.terraform_dir)
    }

    /// Returns the probe timeout in whole milliseconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
pub(crate) fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable, defaulting to `false` when unset.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
