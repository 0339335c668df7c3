// crates/lambda-secrets-cli/src/main.rs
// ============================================================================
// Module: Lambda Secrets Verify Entry Point
// Description: One-shot runner for the secret-delivery checks.
// Purpose: Provision, probe once, print the five-check report, and exit.
// Dependencies: clap, lambda-secrets-harness, serde_jcs, thiserror, tracing
// ============================================================================

//! ## Overview
//! `lambda-secrets-verify` loads [`HarnessConfig`] from the environment,
//! applies command-line overrides, runs the session fixture, and prints the
//! report as text or canonical JSON. Logs go to stderr; the report goes to
//! stdout.
//!
//! Exit codes:
//! - `0` every check passed.
//! - `1` at least one check failed.
//! - `2` the session could not be set up (provisioning, missing output, or
//!   transport failure) or teardown failed.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use lambda_secrets_harness::HarnessConfig;
use lambda_secrets_harness::HarnessError;
use lambda_secrets_harness::Provisioner;
use lambda_secrets_harness::RunReporter;
use lambda_secrets_harness::SessionFixture;
use lambda_secrets_harness::SuiteReport;
use lambda_secrets_harness::TargetProbe;
use lambda_secrets_harness::run_checks;
use thiserror::Error;
use tracing::error;
use tracing::info;

/// Every check passed.
const EXIT_PASSED: u8 = 0;
/// At least one check failed.
const EXIT_FAILED: u8 = 1;
/// The session could not be established.
const EXIT_SETUP: u8 = 2;
/// Run name used for summary artifacts.
const RUN_NAME: &str = "lambda-secrets-verify";

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per check.
    Text,
    /// Canonical JSON report.
    Json,
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "lambda-secrets-verify",
    version,
    about = "Verify secrets delivered to a provisioned Lambda container"
)]
struct Cli {
    /// Terraform declarations directory, relative to the base directory.
    #[arg(long, value_name = "DIR")]
    terraform_dir: Option<PathBuf>,
    /// Base directory for relative declarations paths.
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,
    /// Terraform variable file forwarded to plan/apply/destroy.
    #[arg(long, value_name = "FILE")]
    var_file: Option<PathBuf>,
    /// Plan output holding the container URL.
    #[arg(long, value_name = "NAME")]
    output_name: Option<String>,
    /// Probe timeout in seconds.
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    /// Apply the configuration before planning.
    #[arg(long, action = ArgAction::SetTrue)]
    apply: bool,
    /// Destroy the environment after the checks.
    #[arg(long, action = ArgAction::SetTrue)]
    destroy: bool,
    /// Stream Terraform plan output to the console.
    #[arg(long, action = ArgAction::SetTrue)]
    stream_plan: bool,
    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Directory receiving `summary.json` and `summary.md`.
    #[arg(long, value_name = "DIR")]
    artifacts_dir: Option<PathBuf>,
}

impl Cli {
    /// Applies command-line overrides on top of environment configuration.
    fn apply_overrides(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(dir) = &self.terraform_dir {
            config.terraform_dir.clone_from(dir);
        }
        if let Some(dir) = &self.base_dir {
            config.base_dir = Some(dir.clone());
        }
        if let Some(file) = &self.var_file {
            config.var_file = Some(file.clone());
        }
        if let Some(name) = &self.output_name {
            config.output_name.clone_from(name);
        }
        if let Some(seconds) = self.timeout_secs {
            config.timeout = Duration::from_secs(seconds);
        }
        if let Some(dir) = &self.artifacts_dir {
            config.run_root = Some(dir.clone());
        }
        config.apply |= self.apply;
        config.destroy |= self.destroy;
        config.stream_plan |= self.stream_plan;
        config
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure mapped to [`EXIT_SETUP`].
#[derive(Debug, Error)]
enum CliError {
    /// Configuration, session, teardown, or artifact failure.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// Report could not be encoded.
    #[error("failed to encode report: {0}")]
    Encode(String),
    /// Writing to stdout failed.
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "verification aborted");
            let _ = writeln!(std::io::stderr(), "error: {err}");
            EXIT_SETUP
        }
    };
    ExitCode::from(code)
}

/// Installs the stderr fmt subscriber, defaulting to `info`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Loads configuration, builds the Terraform fixture, and verifies.
fn run(cli: &Cli) -> Result<u8, CliError> {
    let config = cli.apply_overrides(HarnessConfig::load()?);
    info!(
        dir = %config.resolved_terraform_dir().display(),
        timeout_ms = config.timeout_ms(),
        apply = config.apply,
        destroy = config.destroy,
        "starting verification"
    );
    let fixture = SessionFixture::from_config(&config)?;
    let mut reporter = config
        .run_root
        .as_deref()
        .map(|root| RunReporter::new(RUN_NAME, Some(root)))
        .transpose()?;
    verify(&fixture, cli.format, reporter.as_mut(), &mut std::io::stdout().lock())
}

/// Runs the checks against `fixture`, writes the report, and tears down.
fn verify<P: Provisioner, T: TargetProbe>(
    fixture: &SessionFixture<P, T>,
    format: OutputFormat,
    reporter: Option<&mut RunReporter>,
    out: &mut impl Write,
) -> Result<u8, CliError> {
    let context = match fixture.context() {
        Ok(context) => context,
        Err(err) => {
            if let Err(teardown) = fixture.teardown() {
                error!(error = %teardown, "teardown failed");
            }
            if let Some(reporter) = reporter {
                reporter.abort("error", err.to_string())?;
            }
            return Err(err.into());
        }
    };

    let report = run_checks(context);
    let published = publish(&report, format, reporter, out);
    let torn_down = fixture.teardown();
    published?;
    torn_down?;

    let failed = report.failures().count();
    info!(passed = report.outcomes().len() - failed, failed, "verification finished");
    Ok(if report.all_passed() { EXIT_PASSED } else { EXIT_FAILED })
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes the report to `out` and the run summary to `reporter`.
fn publish(
    report: &SuiteReport,
    format: OutputFormat,
    reporter: Option<&mut RunReporter>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    write_report(report, format, out)?;
    if let Some(reporter) = reporter {
        reporter.finish(report)?;
    }
    Ok(())
}

/// Writes the report in the requested format.
fn write_report(
    report: &SuiteReport,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => out.write_all(render_text(report).as_bytes())?,
        OutputFormat::Json => {
            let json =
                serde_jcs::to_string(report).map_err(|err| CliError::Encode(err.to_string()))?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Renders one line per check followed by a pass count.
fn render_text(report: &SuiteReport) -> String {
    let mut text = String::new();
    for outcome in report.outcomes() {
        let label = if outcome.passed() { "PASS" } else { "FAIL" };
        text.push_str(&format!("{label} {}", outcome.check));
        if let Some(detail) = &outcome.detail {
            text.push_str(&format!(": {detail}"));
        }
        text.push('\n');
    }
    let passed = report.outcomes().iter().filter(|outcome| outcome.passed()).count();
    text.push_str(&format!("{passed}/{} checks passed\n", report.outcomes().len()));
    text
}
