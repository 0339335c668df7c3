// crates/lambda-secrets-harness/src/report.rs
// ============================================================================
// Module: Suite Reports
// Description: Per-check outcomes and run summary artifacts.
// Purpose: Render the five-check report and persist deterministic summaries.
// Dependencies: serde, serde_jcs, tracing
// ============================================================================

//! ## Overview
//! [`SuiteReport`] collects one [`CheckOutcome`] per check. [`RunArtifacts`]
//! owns a run root directory and writes canonical JSON and Markdown files
//! into it; [`RunReporter`] adds a summary that is written even when the run
//! ends without an explicit finish.
//!
//! Invariants:
//! - JSON artifacts are serialized with JCS, so identical reports produce
//!   identical bytes.
//! - Outcomes keep evaluation order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tracing::debug;

use crate::checks::CheckFailure;
use crate::checks::CheckId;
use crate::error::HarnessError;

/// Default parent directory for run roots.
pub const DEFAULT_RUN_PARENT: &str = "target/system-tests";
/// Summary JSON file name.
pub const SUMMARY_JSON: &str = "summary.json";
/// Summary Markdown file name.
pub const SUMMARY_MARKDOWN: &str = "summary.md";

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Pass or fail state of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The check passed.
    Pass,
    /// The check failed.
    Fail,
}

impl CheckStatus {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Result of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Check that was evaluated.
    pub check: CheckId,
    /// Pass or fail.
    pub status: CheckStatus,
    /// Failure description with expected and actual values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Structured failure, kept for programmatic inspection.
    #[serde(skip)]
    pub failure: Option<CheckFailure>,
}

impl CheckOutcome {
    /// Builds an outcome from a check result.
    #[must_use]
    pub fn from_result(check: CheckId, result: Result<(), CheckFailure>) -> Self {
        match result {
            Ok(()) => Self {
                check,
                status: CheckStatus::Pass,
                detail: None,
                failure: None,
            },
            Err(failure) => Self {
                check,
                status: CheckStatus::Fail,
                detail: Some(failure.to_string()),
                failure: Some(failure),
            },
        }
    }

    /// Returns true when the check passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// Ordered outcomes for one suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Outcomes in evaluation order.
    outcomes: Vec<CheckOutcome>,
}

impl SuiteReport {
    /// Wraps evaluated outcomes.
    #[must_use]
    pub const fn new(outcomes: Vec<CheckOutcome>) -> Self {
        Self {
            outcomes,
        }
    }

    /// Returns every outcome.
    #[must_use]
    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    /// Returns the outcome for `check`, if it was evaluated.
    #[must_use]
    pub fn outcome(&self, check: CheckId) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|outcome| outcome.check == check)
    }

    /// Returns true when every check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }

    /// Returns the failing outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    /// Returns the overall status label.
    #[must_use]
    pub fn status(&self) -> CheckStatus {
        if self.all_passed() { CheckStatus::Pass } else { CheckStatus::Fail }
    }

    /// Renders the report as Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Secret Delivery Report\n\n## Checks\n\n");
        for outcome in &self.outcomes {
            let _ = write!(out, "- {}: {}", outcome.check, outcome.status.as_str());
            if let Some(detail) = &outcome.detail {
                let _ = write!(out, " ({detail})");
            }
            out.push('\n');
        }
        let passed = self.outcomes.iter().filter(|outcome| outcome.passed()).count();
        let _ = write!(out, "\n## Result\n\n- Passed: {passed}/{}\n", self.outcomes.len());
        out
    }
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact directory for a single run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// Run root directory.
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates the run root, defaulting to
    /// `target/system-tests/run_<ms>/<name>` when no root is configured.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Report`] when the directory cannot be created.
    pub fn new(name: &str, run_root: Option<&Path>) -> Result<Self, HarnessError> {
        let root = run_root.map_or_else(|| default_run_root(name), Path::to_path_buf);
        fs::create_dir_all(&root).map_err(|err| {
            HarnessError::Report(format!("failed to create {}: {err}", root.display()))
        })?;
        Ok(Self {
            root,
        })
    }

    /// Returns the run root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Report`] on serialization or I/O failure.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, HarnessError> {
        let bytes = serde_jcs::to_vec(value)
            .map_err(|err| HarnessError::Report(format!("failed to encode {name}: {err}")))?;
        self.write_bytes(name, &bytes)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Report`] on I/O failure.
    pub fn write_text(&self, name: &str, value: &str) -> Result<PathBuf, HarnessError> {
        self.write_bytes(name, value.as_bytes())
    }

    /// Writes raw bytes under the run root.
    fn write_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, HarnessError> {
        let path = self.root.join(name);
        fs::write(&path, bytes).map_err(|err| {
            HarnessError::Report(format!("failed to write {}: {err}", path.display()))
        })?;
        debug!(path = %path.display(), "artifact written");
        Ok(path)
    }
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Serialized shape of `summary.json`.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    /// Run name.
    run_name: &'a str,
    /// Overall status label.
    status: &'a str,
    /// Start timestamp in unix milliseconds.
    started_at_ms: u64,
    /// End timestamp in unix milliseconds.
    ended_at_ms: u64,
    /// Elapsed milliseconds.
    duration_ms: u64,
    /// Check outcomes, empty when the run aborted.
    checks: &'a [CheckOutcome],
    /// Free-form notes.
    notes: &'a [String],
}

/// Writes `summary.json` and `summary.md`, even when a run panics.
#[derive(Debug)]
pub struct RunReporter {
    /// Artifact directory.
    artifacts: RunArtifacts,
    /// Run name recorded in the summary.
    run_name: String,
    /// Start timestamp in unix milliseconds.
    started_at_ms: u64,
    /// Set once a summary has been written.
    finalized: bool,
}

impl RunReporter {
    /// Creates a reporter for the named run.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Report`] when the run root cannot be created.
    pub fn new(run_name: &str, run_root: Option<&Path>) -> Result<Self, HarnessError> {
        Ok(Self {
            artifacts: RunArtifacts::new(run_name, run_root)?,
            run_name: run_name.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    #[must_use]
    pub const fn artifacts(&self) -> &RunArtifacts {
        &self.artifacts
    }

    /// Writes the summary for a completed suite.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Report`] when either artifact cannot be written.
    pub fn finish(&mut self, report: &SuiteReport) -> Result<(), HarnessError> {
        self.write_summary(report.status().as_str(), report.outcomes(), &[])
    }

    /// Writes a summary for a run that never produced a report.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Report`] when either artifact cannot be written.
    pub fn abort(&mut self, status: &str, note: impl Into<String>) -> Result<(), HarnessError> {
        self.write_summary(status, &[], &[note.into()])
    }

    /// Writes both summary artifacts and marks the reporter finalized.
    fn write_summary(
        &mut self,
        status: &str,
        checks: &[CheckOutcome],
        notes: &[String],
    ) -> Result<(), HarnessError> {
        let ended_at_ms = now_millis();
        let summary = RunSummary {
            run_name: &self.run_name,
            status,
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            checks,
            notes,
        };
        self.artifacts.write_json(SUMMARY_JSON, &summary)?;
        self.artifacts.write_text(SUMMARY_MARKDOWN, &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for RunReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.abort(status, "run terminated without explicit summary");
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix time in milliseconds.
fn now_millis() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Returns `target/system-tests/run_<ms>/<name>`.
fn default_run_root(name: &str) -> PathBuf {
    PathBuf::from(DEFAULT_RUN_PARENT).join(format!("run_{}", now_millis())).join(name)
}

/// Renders the Markdown summary.
fn summary_markdown(summary: &RunSummary<'_>) -> String {
    let mut out = String::from("# Secret Delivery Run Summary\n\n## Status\n\n");
    let _ = writeln!(out, "- Run: {}", summary.run_name);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Checks\n\n");
    if summary.checks.is_empty() {
        out.push_str("- None\n");
    }
    for outcome in summary.checks {
        let _ = write!(out, "- {}: {}", outcome.check, outcome.status.as_str());
        if let Some(detail) = &outcome.detail {
            let _ = write!(out, " ({detail})");
        }
        out.push('\n');
    }
    out.push_str("\n## Notes\n\n");
    if summary.notes.is_empty() {
        out.push_str("- None\n");
    }
    for note in summary.notes {
        let _ = writeln!(out, "- {note}");
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
