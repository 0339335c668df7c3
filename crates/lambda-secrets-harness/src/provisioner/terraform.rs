// crates/lambda-secrets-harness/src/provisioner/terraform.rs
// ============================================================================
// Module: Terraform Provisioner
// Description: Provisioner backed by the terraform CLI.
// Purpose: Shell out to init/plan/show/apply/destroy in the declarations dir.
// Dependencies: std::process, tempfile, tracing
// ============================================================================

//! ## Overview
//! Every step runs the configured binary with `-no-color` in the declarations
//! directory and `TF_IN_AUTOMATION` set; all steps except `show` also pass
//! `-input=false`. Plans are written to a throwaway plan file and decoded
//! through `show -json`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

use tracing::debug;
use tracing::info;

use super::Provisioner;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::plan::PlanResult;

/// Plan file name inside the throwaway plan directory.
const PLAN_FILE_NAME: &str = "harness.tfplan";
/// Maximum stderr bytes echoed back in provisioning errors.
const MAX_STDERR_BYTES: usize = 4 * 1024;

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Terraform CLI provisioner.
///
/// # Invariants
/// - Commands always run inside `working_dir`.
/// - `plan` never mutates infrastructure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformProvisioner {
    /// Binary name or path.
    binary: String,
    /// Declarations directory.
    working_dir: PathBuf,
    /// Optional `-var-file` forwarded to plan/apply/destroy.
    var_file: Option<PathBuf>,
}

impl TerraformProvisioner {
    /// Creates a provisioner for the declarations in `working_dir`.
    #[must_use]
    pub fn new(binary: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
            var_file: None,
        }
    }

    /// Builds a provisioner from harness configuration.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        let provisioner = Self::new(config.terraform_bin.clone(), config.resolved_terraform_dir());
        match &config.var_file {
            Some(path) => provisioner.with_var_file(path.clone()),
            None => provisioner,
        }
    }

    /// Forwards a variable file to plan/apply/destroy.
    ///
    /// Relative paths resolve against the declarations directory.
    #[must_use]
    pub fn with_var_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.var_file = Some(path.into());
        self
    }

    /// Returns the declarations directory.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Returns the common trailing arguments for mutating commands.
    fn var_file_args(&self) -> Vec<OsString> {
        self.var_file
            .as_ref()
            .map(|path| {
                let mut arg = OsString::from("-var-file=");
                arg.push(path.as_os_str());
                vec![arg]
            })
            .unwrap_or_default()
    }

    /// Builds a command for `step` with the shared flags.
    fn command(&self, step: &str, args: &[OsString]) -> Command {
        let mut command = Command::new(&self.binary);
        command.current_dir(&self.working_dir).env("TF_IN_AUTOMATION", "1").arg(step);
        if step != "show" {
            command.arg("-input=false");
        }
        command.arg("-no-color").args(args);
        command
    }

    /// Runs `step`, capturing or streaming its output.
    fn run(&self, step: &str, args: &[OsString], capture: bool) -> Result<Output, HarnessError> {
        debug!(
            step,
            binary = %self.binary,
            dir = %self.working_dir.display(),
            "running provisioning step"
        );
        let mut command = self.command(step, args);
        let spawned = if capture {
            command.output()
        } else {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit()).status().map(|status| Output {
                status,
                stdout: Vec::new(),
                stderr: Vec::new(),
            })
        };
        let output = spawned.map_err(|err| {
            HarnessError::provisioning(step, format!("failed to spawn {}: {err}", self.binary))
        })?;
        if !output.status.success() {
            return Err(HarnessError::provisioning(
                step,
                format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.status,
                    stderr_excerpt(&output.stderr)
                ),
            ));
        }
        Ok(output)
    }
}

impl Provisioner for TerraformProvisioner {
    fn setup(&self) -> Result<(), HarnessError> {
        if !self.working_dir.is_dir() {
            return Err(HarnessError::provisioning(
                "init",
                format!("declarations directory {} does not exist", self.working_dir.display()),
            ));
        }
        self.run("init", &[], true)?;
        info!(dir = %self.working_dir.display(), "provisioning tool initialized");
        Ok(())
    }

    fn plan(&self, capture_output: bool) -> Result<PlanResult, HarnessError> {
        let plan_dir = tempfile::tempdir().map_err(|err| {
            HarnessError::provisioning("plan", format!("failed to create plan directory: {err}"))
        })?;
        let plan_path = plan_dir.path().join(PLAN_FILE_NAME);

        let mut out_arg = OsString::from("-out=");
        out_arg.push(plan_path.as_os_str());
        let mut args = vec![out_arg];
        args.extend(self.var_file_args());
        self.run("plan", &args, capture_output)?;

        let shown = self.run("show", &[OsString::from("-json"), plan_path.into_os_string()], true)?;
        let plan = PlanResult::from_show_json(&shown.stdout)?;
        info!(
            outputs = plan.outputs.len(),
            variables = plan.variables.len(),
            "plan computed"
        );
        Ok(plan)
    }

    fn apply(&self) -> Result<(), HarnessError> {
        let mut args = vec![OsString::from("-auto-approve")];
        args.extend(self.var_file_args());
        self.run("apply", &args, false)?;
        info!("configuration applied");
        Ok(())
    }

    fn destroy(&self) -> Result<(), HarnessError> {
        let mut args = vec![OsString::from("-auto-approve")];
        args.extend(self.var_file_args());
        self.run("destroy", &args, false)?;
        info!("environment destroyed");
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a bounded, lossy UTF-8 excerpt of tool stderr.
fn stderr_excerpt(stderr: &[u8]) -> String {
    let bounded = &stderr[..stderr.len().min(MAX_STDERR_BYTES)];
    let text = String::from_utf8_lossy(bounded).trim().to_string();
    if text.is_empty() { "no stderr output".to_string() } else { text }
}
