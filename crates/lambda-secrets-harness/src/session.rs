// crates/lambda-secrets-harness/src/session.rs
// ============================================================================
// Module: Session Fixture
// Description: Session-scoped composition of provisioning and probing.
// Purpose: Compute the plan and the probe response exactly once per session.
// Dependencies: reqwest, tracing
// ============================================================================

//! ## Overview
//! A [`SessionFixture`] owns the provisioner, the probe, and the memoized
//! [`SessionContext`]. The first call to [`SessionFixture::context`] runs
//! setup, the optional apply, the plan, and then the probe against the plan's
//! URL output; every later call returns the same context instance.
//!
//! Invariants:
//! - `plan` and `probe` each run at most once per fixture.
//! - A failed initialization is memoized too; tests report the same error
//!   instead of re-provisioning.
//! - Teardown never re-runs plan or probe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use reqwest::Url;
use tracing::info;
use tracing::warn;

use crate::CONTAINER_URL_OUTPUT;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::plan::PlanResult;
use crate::probe::HttpTargetProbe;
use crate::probe::ProbeResponse;
use crate::probe::TargetProbe;
use crate::provisioner::Provisioner;
use crate::provisioner::TerraformProvisioner;

// ============================================================================
// SECTION: Session Context
// ============================================================================

/// Plan result and probe response shared by every check in a session.
///
/// # Invariants
/// - Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Plan computed for the session.
    plan: PlanResult,
    /// Response captured from the single probe.
    response: ProbeResponse,
}

impl SessionContext {
    /// Builds a context from an existing plan and response.
    #[must_use]
    pub const fn new(plan: PlanResult, response: ProbeResponse) -> Self {
        Self {
            plan,
            response,
        }
    }

    /// Returns the session plan.
    #[must_use]
    pub const fn plan(&self) -> &PlanResult {
        &self.plan
    }

    /// Returns the session probe response.
    #[must_use]
    pub const fn response(&self) -> &ProbeResponse {
        &self.response
    }
}

// ============================================================================
// SECTION: Session Fixture
// ============================================================================

/// Session-scoped fixture composing a [`Provisioner`] and a [`TargetProbe`].
#[derive(Debug)]
pub struct SessionFixture<P, T> {
    /// Provisioning backend.
    provisioner: P,
    /// Probe backend.
    probe: T,
    /// Plan output holding the probe URL.
    output_name: String,
    /// Capture provisioning tool output instead of streaming it.
    capture_output: bool,
    /// Apply before planning.
    apply: bool,
    /// Destroy on teardown.
    destroy: bool,
    /// Memoized initialization result.
    context: OnceLock<Result<SessionContext, HarnessError>>,
}

impl SessionFixture<TerraformProvisioner, HttpTargetProbe> {
    /// Builds the Terraform and HTTP backed fixture from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the HTTP client cannot be built.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let provisioner = TerraformProvisioner::from_config(config);
        let probe = HttpTargetProbe::new(config.timeout)?;
        Ok(Self::new(provisioner, probe)
            .with_output_name(config.output_name.clone())
            .with_apply(config.apply)
            .with_destroy(config.destroy)
            .with_capture_output(!config.stream_plan))
    }
}

impl<P: Provisioner, T: TargetProbe> SessionFixture<P, T> {
    /// Creates a fixture probing the default container URL output.
    #[must_use]
    pub fn new(provisioner: P, probe: T) -> Self {
        Self {
            provisioner,
            probe,
            output_name: CONTAINER_URL_OUTPUT.to_string(),
            capture_output: true,
            apply: false,
            destroy: false,
            context: OnceLock::new(),
        }
    }

    /// Overrides the plan output holding the probe URL.
    #[must_use]
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Streams provisioning tool output instead of capturing it.
    #[must_use]
    pub fn with_capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Applies the configuration before planning.
    #[must_use]
    pub fn with_apply(mut self, apply: bool) -> Self {
        self.apply = apply;
        self
    }

    /// Destroys the environment on teardown.
    #[must_use]
    pub fn with_destroy(mut self, destroy: bool) -> Self {
        self.destroy = destroy;
        self
    }

    /// Returns the provisioning backend.
    pub const fn provisioner(&self) -> &P {
        &self.provisioner
    }

    /// Returns the probe backend.
    pub const fn probe(&self) -> &T {
        &self.probe
    }

    /// Returns true once initialization has run, successfully or not.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.context.get().is_some()
    }

    /// Returns the memoized session context, initializing it on first use.
    ///
    /// Concurrent callers block until the single initialization finishes.
    ///
    /// # Errors
    ///
    /// Returns the memoized [`HarnessError`] when setup, planning, or probing
    /// failed.
    pub fn context(&self) -> Result<&SessionContext, HarnessError> {
        self.context.get_or_init(|| self.initialize()).as_ref().map_err(Clone::clone)
    }

    /// Prepares the environment and computes its plan.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provisioning`] when any provisioning step fails.
    pub fn compute_plan(&self) -> Result<PlanResult, HarnessError> {
        self.provisioner.setup()?;
        if self.apply {
            self.provisioner.apply()?;
        }
        self.provisioner.plan(self.capture_output)
    }

    /// Probes the URL exposed by the plan's configured output.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MissingOutput`] or [`HarnessError::InvalidOutput`]
    /// for an unusable output, and transport errors from the probe.
    pub fn probe_target(&self, plan: &PlanResult) -> Result<ProbeResponse, HarnessError> {
        let url = plan.output_str(&self.output_name)?;
        validate_probe_url(&self.output_name, url)?;
        self.probe.probe(url)
    }

    /// Runs the optional destroy step.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provisioning`] when destroy fails.
    pub fn teardown(&self) -> Result<(), HarnessError> {
        if !self.destroy {
            return Ok(());
        }
        self.provisioner.destroy()
    }

    /// Composes plan and probe into a context.
    fn initialize(&self) -> Result<SessionContext, HarnessError> {
        let result = self.compute_plan().and_then(|plan| {
            let response = self.probe_target(&plan)?;
            Ok(SessionContext::new(plan, response))
        });
        match &result {
            Ok(context) => info!(
                status = context.response().status(),
                output = %self.output_name,
                "session initialized"
            ),
            Err(err) => warn!(error = %err, "session initialization failed"),
        }
        result
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects outputs that are not absolute HTTP(S) URLs.
fn validate_probe_url(name: &str, url: &str) -> Result<(), HarnessError> {
    let parsed = Url::parse(url).map_err(|err| HarnessError::InvalidOutput {
        name: name.to_string(),
        message: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(HarnessError::InvalidOutput {
            name: name.to_string(),
            message: format!("unsupported scheme `{other}`"),
        }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
