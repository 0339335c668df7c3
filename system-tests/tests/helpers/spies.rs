// system-tests/tests/helpers/spies.rs
// ============================================================================
// Module: Call-Counting Collaborators
// Description: Provisioner and probe wrappers that count invocations.
// Purpose: Let suites assert that plan and probe run exactly once.
// Dependencies: lambda-secrets-harness
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use lambda_secrets_harness::CONTAINER_URL_OUTPUT;
use lambda_secrets_harness::HarnessError;
use lambda_secrets_harness::PlanResult;
use lambda_secrets_harness::ProbeResponse;
use lambda_secrets_harness::Provisioner;
use lambda_secrets_harness::TargetProbe;
use serde_json::Value;

/// Shared invocation counter.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    /// Returns the number of recorded calls.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Provisioner returning a fixed plan, counting each step.
#[derive(Debug)]
pub struct FixedPlanProvisioner {
    plan: PlanResult,
    /// `plan` invocations.
    pub plans: CallCounter,
    /// `destroy` invocations.
    pub destroys: CallCounter,
}

impl FixedPlanProvisioner {
    /// Serves `plan` unchanged.
    pub fn new(plan: PlanResult) -> Self {
        Self {
            plan,
            plans: CallCounter::default(),
            destroys: CallCounter::default(),
        }
    }
}

impl Provisioner for FixedPlanProvisioner {
    fn setup(&self) -> Result<(), HarnessError> {
        Ok(())
    }

    fn plan(&self, _capture_output: bool) -> Result<PlanResult, HarnessError> {
        self.plans.record();
        Ok(self.plan.clone())
    }

    fn destroy(&self) -> Result<(), HarnessError> {
        self.destroys.record();
        Ok(())
    }
}

/// Probe wrapper counting delegated calls.
#[derive(Debug)]
pub struct CountingProbe<T> {
    inner: T,
    /// `probe` invocations.
    pub probes: CallCounter,
}

impl<T> CountingProbe<T> {
    /// Wraps `inner`.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            probes: CallCounter::default(),
        }
    }
}

impl<T: TargetProbe> TargetProbe for CountingProbe<T> {
    fn probe(&self, url: &str) -> Result<ProbeResponse, HarnessError> {
        self.probes.record();
        self.inner.probe(url)
    }
}

/// Returns the variables the bundled declarations default to.
pub fn sample_variables() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("secret-plain".to_string(), Value::String("hunter2".to_string())),
        ("secret-json".to_string(), Value::String(r#"{"a":1,"nested":{"b":[1,2]}}"#.to_string())),
        (
            "secret-multiline".to_string(),
            Value::String("-----BEGIN TEST KEY-----\nbGFtYmRhLXNlY3JldHM=\n-----END TEST KEY-----\n".to_string()),
        ),
        ("secret-binary".to_string(), Value::String("3q2+7wABAgP/".to_string())),
    ])
}

/// Builds a plan pointing the container URL output at `url`.
pub fn plan_for(url: &str, variables: BTreeMap<String, Value>) -> PlanResult {
    let outputs = BTreeMap::from([(CONTAINER_URL_OUTPUT.to_string(), Value::String(url.to_string()))]);
    PlanResult::new(outputs, variables)
}
