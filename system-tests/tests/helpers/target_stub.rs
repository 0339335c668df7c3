// system-tests/tests/helpers/target_stub.rs
// ============================================================================
// Module: Target Stub
// Description: In-process stand-in for the provisioned Lambda container.
// Purpose: Serve secret deliveries over real HTTP for the contract suites.
// Dependencies: axum, tokio, lambda-secrets-harness
// ============================================================================

//! ## Overview
//! The stub answers every GET with one configured reply. Replies are built
//! from a plan's secret variables the way the container labels them, then
//! optionally corrupted per test. The server runs on its own thread and
//! runtime so suites can drive it with the blocking probe.

use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::LOCATION;
use axum::response::IntoResponse;
use axum::response::Response;
use lambda_secrets_harness::PlanResult;
use lambda_secrets_harness::SecretKind;
use lambda_secrets_harness::checks::SECRET_CASES;
use lambda_secrets_harness::kind::SecretPayload;
use lambda_secrets_harness::kind::decode_binary;
use lambda_secrets_harness::kind::type_field;
use serde_json::Map;
use serde_json::Value;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tokio::time::sleep;

/// Reply served for every request.
#[derive(Debug, Clone)]
pub struct StubReply {
    status: u16,
    body: StubBody,
    delay: Duration,
    location: Option<String>,
}

#[derive(Debug, Clone)]
enum StubBody {
    Fields(Map<String, Value>),
    Raw(String),
}

impl StubReply {
    /// Delivers every secret variable in `plan` the way the container does.
    pub fn delivering(plan: &PlanResult) -> Self {
        let mut fields = Map::new();
        for case in &SECRET_CASES {
            let Some(value) = plan.variable_str(case.variable) else {
                continue;
            };
            let bytes = if case.kind == SecretKind::Binary { decode_binary(value).ok() } else { None };
            let payload = bytes.as_deref().map_or(SecretPayload::Text(value), SecretPayload::Binary);
            fields.insert(case.field.to_string(), Value::String(payload.delivered_text()));
            fields.insert(
                type_field(case.field),
                Value::String(SecretKind::classify(&payload).as_str().to_string()),
            );
        }
        Self {
            status: 200,
            body: StubBody::Fields(fields),
            delay: Duration::ZERO,
            location: None,
        }
    }

    /// Serves a raw body verbatim.
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: StubBody::Raw(body.into()),
            delay: Duration::ZERO,
            location: None,
        }
    }

    /// Overrides the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Replaces or inserts one response field.
    pub fn with_field(mut self, field: &str, value: &str) -> Self {
        if let StubBody::Fields(fields) = &mut self.body {
            fields.insert(field.to_string(), Value::String(value.to_string()));
        }
        self
    }

    /// Removes one response field.
    pub fn without_field(mut self, field: &str) -> Self {
        if let StubBody::Fields(fields) = &mut self.body {
            fields.remove(field);
        }
        self
    }

    /// Answers with `status` and a `Location` header pointing at `location`.
    pub fn redirecting_to(mut self, status: u16, location: &str) -> Self {
        self.status = status;
        self.location = Some(location.to_string());
        self
    }

    /// Delays every reply.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn body_text(&self) -> String {
        match &self.body {
            StubBody::Fields(fields) => Value::Object(fields.clone()).to_string(),
            StubBody::Raw(text) => text.clone(),
        }
    }
}

#[derive(Clone)]
struct StubState {
    reply: Arc<StubReply>,
    requests: Arc<AtomicUsize>,
}

/// Handle for the running stub server.
pub struct TargetStubHandle {
    url: String,
    requests: Arc<AtomicUsize>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl TargetStubHandle {
    /// Returns the URL the plan output should carry.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the number of requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for TargetStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns a stub serving `reply` on a loopback port.
pub fn spawn_target_stub(reply: StubReply) -> Result<TargetStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("target stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("target stub listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("target stub local addr failed: {err}"))?;
    let url = format!("http://{addr}/");

    let requests = Arc::new(AtomicUsize::new(0));
    let state = StubState {
        reply: Arc::new(reply),
        requests: Arc::clone(&requests),
    };
    let app = Router::new().fallback(handle_request).with_state(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(TargetStubHandle {
        url,
        requests,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

async fn handle_request(State(state): State<StubState>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !state.reply.delay.is_zero() {
        sleep(state.reply.delay).await;
    }
    let status = StatusCode::from_u16(state.reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response =
        (status, [(CONTENT_TYPE, "application/json")], state.reply.body_text()).into_response();
    if let Some(location) = &state.reply.location
        && let Ok(value) = location.parse()
    {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}
