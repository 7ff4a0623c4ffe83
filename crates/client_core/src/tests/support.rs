use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{domain::Customer, error::ErrorBody, protocol::CreateCustomerRequest};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Semaphore},
};

use crate::{error::ClientError, transport::DirectoryApi};

pub(crate) fn ada() -> Customer {
    Customer::new("Ada", "Lovelace", "ada@example.com")
}

pub(crate) fn grace() -> Customer {
    Customer::new("Grace", "Hopper", "grace@example.com")
}

pub(crate) fn error_body(code: &str, message: &str) -> Option<ErrorBody> {
    Some(ErrorBody {
        code: Some(code.to_string()),
        message: Some(message.to_string()),
    })
}

type CannedFailure = (u16, Option<ErrorBody>);

/// In-memory directory endpoint that counts calls and can hold responses
/// behind a semaphore until the test releases them.
#[derive(Default)]
pub(crate) struct FakeDirectoryApi {
    customers: Mutex<Vec<Customer>>,
    list_failure: Mutex<Option<CannedFailure>>,
    create_failure: Mutex<Option<CannedFailure>>,
    list_gate: Option<Arc<Semaphore>>,
    create_gate: Option<Arc<Semaphore>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl FakeDirectoryApi {
    pub(crate) fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: Mutex::new(customers),
            ..Self::default()
        }
    }

    pub(crate) fn with_list_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.list_gate = Some(gate);
        self
    }

    pub(crate) fn with_create_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.create_gate = Some(gate);
        self
    }

    pub(crate) async fn fail_list(&self, status: u16, body: Option<ErrorBody>) {
        *self.list_failure.lock().await = Some((status, body));
    }

    pub(crate) async fn recover_list(&self) {
        self.list_failure.lock().await.take();
    }

    pub(crate) async fn fail_create(&self, status: u16, body: Option<ErrorBody>) {
        *self.create_failure.lock().await = Some((status, body));
    }

    pub(crate) async fn recover_create(&self) {
        self.create_failure.lock().await.take();
    }

    pub(crate) async fn push(&self, customer: Customer) {
        self.customers.lock().await.push(customer);
    }

    pub(crate) async fn customers(&self) -> Vec<Customer> {
        self.customers.lock().await.clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

async fn pass(gate: Option<&Arc<Semaphore>>) {
    if let Some(gate) = gate {
        gate.acquire().await.expect("gate closed").forget();
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectoryApi {
    async fn list_customers(&self) -> Result<Vec<Customer>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        pass(self.list_gate.as_ref()).await;
        if let Some((status, body)) = self.list_failure.lock().await.clone() {
            return Err(ClientError::Status { status, body });
        }
        Ok(self.customers.lock().await.clone())
    }

    async fn create_customer(&self, customer: &Customer) -> Result<(), ClientError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        pass(self.create_gate.as_ref()).await;
        if let Some((status, body)) = self.create_failure.lock().await.clone() {
            return Err(ClientError::Status { status, body });
        }
        self.customers.lock().await.push(customer.clone());
        Ok(())
    }
}

/// Canned response overriding the default handler behaviour.
type RawResponse = (StatusCode, String);

#[derive(Clone, Default)]
struct ServerState {
    customers: Arc<Mutex<Vec<Customer>>>,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    list_override: Arc<Mutex<Option<RawResponse>>>,
    create_override: Arc<Mutex<Option<RawResponse>>>,
    list_hits: Arc<AtomicUsize>,
    create_hits: Arc<AtomicUsize>,
}

async fn handle_list(State(state): State<ServerState>) -> Response {
    state.list_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(canned) = state.list_override.lock().await.clone() {
        return canned.into_response();
    }
    Json(state.customers.lock().await.clone()).into_response()
}

async fn handle_create(
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    state.create_hits.fetch_add(1, Ordering::SeqCst);
    state.received.lock().await.push(payload.clone());
    if let Some(canned) = state.create_override.lock().await.clone() {
        return canned.into_response();
    }
    match serde_json::from_value::<CreateCustomerRequest>(payload) {
        Ok(customer) => {
            state.customers.lock().await.push(customer);
            StatusCode::CREATED.into_response()
        }
        Err(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(r#"{{"code":"invalid_body","message":"{err}"}}"#),
        )
            .into_response(),
    }
}

/// Base URL of a localhost port that nothing listens on.
pub(crate) async fn unreachable_url() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

/// Directory endpoint served over HTTP on an ephemeral localhost port.
pub(crate) struct DirectoryServer {
    pub(crate) url: String,
    state: ServerState,
}

impl DirectoryServer {
    pub(crate) async fn spawn(customers: Vec<Customer>) -> Self {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let state = ServerState {
            customers: Arc::new(Mutex::new(customers)),
            ..ServerState::default()
        };
        let app = Router::new()
            .route("/api/customers", get(handle_list).post(handle_create))
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub(crate) async fn respond_to_list(&self, status: StatusCode, body: impl Into<String>) {
        *self.state.list_override.lock().await = Some((status, body.into()));
    }

    pub(crate) async fn respond_to_create(&self, status: StatusCode, body: impl Into<String>) {
        *self.state.create_override.lock().await = Some((status, body.into()));
    }

    pub(crate) async fn received(&self) -> Vec<serde_json::Value> {
        self.state.received.lock().await.clone()
    }

    pub(crate) fn list_hits(&self) -> usize {
        self.state.list_hits.load(Ordering::SeqCst)
    }

    pub(crate) fn create_hits(&self) -> usize {
        self.state.create_hits.load(Ordering::SeqCst)
    }
}
