//! In-process mock of the storefront backend
//!
//! - `POST /auth/refresh` exchanges `R1` for `A2`/`R2` (or fails, if told to)
//! - `/public/...` paths answer without a bearer token
//! - every other path requires `Authorization: Bearer <valid token>`
//! - canned responses can be registered per path; otherwise the request is
//!   echoed back as JSON

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use storefront_auth::{Credentials, SessionState, SessionStore};
use storefront_sdk::{AuthConfig, ClientConfig, Storefront};
use tokio::net::TcpListener;
use tokio::sync::Barrier;

pub const TENANT: &str = "acme";
pub const DEVICE: &str = "device-1";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub struct Backend {
    /// Bearer token protected routes accept
    pub valid_token: Mutex<String>,
    /// Token pair the refresh endpoint hands out
    pub issued: Mutex<(String, String)>,
    pub refresh_calls: AtomicUsize,
    pub refresh_fails: Mutex<bool>,
    /// Whether a successful refresh makes the issued token valid
    pub accept_issued: Mutex<bool>,
    pub refresh_delay: Mutex<Duration>,
    /// Stale-token requests wait here so their 401s land together
    pub stale_barrier: Mutex<Option<Arc<Barrier>>>,
    pub canned: Mutex<HashMap<String, (StatusCode, String)>>,
    pub requests: Mutex<Vec<Recorded>>,
}

impl Backend {
    fn new(valid_token: &str) -> Self {
        Self {
            valid_token: Mutex::new(valid_token.into()),
            issued: Mutex::new(("A2".into(), "R2".into())),
            refresh_calls: AtomicUsize::new(0),
            refresh_fails: Mutex::new(false),
            accept_issued: Mutex::new(true),
            refresh_delay: Mutex::new(Duration::ZERO),
            stale_barrier: Mutex::new(None),
            canned: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Answer `path` with `status` and `body` instead of echoing.
    pub fn respond(&self, path: &str, status: u16, body: serde_json::Value) {
        self.canned.lock().unwrap().insert(
            path.into(),
            (StatusCode::from_u16(status).unwrap(), body.to_string()),
        );
    }

    pub fn fail_refresh(&self) {
        *self.refresh_fails.lock().unwrap() = true;
    }

    /// Keep rejecting the refreshed token, so a replay gets 401 again.
    pub fn reject_issued_tokens(&self) {
        *self.accept_issued.lock().unwrap() = false;
    }

    pub fn delay_refresh(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = delay;
    }

    pub fn gather_stale_requests(&self, n: usize) {
        *self.stale_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(n)));
    }

    /// Recorded requests to `path`, refresh calls included.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn record(backend: &Backend, request: Request<Body>) -> Recorded {
    let headers = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let body = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let recorded = Recorded {
        method,
        path,
        query,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    };
    backend.requests.lock().unwrap().push(recorded.clone());
    recorded
}

fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

async fn refresh(State(backend): State<Arc<Backend>>, request: Request<Body>) -> Response {
    let recorded = record(&backend, request).await;
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *backend.refresh_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let presented = recorded.json()["refresh"].as_str().unwrap_or("").to_string();
    if *backend.refresh_fails.lock().unwrap() || presented != "R1" {
        return json_response(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"refresh token expired"}"#.into(),
        );
    }

    let (access, refresh) = backend.issued.lock().unwrap().clone();
    if *backend.accept_issued.lock().unwrap() {
        *backend.valid_token.lock().unwrap() = access.clone();
    }
    json_response(
        StatusCode::OK,
        serde_json::json!({"access_token": access, "refresh_token": refresh}).to_string(),
    )
}

async fn everything_else(State(backend): State<Arc<Backend>>, request: Request<Body>) -> Response {
    let recorded = record(&backend, request).await;

    if !recorded.path.starts_with("/public") {
        let valid = format!("Bearer {}", backend.valid_token.lock().unwrap());
        if recorded.header("authorization") != Some(valid.as_str()) {
            let barrier = backend.stale_barrier.lock().unwrap().clone();
            if let Some(barrier) = barrier {
                barrier.wait().await;
            }
            return json_response(
                StatusCode::UNAUTHORIZED,
                r#"{"message":"token expired"}"#.into(),
            );
        }
    }

    let canned = backend.canned.lock().unwrap().get(&recorded.path).cloned();
    match canned {
        Some((status, body)) => json_response(status, body),
        None => json_response(
            StatusCode::OK,
            serde_json::json!({
                "method": recorded.method,
                "path": recorded.path,
                "query": recorded.query,
                "body": recorded.body,
            })
            .to_string(),
        ),
    }
}

/// Start the mock backend. Protected routes accept `valid_token`.
pub async fn start_backend(valid_token: &str) -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::new(valid_token));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/auth/refresh", post(refresh))
        .fallback(everything_else)
        .with_state(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    (url, backend)
}

pub fn config(url: &str) -> ClientConfig {
    ClientConfig::new(url, TENANT)
        .with_retries(0)
        .with_retry_delay(Duration::from_millis(10))
        .with_timeout(Duration::from_secs(5))
}

/// Session holding `A1`/`R1` for customer `c-1`.
pub fn signed_in_store() -> Arc<SessionStore> {
    let mut state = SessionState::anonymous();
    state.credentials = Some(Credentials::new("A1", "R1"));
    state.customer_id = Some("c-1".into());
    state.device_token = DEVICE.into();
    Arc::new(SessionStore::with_state(state))
}

/// Signed-in client against the mock backend.
pub fn storefront(url: &str, store: Arc<SessionStore>) -> Storefront {
    Storefront::with_auth(config(url), AuthConfig::new(format!("{url}/auth"), store)).unwrap()
}

pub fn anonymous_storefront(url: &str) -> Storefront {
    Storefront::new(config(url)).unwrap()
}
