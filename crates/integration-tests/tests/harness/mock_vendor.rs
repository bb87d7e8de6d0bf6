//! Mock vendor API that records requests and serves queued replies
//!
//! Replies are queued per path; a request with nothing queued gets a 404
//! in the vendor's error envelope.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Canned reply for one request
pub enum Reply {
    Json(StatusCode, Value),
    /// `text/event-stream` body served in one piece
    Sse(String),
    /// Binary body with its content type
    Binary(&'static str, Vec<u8>),
    Text(String),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self::Json(StatusCode::OK, body)
    }

    /// Vendor error envelope with `status`
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::Json(
            status,
            json!({"error": {"message": message, "type": "invalid_request_error"}}),
        )
    }
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Default)]
struct MockState {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<Recorded>>,
}

/// Running mock vendor
pub struct MockVendor {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockVendor {
    /// Start the mock on a random local port
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Host to put in `openai.host`; clients add the `/v1` prefix
    pub fn host(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue a reply for the next request to `path` (e.g. `/v1/responses`)
    pub fn reply(&self, path: &str, reply: Reply) -> &Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .entry(path.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The only request received; panics when there were zero or several
    pub fn single_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

impl Drop for MockVendor {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path().to_owned();
    let query = parts.uri.query().map(str::to_owned);

    state.requests.lock().unwrap().push(Recorded {
        path: path.clone(),
        query,
        headers: parts.headers,
        body,
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .get_mut(&path)
        .and_then(VecDeque::pop_front);

    let reply = reply.unwrap_or_else(|| Reply::error(StatusCode::NOT_FOUND, &format!("no reply queued for {path}")));
    respond(reply)
}

fn respond(reply: Reply) -> Response {
    match reply {
        Reply::Json(status, body) => (status, axum::Json(body)).into_response(),
        Reply::Sse(body) => ([(header::CONTENT_TYPE, "text/event-stream")], Body::from(body)).into_response(),
        Reply::Binary(content_type, bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Reply::Text(text) => ([(header::CONTENT_TYPE, "text/plain")], text).into_response(),
    }
}

/// Responses-API event stream: one `event:`/`data:` frame per entry
pub fn sse(events: &[(&str, Value)]) -> String {
    events
        .iter()
        .map(|(event, data)| format!("event: {event}\ndata: {data}\n\n"))
        .collect()
}

/// Chat-completions chunk stream terminated by `data: [DONE]`
pub fn chunk_sse(chunks: &[Value]) -> String {
    let mut body: String = chunks.iter().map(|chunk| format!("data: {chunk}\n\n")).collect();
    body.push_str("data: [DONE]\n\n");
    body
}
