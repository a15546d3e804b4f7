//! In-process mock of the R2R REST API for tests.
//!
//! Binds an ephemeral port, records every request it sees, and answers from a
//! `(method, path)` route table. Unknown routes get a 404.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;

use crate::r2r::{R2rClient, Session};

/// Canned reply for one route.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(u16, Value),
    Text(u16, String),
    /// 200 response whose body is sent as separate chunks.
    Chunks(Vec<&'static str>),
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Reply::Json(status, body)
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Reply::Text(status, body.into())
    }

    fn into_response(self) -> Response {
        match self {
            Reply::Json(status, body) => (status_code(status), axum::Json(body)).into_response(),
            Reply::Text(status, body) => (status_code(status), body).into_response(),
            Reply::Chunks(parts) => {
                let stream = futures::stream::iter(
                    parts
                        .into_iter()
                        .map(|p| Ok::<_, std::io::Error>(Bytes::from_static(p.as_bytes()))),
                );
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/event-stream")],
                    Body::from_stream(stream),
                )
                    .into_response()
            }
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub(crate) struct MockR2r {
    base_url: String,
    state: Arc<MockState>,
}

impl MockR2r {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(record_and_reply).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn on(&self, method: &str, path: &str, reply: Reply) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests()
            .pop()
            .expect("mock R2R received no requests")
    }

    /// Client pointed at this mock with an optional preset token.
    pub fn client(&self, token: Option<&str>) -> R2rClient {
        R2rClient::new(Session::new(&self.base_url, token.map(str::to_string)))
            .expect("build client")
    }
}

async fn record_and_reply(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let header_value = |name: HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.to_vec(),
    };
    let key = (recorded.method.clone(), recorded.path.clone());
    state.requests.lock().unwrap().push(recorded);

    let reply = state.routes.lock().unwrap().get(&key).cloned();
    match reply {
        Some(reply) => reply.into_response(),
        None => (StatusCode::NOT_FOUND, "no route").into_response(),
    }
}
