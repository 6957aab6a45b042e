//! In-process stand-in for the ReliefWeb taxonomy API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// One request the fake API received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub accept_language: Option<String>,
}

#[derive(Default)]
struct FakeApiState {
    /// Keyed by (language, path).
    lists: Mutex<HashMap<(String, String), serde_json::Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    failing: AtomicBool,
}

pub struct FakeReliefWebApi {
    pub addr: SocketAddr,
    state: Arc<FakeApiState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeReliefWebApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeApiState::default());
        let app = Router::new()
            .route("/references/themes", get(list_handler))
            .route("/countries", get(list_handler))
            .route("/references/disaster-types", get(list_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serves `items` (`(id, name, description)`) for `path` in `language`.
    pub fn set_list(&self, language: &str, path: &str, items: &[(u64, &str, Option<&str>)]) {
        let data: Vec<serde_json::Value> = items
            .iter()
            .map(|(id, name, description)| {
                let mut fields = serde_json::json!({ "name": name });
                if let Some(description) = description {
                    fields["description"] = serde_json::json!(description);
                }
                serde_json::json!({ "id": id, "fields": fields })
            })
            .collect();

        self.state.lists.lock().insert(
            (language.to_string(), path.to_string()),
            serde_json::json!({ "totalCount": data.len(), "data": data }),
        );
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn list_handler(
    State(state): State<Arc<FakeApiState>>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let accept_language = headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = uri.path().trim_start_matches('/').to_string();

    state.requests.lock().push(RecordedRequest {
        path: path.clone(),
        query,
        accept_language: accept_language.clone(),
    });

    if state.failing.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let language = accept_language.unwrap_or_else(|| "en".to_string());
    let body = state
        .lists
        .lock()
        .get(&(language, path))
        .cloned()
        .unwrap_or_else(|| serde_json::json!({ "totalCount": 0, "data": [] }));

    Json(body).into_response()
}
