//! HTTP surface for edit requests.
//!
//! A single endpoint accepts `{ prompt, model_id, context }` and answers with
//! either the validated result or a uniform JSON error envelope. Every
//! response carries permissive CORS headers so the grid editor can call it
//! straight from the browser.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::assist::{AssistError, AssistService, ErrorKind};
use crate::flashcards::EditRequest;

/// Request headers browsers may send cross-origin
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Body of every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: ErrorKind,
}

/// Build the router around a shared service.
pub fn router(service: Arc<AssistService>) -> Router {
    Router::new()
        .route("/", post(propose_edits).options(preflight))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(service)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
}

async fn preflight() -> Json<&'static str> {
    Json("ok")
}

async fn method_not_allowed(method: Method) -> Response {
    error_response(AssistError::Input(format!("Method {} is not allowed", method)))
}

async fn not_found(uri: Uri) -> Response {
    error_response(AssistError::Input(format!("No route for {}", uri.path())))
}

async fn propose_edits(
    State(service): State<Arc<AssistService>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // Oversized or interrupted bodies fail here, before any JSON parsing
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            log::warn!("Rejected edit request body: {}", rejection.body_text());
            return error_response(AssistError::Input(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )));
        }
    };

    let request: EditRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejected edit request with unreadable body: {}", e);
            return error_response(AssistError::Input(format!("Invalid request body: {}", e)));
        }
    };

    match service.propose_edits(&request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: AssistError) -> Response {
    let body = ErrorBody {
        error: err.to_string(),
        details: err.kind(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Handle for a running edit server.
pub struct AssistServer {
    /// Address the server is listening on.
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl AssistServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Ask the server to stop accepting connections.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait until the server task has finished.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// Bind `bind` and serve edit requests in the background.
pub async fn start_server(bind: &str, service: Arc<AssistService>) -> std::io::Result<AssistServer> {
    let listener = TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    let app = router(service);

    log::info!("Flashcard assist server listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                log::info!("Flashcard assist server shutting down");
            })
            .await;
        if let Err(e) = result {
            log::error!("Flashcard assist server stopped with error: {}", e);
        }
    });

    Ok(AssistServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
