//! REST endpoints for todos.
//!
//! `/todos` and `/todos/{id}` accept any method and dispatch on it, so an
//! unsupported verb gets the same JSON error shape as every other failure.

use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use super::model::{CreateTodoRequest, UpdateTodoRequest};
use super::service::TodoService;
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::TodoError;

/// Shared state for the todo routes.
#[derive(Clone)]
pub struct TodoState {
    pub service: TodoService,
    /// Upper bound on the work done for a single request.
    pub request_timeout: Duration,
}

impl TodoState {
    pub fn new(service: TodoService) -> Self {
        Self {
            service,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Build the Axum router for `/todos` and `/health`.
pub fn todo_routes(state: TodoState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/todos", any(todos_collection))
        .route("/todos/{id}", any(todos_item))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "todo-api"
    }))
}

// ── Dispatch ────────────────────────────────────────────────────────────

/// Query pairs in request order. Decoded as a list so a repeated `id` key
/// is not a deserialization error; the first one wins.
type QueryPairs = Vec<(String, String)>;

/// `?id=` fallback for clients that do not put the id in the path.
async fn todos_collection(
    State(state): State<TodoState>,
    method: Method,
    query: Result<Query<QueryPairs>, QueryRejection>,
    body: Bytes,
) -> Response {
    let Query(pairs) = match query {
        Ok(query) => query,
        Err(e) => {
            debug!(error = %e, "Rejected query string");
            return respond_error(StatusCode::BAD_REQUEST, "invalid id");
        }
    };

    let id = pairs
        .into_iter()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty());
    dispatch(state, method, id, body).await
}

async fn todos_item(
    State(state): State<TodoState>,
    method: Method,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Response {
    match path {
        Ok(Path(id)) => dispatch(state, method, Some(id), body).await,
        Err(e) => {
            debug!(error = %e, "Rejected path id");
            respond_error(StatusCode::BAD_REQUEST, "invalid id")
        }
    }
}

async fn dispatch(state: TodoState, method: Method, id: Option<String>, body: Bytes) -> Response {
    let timeout = state.request_timeout;
    let service = &state.service;

    let work = async {
        match method {
            Method::POST => create(service, &body).await,
            Method::GET => get_or_list(service, id.as_deref()).await,
            Method::PUT => update(service, id.as_deref(), &body).await,
            Method::DELETE => delete(service, id.as_deref()).await,
            _ => respond_error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
        }
    };

    // Dropping `work` on expiry cancels the in-flight store call.
    match tokio::time::timeout(timeout, work).await {
        Ok(response) => response,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Todo request timed out");
            respond_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn create(service: &TodoService, body: &[u8]) -> Response {
    let req: CreateTodoRequest = match serde_json::from_slice(body) {
        Ok(req) => req,
        Err(e) => {
            debug!(error = %e, "Rejected create body");
            return respond_error(StatusCode::BAD_REQUEST, "invalid request body");
        }
    };

    match service.create(&req.title, &req.description).await {
        Ok(todo) => respond_json(StatusCode::CREATED, &todo),
        Err(e) => error_response(e),
    }
}

async fn get_or_list(service: &TodoService, id: Option<&str>) -> Response {
    let Some(raw) = id else {
        return match service.list().await {
            Ok(todos) => respond_json(StatusCode::OK, &todos),
            Err(e) => error_response(e),
        };
    };

    let id = match parse_id(raw) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match service.get(id).await {
        Ok(todo) => respond_json(StatusCode::OK, &todo),
        Err(e) => error_response(e),
    }
}

async fn update(service: &TodoService, id: Option<&str>, body: &[u8]) -> Response {
    let id = match require_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let req: UpdateTodoRequest = match serde_json::from_slice(body) {
        Ok(req) => req,
        Err(e) => {
            debug!(id, error = %e, "Rejected update body");
            return respond_error(StatusCode::BAD_REQUEST, "invalid request body");
        }
    };

    match service
        .update(id, &req.title, &req.description, req.completed)
        .await
    {
        Ok(todo) => respond_json(StatusCode::OK, &todo),
        Err(e) => error_response(e),
    }
}

async fn delete(service: &TodoService, id: Option<&str>) -> Response {
    let id = match require_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn require_id(id: Option<&str>) -> Result<i64, Response> {
    match id {
        Some(raw) => parse_id(raw),
        None => Err(respond_error(StatusCode::BAD_REQUEST, "id required")),
    }
}

fn parse_id(raw: &str) -> Result<i64, Response> {
    raw.parse::<i64>()
        .map_err(|_| respond_error(StatusCode::BAD_REQUEST, "invalid id"))
}

/// The only place a `TodoError` becomes an HTTP status.
fn error_response(err: TodoError) -> Response {
    match err {
        TodoError::NotFound => respond_error(StatusCode::NOT_FOUND, "todo not found"),
        TodoError::InvalidInput(_) => respond_error(StatusCode::BAD_REQUEST, &err.to_string()),
        TodoError::Storage(e) => {
            error!(error = %e, "Todo storage failure");
            respond_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

fn respond_json<T: Serialize>(status: StatusCode, data: &T) -> Response {
    (status, Json(data)).into_response()
}

fn respond_error(status: StatusCode, message: &str) -> Response {
    respond_json(status, &serde_json::json!({ "error": message }))
}
