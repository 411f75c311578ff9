use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use pastelite_common::PasteError;
use pastelite_storage::{NewPaste, PasteService};

use crate::clock::RequestClock;
use crate::config::ServerConfig;
use crate::page;

/// Estado compartilhado entre os handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: PasteService,
    pub clock: RequestClock,
    pub public_base_url: Option<String>,
}

impl AppState {
    pub fn new(service: PasteService, config: &ServerConfig) -> Self {
        Self {
            service,
            clock: RequestClock::new(config.test_mode),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Base das URLs públicas: configurada, ou derivada do Host da requisição.
    fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.public_base_url {
            return base.clone();
        }
        let proto = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("http");
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        format!("{proto}://{host}")
    }
}

#[derive(Debug, Serialize)]
struct CreateResponse {
    id: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct ReadResponse {
    content: String,
    remaining_views: Option<u64>,
    expires_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Monta o router HTTP completo.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/healthz", get(healthz))
        .route("/api/pastes", post(create_paste))
        .route("/api/pastes/:id", get(read_paste))
        .route("/p/:id", get(view_paste))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<String> {
    page::index()
}

async fn healthz(State(state): State<AppState>) -> Response {
    match state.service.health().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { ok: true })).into_response(),
        Err(e) => {
            warn!("health check falhou: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse { ok: false }),
            )
                .into_response()
        }
    }
}

async fn create_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let new = match NewPaste::from_json(&body) {
        Ok(new) => new,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let now = state.clock.now(&headers);

    match state.service.create(new, now).await {
        Ok(id) => {
            let url = format!("{}/p/{id}", state.base_url(&headers));
            (StatusCode::OK, Json(CreateResponse { id, url })).into_response()
        }
        Err(PasteError::Validation(e)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            error!("falha ao criar paste: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store paste")
        }
    }
}

async fn read_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let now = state.clock.now(&headers);
    match state.service.fetch(&id, now).await {
        Some(view) => {
            let expires_at = view.expires_at_iso();
            Json(ReadResponse {
                content: view.content,
                remaining_views: view.remaining_views,
                expires_at,
            })
            .into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "Paste not found"),
    }
}

async fn view_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let now = state.clock.now(&headers);
    match state.service.fetch(&id, now).await {
        Some(view) => page::paste(&view.content).into_response(),
        None => (StatusCode::NOT_FOUND, page::not_found()).into_response(),
    }
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pastelite_storage::MemoryStore;
    use std::sync::Arc;

    fn state(base: Option<&str>) -> AppState {
        AppState {
            service: PasteService::new(Arc::new(MemoryStore::new())),
            clock: RequestClock::new(false),
            public_base_url: base.map(str::to_string),
        }
    }

    #[test]
    fn base_url_prefers_configuration() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:3000"));
        let state = state(Some("https://paste.example"));
        assert_eq!(state.base_url(&headers), "https://paste.example");
    }

    #[test]
    fn base_url_from_host_and_forwarded_proto() {
        let state = state(None);
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("paste.example"));
        assert_eq!(state.base_url(&headers), "http://paste.example");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(state.base_url(&headers), "https://paste.example");
    }
}
