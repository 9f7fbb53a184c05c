//! HTTP surface: root, health and transcript endpoints.

use anyhow::{Context, Result};
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::transcript::{TranscriptResponse, TranscriptService};
use crate::utils::parse_language_list;
use crate::TranscriptError;

/// Immutable state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub transcripts: Arc<TranscriptService>,
}

impl AppState {
    pub fn new(service_name: impl Into<String>, transcripts: TranscriptService) -> Self {
        Self {
            service_name: service_name.into(),
            transcripts: Arc::new(transcripts),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub service: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Provider failure rendered as an HTTP error
#[derive(Debug)]
pub struct ApiError(pub TranscriptError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            TranscriptError::TranscriptsDisabled { .. } | TranscriptError::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            TranscriptError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TranscriptError> for ApiError {
    fn from(err: TranscriptError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/transcript/:video_id", get(get_transcript))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        service: state.service_name.clone(),
        status: "running".to_string(),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn get_transcript(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let languages = query.as_deref().and_then(languages_from_query);

    let response = state
        .transcripts
        .get_transcript(&video_id, languages.as_deref())
        .await?;

    Ok(Json(response))
}

/// Collect every `lang` parameter (`?lang=en,de` or `?lang=en&lang=de`) into one list
pub fn languages_from_query(query: &str) -> Option<Vec<String>> {
    let values: Vec<String> = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "lang")
        .map(|(_, value)| value.into_owned())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(parse_language_list(&values.join(",")))
    }
}

/// Bind `bind` and serve until Ctrl-C or SIGTERM
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
