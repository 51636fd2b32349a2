//! HTTP API server
//!
//! Builds the axum router over the feedback store, submission handler, and
//! voice clip store, and serves it with alternative-port fallback so a
//! second instance on the same host still comes up.

use super::{feedback, voice};
use crate::config::AtelierConfig;
use crate::error::AtelierError;
use crate::store::{voice::VoiceStore, FeedbackStore};
use crate::submission::SubmissionHandler;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FeedbackStore>,
    pub voice: Arc<VoiceStore>,
    pub submissions: Arc<SubmissionHandler>,
    pub instance_id: String,
}

impl AppState {
    /// Build state over the configured data directory
    pub fn new(config: &AtelierConfig) -> Self {
        let store = Arc::new(FeedbackStore::new(config.feedback_file()));
        let voice = Arc::new(VoiceStore::new(config.voice_dir()));
        let submissions = Arc::new(SubmissionHandler::new(store.clone(), voice.clone()));
        let instance_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        Self {
            store,
            voice,
            submissions,
            instance_id,
        }
    }
}

/// API server
pub struct ApiServer {
    config: AtelierConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new API server over the given configuration
    pub fn new(config: AtelierConfig) -> Self {
        let state = AppState::new(&config);
        Self { config, state }
    }

    /// Instance ID
    pub fn instance_id(&self) -> &str {
        &self.state.instance_id
    }

    /// Build router
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            // Feedback submission and listing
            .route(
                "/feedback",
                post(feedback::submit_feedback)
                    .get(feedback::list_feedback)
                    .fallback(method_not_allowed),
            )
            // Standalone voice clips
            .route(
                "/feedback/voice",
                post(voice::upload_clip)
                    .get(voice::get_clip)
                    .fallback(method_not_allowed),
            )
            .route("/feedback/voice/:file", get(voice::get_clip_by_path))
            // Dashboard analytics
            .route(
                "/analytics",
                get(feedback::analytics).fallback(method_not_allowed),
            )
            // Health check
            .route("/health", get(health_handler))
            .fallback(not_found)
            // State
            .with_state(state)
            // Middleware
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start serving with dynamic port allocation
    ///
    /// Tries the configured address first, then attempts alternative ports
    /// if the primary port is unavailable.
    pub async fn serve(self) -> anyhow::Result<()> {
        // Data directory and backing files exist before the first request
        self.state.store.init().await?;
        self.state.voice.init().await?;

        let router = Self::build_router(self.state.clone());

        match tokio::net::TcpListener::bind(self.config.addr).await {
            Ok(listener) => {
                info!(
                    "Atelier API [{}] listening on http://{}",
                    self.state.instance_id, self.config.addr
                );
                axum::serve(listener, router).await?;
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!(
                    "Port {} in use, trying alternative ports...",
                    self.config.addr.port()
                );
            }
            Err(e) => return Err(e.into()),
        }

        let base_port = self.config.addr.port();
        for offset in 1..=10 {
            let alt_addr = SocketAddr::new(self.config.addr.ip(), base_port + offset);
            match tokio::net::TcpListener::bind(alt_addr).await {
                Ok(listener) => {
                    info!(
                        "Atelier API [{}] listening on http://{}",
                        self.state.instance_id, alt_addr
                    );
                    axum::serve(listener, router).await?;
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(anyhow::anyhow!(
            "All ports ({}-{}) are in use. API server unavailable for instance {}.",
            base_port,
            base_port + 10,
            self.state.instance_id
        ))
    }
}

/// 405 for known paths hit with an unsupported method
async fn method_not_allowed() -> AtelierError {
    AtelierError::MethodNotAllowed
}

/// 404 envelope for unknown paths
async fn not_found() -> AtelierError {
    AtelierError::NotFound("No such endpoint".to_string())
}

/// Health check handler
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    instance_id: String,
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instance_id: state.instance_id.clone(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> AtelierConfig {
        AtelierConfig {
            data_dir: PathBuf::from(dir.path()),
            addr: ([127, 0, 0, 1], 0).into(),
        }
    }

    #[tokio::test]
    async fn test_server_creation() {
        let dir = TempDir::new().unwrap();
        let server = ApiServer::new(test_config(&dir));
        assert_eq!(server.instance_id().len(), 8);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(&test_config(&dir));
        let instance_id = state.instance_id.clone();

        let (status, response) = health_handler(axum::extract::State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.0.status, "ok");
        assert_eq!(response.0.instance_id, instance_id);
    }
}
