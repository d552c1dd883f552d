//! Huddle HTTP server
//!
//! Serves the token endpoint and the board API over axum.

mod board;
mod error;
mod token;

pub use error::{ApiError, ApiResult};
pub use token::TokenResponse;

use crate::config::AppCredentials;
use crate::storage::BoardStore;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when the signing credentials are not configured; the token
    /// endpoint then answers 500 while the board keeps working
    pub credentials: Option<Arc<AppCredentials>>,
    pub store: Arc<dyn BoardStore>,
}

impl AppState {
    pub fn new(credentials: Option<AppCredentials>, store: Arc<dyn BoardStore>) -> Self {
        if credentials.is_none() {
            warn!("Signing credentials not configured, /api/token will fail");
        }
        Self {
            credentials: credentials.map(Arc::new),
            store,
        }
    }
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/token", get(token::issue_token))
        .route("/api/dashboard", get(board::dashboard))
        .route("/api/board", get(board::board_columns))
        .route("/api/tasks", get(board::list_tasks))
        .route(
            "/api/tasks/{id}",
            get(board::get_task)
                .patch(board::update_task)
                .delete(board::reject_task),
        )
        .route("/api/tasks/{id}/approve", post(board::approve_task))
        .route("/api/meetings", get(board::list_meetings))
        .route("/api/meetings/{id}", get(board::get_meeting))
        .route("/api/team", get(board::team))
        .route("/api/review", get(board::review))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Bind and serve until `shutdown` resolves
pub async fn run_server<F>(bind_addr: SocketAddr, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
