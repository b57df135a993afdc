//! API HTTP server with axum router and graceful shutdown.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::ServerError;
use super::handlers::{
    create_comment, create_patient, create_prediction, create_risk_assessment, create_share,
    fetch_structure, get_patient, get_structure, get_variant, health, list_audit_logs,
    list_comments, list_patient_variants, list_patients, list_predictions, list_risk_assessments,
    list_shares, list_variants, upload_structure, upsert_variant,
};
use super::middleware::audit_requests;
use super::state::AppState;
use crate::config::ServerConfig;

/// HTTP server for the variant tracking API.
pub struct ApiServer {
    /// Server configuration.
    config: ServerConfig,
    /// Application state shared across handlers.
    state: AppState,
    /// Cancellation token for graceful shutdown.
    cancel: CancellationToken,
}

impl ApiServer {
    /// Create a new server.
    #[must_use]
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self {
            config,
            state,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the server when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/api/health", get(health))
            .route("/api/patients", get(list_patients).post(create_patient))
            .route("/api/patients/:id", get(get_patient))
            .route("/api/patients/:id/variants", get(list_patient_variants))
            .route(
                "/api/patients/:id/risk-assessments",
                get(list_risk_assessments).post(create_risk_assessment),
            )
            .route("/api/variants", get(list_variants).post(upsert_variant))
            .route("/api/variants/:id", get(get_variant))
            .route(
                "/api/variants/:id/predictions",
                get(list_predictions).post(create_prediction),
            )
            .route(
                "/api/variants/:id/comments",
                get(list_comments).post(create_comment),
            )
            .route(
                "/api/variants/:id/shares",
                get(list_shares).post(create_share),
            )
            .route("/api/audit-logs", get(list_audit_logs))
            .route("/api/structures/:uniprot_id", get(get_structure))
            .route("/api/structures/:uniprot_id/fetch", post(fetch_structure))
            .route("/api/structures/:uniprot_id/upload", put(upload_structure))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                audit_requests,
            ))
            .layer(DefaultBodyLimit::max(self.state.max_body_bytes))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server, binding to the configured address.
    ///
    /// The server will run until the cancellation token is triggered,
    /// at which point it will perform a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::BindError {
                address: addr.clone(),
                source,
            })?;

        tracing::info!(address = %addr, "Starting variant tracker API");
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let cancel = self.cancel.clone();
        let app = self.build_router();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("API server shutting down gracefully");
            })
            .await
            .map_err(ServerError::ServerError)
    }
}
