//! HTTP API for patients, variants, structures and the audit log.

mod api;
mod error;
mod handlers;
mod middleware;
#[allow(clippy::module_inception)]
mod server;
mod state;

pub use api::{
    user_id, AuditLogQuery, ErrorBody, HealthResponse, VariantsQuery, MAX_AUDIT_LIMIT,
    USER_ID_HEADER,
};
pub use error::{ApiError, ServerError};
pub use server::ApiServer;
pub use state::AppState;
