//! Append-only audit trail of mutations.

mod auditor;
mod error;
mod types;

pub use auditor::{audit_action, AuditStore};
pub use error::AuditError;
pub use types::{normalize_entity_type, AuditAction, AuditRecord, NewAuditRecord, UNKNOWN_ENTITY_ID};
