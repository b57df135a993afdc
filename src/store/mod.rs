//! `SQLite` persistence for tracked entities and the audit log.

mod audit_log;
mod database;
mod error;
mod models;
mod patients;
mod schema;
mod social;
mod structures;
mod variants;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use schema::{SCHEMA, SCHEMA_VERSION};
