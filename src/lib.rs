//! Variant Tracker - Clinical variant tracking API with a redacted audit trail.

pub mod audit;
pub mod config;
pub mod redact;
pub mod server;
pub mod store;
pub mod structure;
