//! Protein structure lookup, download and caching.

mod cache;
mod client;
mod error;

pub use cache::{fetch_and_cache, save_upload, structure_path, validate_uniprot_id, FetchOutcome};
pub use client::StructureClient;
pub use error::StructureError;
