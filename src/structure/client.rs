//! HTTP client for the structure prediction service.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::error::StructureError;
use crate::config::StructureConfig;

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of the prediction listing for an accession.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionEntry {
    #[serde(default)]
    pdb_url: Option<String>,
}

/// Client for looking up and downloading predicted structures.
///
/// Requests are made once; failures are reported to the caller, never retried.
#[derive(Debug, Clone)]
pub struct StructureClient {
    client: Client,
    base_url: Url,
    max_model_bytes: usize,
}

impl StructureClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &StructureConfig) -> Result<Self, StructureError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| StructureError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(StructureError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            max_model_bytes: config.max_model_bytes,
        })
    }

    /// URL of the prediction listing for an accession.
    #[must_use]
    pub fn prediction_url(&self, uniprot_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("prediction").push(uniprot_id);
        }
        url
    }

    /// Look up the model file URL for an accession.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service answers with a
    /// non-success status, or no entry carries a model URL.
    pub async fn model_url(&self, uniprot_id: &str) -> Result<String, StructureError> {
        let url = self.prediction_url(uniprot_id);
        tracing::debug!(url = %url, "Looking up structure prediction");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StructureError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let entries: Vec<PredictionEntry> = response.json().await?;
        entries
            .into_iter()
            .find_map(|entry| entry.pdb_url)
            .ok_or_else(|| StructureError::MissingModel(uniprot_id.to_string()))
    }

    /// Download a model file.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success, or
    /// the model is larger than the configured limit.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, StructureError> {
        tracing::debug!(url = %url, "Downloading structure model");

        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StructureError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let too_large = || StructureError::ModelTooLarge {
            url: url.to_string(),
            limit: self.max_model_bytes,
        };
        let declared = response.content_length().unwrap_or(0);
        if declared > u64::try_from(self.max_model_bytes).unwrap_or(u64::MAX) {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong, so the limit is checked per chunk too.
        let mut contents = Vec::with_capacity(usize::try_from(declared).unwrap_or(0));
        while let Some(chunk) = response.chunk().await? {
            if contents.len() + chunk.len() > self.max_model_bytes {
                return Err(too_large());
            }
            contents.extend_from_slice(&chunk);
        }
        Ok(contents)
    }
}
