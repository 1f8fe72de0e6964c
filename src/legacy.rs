//! Legacy integration: GET with a `smiles` query parameter against a second
//! deployed origin. Not wire-compatible with the primary client; it only
//! exposes report generation and the two export endpoints.

use std::time::Duration;

use async_trait::async_trait;

use crate::client::{ExportFormat, SdsBackend, check_status};
use crate::error::{Result, SdsConsoleError};
use crate::report::{GenerateResponse, ReportDocument};

pub struct LegacySdsClient {
    http: reqwest::Client,
    base_url: String,
}

impl LegacySdsClient {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| SdsConsoleError::Internal {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, path: &str, smiles: &str) -> Result<reqwest::Response> {
        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(&[("smiles", smiles)])
            .send()
            .await?;
        check_status(resp).await
    }
}

#[async_trait]
impl SdsBackend for LegacySdsClient {
    async fn generate(&self, smiles: &str) -> Result<ReportDocument> {
        let resp = self.get("/api/sds", smiles).await?;
        let payload = resp.json::<GenerateResponse>().await?;
        Ok(payload.into_document())
    }

    async fn export(&self, smiles: &str, format: ExportFormat) -> Result<Vec<u8>> {
        let resp = self.get(format.endpoint(), smiles).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}
