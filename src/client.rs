//! HTTP client for the chemistry-data service (primary POST/JSON integration).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{Result, SdsConsoleError};
use crate::report::{GenerateResponse, ReportDocument, ValidationResponse};

/// Outcome of the startup liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    ReachableOk,
    ReachableError,
    Unreachable,
}

impl Liveness {
    pub fn label(&self) -> &'static str {
        match self {
            Liveness::ReachableOk => "backend ok",
            Liveness::ReachableError => "backend error",
            Liveness::Unreachable => "backend unreachable",
        }
    }
}

/// Export payload formats offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Json,
}

impl ExportFormat {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "/api/sds/docx",
            ExportFormat::Json => "/api/sds/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Json => "json",
        }
    }
}

/// Report generation and export, the surface both integrations share.
#[async_trait]
pub trait SdsBackend: Send + Sync {
    async fn generate(&self, smiles: &str) -> Result<ReportDocument>;
    async fn export(&self, smiles: &str, format: ExportFormat) -> Result<Vec<u8>>;
}

pub struct SdsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SdsClient {
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

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Single fire-and-forget probe; never an error, only one of three states.
    pub async fn health(&self) -> Liveness {
        match self.http.get(self.url("/api/health")).send().await {
            Ok(resp) if resp.status().is_success() => Liveness::ReachableOk,
            Ok(_) => Liveness::ReachableError,
            Err(_) => Liveness::Unreachable,
        }
    }

    pub async fn validate(&self, smiles: &str) -> Result<ValidationResponse> {
        let resp = self
            .http
            .post(self.url("/api/validate"))
            .json(&json!({ "smiles": smiles }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<ValidationResponse>().await?)
    }

    async fn fetch_bytes(&self, path: &str, smiles: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .post(self.url(path))
            .json(&json!({ "smiles": smiles }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SdsBackend for SdsClient {
    async fn generate(&self, smiles: &str) -> Result<ReportDocument> {
        let resp = self
            .http
            .post(self.url("/api/sds"))
            .json(&json!({ "smiles": smiles }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let payload = resp.json::<GenerateResponse>().await?;
        Ok(payload.into_document())
    }

    async fn export(&self, smiles: &str, format: ExportFormat) -> Result<Vec<u8>> {
        self.fetch_bytes(format.endpoint(), smiles).await
    }
}

/// Turn a non-2xx response into an [`SdsConsoleError::Api`], reading the
/// body once for a JSON error message.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

/// Non-2xx mapping: prefer a JSON `error`/`message`/`detail` field, fall back
/// to the bare status code.
pub fn api_error(status: u16, body: &str) -> SdsConsoleError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message", "detail"]
                .iter()
                .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {status}"));
    SdsConsoleError::Api { status, message }
}
