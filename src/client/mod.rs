//! HTTP client for the execution engine and the account backend.

pub mod poller;
mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::logs::{self, LogEntry};
use crate::model::template::WorkflowTemplate;
use crate::model::{Balance, Transaction};

pub use poller::{LogPoller, PollUpdate};
pub use types::{GeneratedGraph, GeneratedWorkflow};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client")]
    Init(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("unexpected response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can produce the full log of an execution.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch_logs(&self, execution_id: &str) -> Result<Vec<LogEntry>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct EngineClient {
    http: reqwest::Client,
    engine_url: String,
    backend_url: String,
}

impl EngineClient {
    pub fn new(engine_url: &str, backend_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("defi-canvas/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Init)?;
        Ok(EngineClient {
            http,
            engine_url: engine_url.trim_end_matches('/').to_string(),
            backend_url: backend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn engine_url(&self) -> &str {
        &self.engine_url
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Submit a workflow for execution; returns the execution id.
    pub async fn start_workflow(&self, template: &WorkflowTemplate) -> Result<String, ClientError> {
        let url = format!("{}/workflow", self.engine_url);
        let body = self.post_text(&url, template).await?;
        let started: types::StartResponse = parse(&url, &body)?;
        tracing::info!(execution_id = %started.execution_id, "workflow started");
        Ok(started.execution_id)
    }

    pub async fn stop_workflow(&self, execution_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/workflow/stop", self.engine_url);
        self.post_text(&url, &types::StopRequest { execution_id }).await?;
        tracing::info!(%execution_id, "workflow stop requested");
        Ok(())
    }

    pub async fn fetch_balances(&self, address: &str) -> Result<Vec<Balance>, ClientError> {
        let url = format!("{}/balances/{address}", self.backend_url);
        self.get_json(&url).await
    }

    pub async fn fetch_transactions(&self, address: &str) -> Result<Vec<Transaction>, ClientError> {
        let url = format!("{}/transactions/{address}", self.backend_url);
        self.get_json(&url).await
    }

    /// Ask the backend to draft a workflow from a natural-language prompt.
    pub async fn generate_workflow(&self, prompt: &str) -> Result<GeneratedWorkflow, ClientError> {
        let url = format!("{}/api/ai/generate-workflow", self.backend_url);
        let body = self.post_text(&url, &types::GenerateRequest { prompt }).await?;
        parse(&url, &body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let body = self.get_text(url).await?;
        parse(url, &body)
    }

    async fn get_text(&self, url: &str) -> Result<String, ClientError> {
        tracing::debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| network(url, source))?;
        read_body(url, resp).await
    }

    async fn post_text<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String, ClientError> {
        tracing::debug!(%url, "POST");
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| network(url, source))?;
        read_body(url, resp).await
    }
}

#[async_trait]
impl LogSource for EngineClient {
    async fn fetch_logs(&self, execution_id: &str) -> Result<Vec<LogEntry>, ClientError> {
        let url = format!("{}/logs/{execution_id}", self.engine_url);
        let body = self.get_text(&url).await?;
        logs::parse_entries(&body).map_err(|source| ClientError::Parse { url, source })
    }
}

async fn read_body(url: &str, resp: reqwest::Response) -> Result<String, ClientError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|source| network(url, source))?;
    if !status.is_success() {
        return Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn parse<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|source| ClientError::Parse {
        url: url.to_string(),
        source,
    })
}

fn network(url: &str, source: reqwest::Error) -> ClientError {
    ClientError::Network {
        url: url.to_string(),
        source,
    }
}
