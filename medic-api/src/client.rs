//! HTTP client for the agent backend

use std::time::Duration;

use async_trait::async_trait;
use medic_core::sync::{DeploymentSource, RunSubmitter, StatusSource};
use medic_core::{ApiConfig, Config, DeploymentLookup, RunAccepted, RunRequest, RunStatus};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

const USER_AGENT: &str = concat!("medic/", env!("CARGO_PKG_VERSION"));

/// Client for the status, start-run and deployment-logs routes
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    status_url: Url,
    start_run_url: Url,
    deployment_logs_url: Url,
}

/// FastAPI-style error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiClient {
    /// Create a client for the given endpoints
    ///
    /// `timeout` bounds every request end to end.
    pub fn new(api: &ApiConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let client = Self {
            http,
            status_url: endpoint(&api.base_url, &api.status_path)?,
            start_run_url: endpoint(&api.base_url, &api.start_run_path)?,
            deployment_logs_url: endpoint(&api.base_url, &api.deployment_logs_path)?,
        };

        info!(base_url = %api.base_url, "Created agent backend client");
        Ok(client)
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api, config.sync.request_timeout)
    }

    /// Read the current run status
    pub async fn get_status(&self) -> Result<RunStatus> {
        debug!(url = %self.status_url, "Fetching run status");
        let response = self.http.get(self.status_url.clone()).send().await?;
        let response = success_or_status(response).await?;
        parse_json(response).await
    }

    /// Ask the backend to start a run
    pub async fn post_start_run(&self, request: &RunRequest) -> Result<RunAccepted> {
        debug!(url = %self.start_run_url, repo_url = %request.repo_url, "Starting run");
        let response = self
            .http
            .post(self.start_run_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(match rejection_reason(&body) {
                Some(reason) => Error::Rejected(reason),
                None => Error::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        parse_json(response).await
    }

    /// Look up the latest deployment of a repository
    pub async fn get_deployment_logs(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<DeploymentLookup> {
        let request = self.deployment_request(repo_url, token)?;
        debug!(url = %self.deployment_logs_url, repo_url, "Fetching deployment logs");
        let response = self.http.execute(request).await?;
        let response = success_or_status(response).await?;
        parse_json(response).await
    }

    fn deployment_request(&self, repo_url: &str, token: Option<&str>) -> Result<reqwest::Request> {
        let mut query = vec![("repo_url", repo_url)];
        if let Some(token) = token {
            query.push(("vercel_token", token));
        }
        Ok(self
            .http
            .get(self.deployment_logs_url.clone())
            .query(&query)
            .build()?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("status_url", &self.status_url.as_str())
            .field("start_run_url", &self.start_run_url.as_str())
            .field("deployment_logs_url", &self.deployment_logs_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self) -> medic_core::Result<RunStatus> {
        Ok(self.get_status().await?)
    }
}

#[async_trait]
impl DeploymentSource for ApiClient {
    async fn lookup_deployment(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> medic_core::Result<DeploymentLookup> {
        Ok(self.get_deployment_logs(repo_url, token).await?)
    }
}

#[async_trait]
impl RunSubmitter for ApiClient {
    async fn start_run(&self, request: &RunRequest) -> medic_core::Result<RunAccepted> {
        Ok(self.post_start_run(request).await?)
    }
}

/// Join a base URL and a route, keeping any path prefix on the base
fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    Ok(Url::parse(&format!("{}/{}", base, path))?)
}

async fn success_or_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response".to_string());
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Parse(e.to_string()))
}

/// Pull a human-readable reason out of an error body
fn rejection_reason(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(reason) if !reason.trim().is_empty() => Some(reason),
        serde_json::Value::Null => None,
        // Field-level validation errors come back as a list of objects
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join(", "))
            }
        }
        other => Some(other.to_string()),
    }
}
