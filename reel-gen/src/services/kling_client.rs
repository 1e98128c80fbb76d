//! Kling AI text-to-video client
//!
//! Two endpoints: task submission and status-by-task-id.

use super::{build_http_client, error_for_status, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const KLING_BASE_URL: &str = "https://api.klingai.com";

/// Text-to-video task parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRequest {
    pub prompt: String,
    /// Clip length in seconds
    pub duration: u32,
    pub aspect_ratio: String,
    pub mode: String,
}

impl VideoRequest {
    /// Vertical 15 second clip in standard quality
    pub fn vertical_short(prompt: String) -> Self {
        Self {
            prompt,
            duration: 15,
            aspect_ratio: "9:16".to_string(),
            mode: "standard".to_string(),
        }
    }
}

/// Task state as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Still queued or rendering (carries the raw status text)
    Pending(String),
    Completed { video_url: Option<String> },
    Failed,
}

/// Asynchronous video generation backend
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Submit a generation task, returning its task id
    async fn submit(&self, request: &VideoRequest) -> Result<String, ProviderError>;

    /// Query the state of a submitted task
    async fn status(&self, task_id: &str) -> Result<TaskStatus, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    video_url: Option<String>,
}

impl From<StatusResponse> for TaskStatus {
    fn from(response: StatusResponse) -> Self {
        match response.status.as_str() {
            "completed" => TaskStatus::Completed {
                video_url: response.video_url.filter(|u| !u.trim().is_empty()),
            },
            "failed" => TaskStatus::Failed,
            _ => TaskStatus::Pending(response.status),
        }
    }
}

/// Interpret a non-2xx status reply
///
/// A body that still carries a task status is honoured, so a transient
/// upstream error while the task is pending does not end polling.
fn status_from_error_body(code: u16, body: String) -> Result<TaskStatus, ProviderError> {
    match serde_json::from_str::<StatusResponse>(&body) {
        Ok(parsed) if !parsed.status.trim().is_empty() => {
            tracing::warn!(code, status = %parsed.status, "Kling status reply with error code");
            Ok(parsed.into())
        }
        _ => Err(ProviderError::ApiError(code, body)),
    }
}

/// Kling AI API client
pub struct KlingClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl KlingClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn submit_url(&self) -> String {
        format!("{}/v1/videos/text2video", self.base_url)
    }

    fn status_url(&self, task_id: &str) -> String {
        format!("{}/v1/videos/{}", self.base_url, task_id)
    }
}

#[async_trait]
impl VideoProvider for KlingClient {
    fn name(&self) -> &'static str {
        "Kling"
    }

    async fn submit(&self, request: &VideoRequest) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .post(self.submit_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let task_id = submitted
            .task_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ProviderError::ParseError("response has no task_id".to_string()))?;

        tracing::info!(task_id = %task_id, "Kling video task submitted");
        Ok(task_id)
    }

    async fn status(&self, task_id: &str) -> Result<TaskStatus, ProviderError> {
        let response = self
            .http_client
            .get(self.status_url(task_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let code = response.status();
        if !code.is_success() {
            if code == reqwest::StatusCode::UNAUTHORIZED {
                return Err(error_for_status(response).await);
            }
            let body = response.text().await.unwrap_or_default();
            return status_from_error_body(code.as_u16(), body);
        }

        let status: StatusResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(status.into())
    }
}
