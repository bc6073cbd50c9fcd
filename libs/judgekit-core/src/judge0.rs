//! Execution Adapter - Judge0 REST protocol
//!
//! Submissions are created with `wait=false` and then polled until they leave
//! the queue. Sandboxing is entirely the execution service's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::JudgeConfig;
use crate::error::ExecutionError;

/// Judge0 status ids
pub mod status {
    pub const IN_QUEUE: u32 = 1;
    pub const PROCESSING: u32 = 2;
    pub const ACCEPTED: u32 = 3;
    pub const WRONG_ANSWER: u32 = 4;
    pub const TIME_LIMIT_EXCEEDED: u32 = 5;
    pub const COMPILATION_ERROR: u32 = 6;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub source_code: String,
    pub language_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_time_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
}

impl Submission {
    pub fn new(source_code: impl Into<String>, language_id: u32) -> Self {
        Self {
            source_code: source_code.into(),
            language_id,
            stdin: None,
            cpu_time_limit: None,
            memory_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionToken {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStatus {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

impl SubmissionStatus {
    pub fn is_pending(&self) -> bool {
        self.id == status::IN_QUEUE || self.id == status::PROCESSING
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Seconds, as a decimal string
    #[serde(default)]
    pub time: Option<String>,
    /// Kilobytes
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

impl SubmissionResult {
    pub fn time_ms(&self) -> f64 {
        self.time
            .as_deref()
            .and_then(|t| t.trim().parse::<f64>().ok())
            .map(|seconds| seconds * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Polling budget for one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

#[async_trait]
pub trait ExecutionService: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionToken, ExecutionError>;

    async fn fetch(&self, token: &str) -> Result<SubmissionResult, ExecutionError>;
}

#[async_trait]
impl<T: ExecutionService + ?Sized> ExecutionService for Box<T> {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionToken, ExecutionError> {
        (**self).submit(submission).await
    }

    async fn fetch(&self, token: &str) -> Result<SubmissionResult, ExecutionError> {
        (**self).fetch(token).await
    }
}

/// Submit, then poll until the submission reaches a terminal status
#[instrument(skip(service, submission), fields(language_id = submission.language_id))]
pub async fn submit_and_wait<S>(
    service: &S,
    submission: &Submission,
    policy: &PollPolicy,
) -> Result<SubmissionResult, ExecutionError>
where
    S: ExecutionService + ?Sized,
{
    let token = service.submit(submission).await?;
    info!(token = %token.token, "Submission accepted by execution service");

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        let result = service.fetch(&token.token).await?;
        debug!(
            token = %token.token,
            attempt,
            status_id = result.status.id,
            status = %result.status.description,
            "Polled submission"
        );

        if !result.status.is_pending() {
            return Ok(result);
        }
    }

    Err(ExecutionError::Timeout {
        attempts: policy.max_attempts,
    })
}

/// Judge0 HTTP client
#[derive(Debug, Clone)]
pub struct Judge0Client {
    http: reqwest::Client,
    base_url: String,
    auth: Option<(String, String)>,
}

impl Judge0Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: None,
        }
    }

    pub fn with_auth(mut self, header: impl Into<String>, token: impl Into<String>) -> Self {
        self.auth = Some((header.into(), token.into()));
        self
    }

    pub fn from_config(config: &JudgeConfig) -> Self {
        let client = Self::new(&config.api_url);
        match &config.auth_token {
            Some(token) => client.with_auth(&config.auth_header, token),
            None => client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((header, token)) => request.header(header.as_str(), token.as_str()),
            None => request,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ExecutionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutionError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ExecutionService for Judge0Client {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionToken, ExecutionError> {
        let url = format!(
            "{}/submissions?base64_encoded=false&wait=false",
            self.base_url
        );
        let response = self
            .authorize(self.http.post(&url))
            .json(submission)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn fetch(&self, token: &str) -> Result<SubmissionResult, ExecutionError> {
        let url = format!("{}/submissions/{}?base64_encoded=false", self.base_url, token);
        let response = self.authorize(self.http.get(&url)).send().await?;
        Self::read_json(response).await
    }
}
