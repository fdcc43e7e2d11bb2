//! The exchange with the external automation workflow. The workflow is an
//! opaque collaborator: one multipart POST in, one evaluation JSON out.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::evaluation::EvaluationResponse;
use crate::submission::Submission;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode webhook response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Backend that evaluates one submission. The production implementation is
/// [`WebhookClient`]; tests substitute scripted ones.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    async fn evaluate(&self, submission: &Submission) -> Result<EvaluationResponse, WebhookError>;
}

/// reqwest client bound to the configured webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_form(submission: &Submission) -> Result<reqwest::multipart::Form, WebhookError> {
        let audio = reqwest::multipart::Part::bytes(submission.audio.bytes.clone())
            .file_name(submission.audio.filename.clone())
            .mime_str(&submission.audio.content_type)?;

        Ok(reqwest::multipart::Form::new()
            .part("audio", audio)
            .text("question", submission.question.clone())
            .text("level", submission.level.to_string()))
    }
}

#[async_trait]
impl EvaluationBackend for WebhookClient {
    async fn evaluate(&self, submission: &Submission) -> Result<EvaluationResponse, WebhookError> {
        let form = Self::build_form(submission)?;

        debug!(
            url = %self.url,
            filename = %submission.audio.filename,
            level = submission.level,
            "forwarding submission to webhook"
        );

        let response = self.client.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!(%status, "webhook rejected submission: {}", body);
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: EvaluationResponse = serde_json::from_str(&body)?;
        debug!(
            transcription_len = parsed.transcription.len(),
            metrics = parsed.evaluation.len(),
            "webhook evaluation received"
        );
        Ok(parsed)
    }
}
