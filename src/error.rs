use crate::webhook::WebhookError;

/// Message shown for any transport or webhook-side failure. The cause is
/// logged, not surfaced; the form only ever shows this one line.
pub const GENERIC_UPLOAD_ERROR: &str =
    "Error uploading file. Make sure the automation service is running.";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(String),
    #[error("a submission is already in progress")]
    Busy,
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

impl SubmitError {
    /// Returns the user-facing message for display in the form.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(message) => message.clone(),
            SubmitError::Busy => "A submission is already in progress.".to_string(),
            SubmitError::Webhook(_) => GENERIC_UPLOAD_ERROR.to_string(),
        }
    }
}
