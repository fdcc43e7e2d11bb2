//! The submit action: validate the form, take the session's in-flight
//! slot, call the webhook, settle the session.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{SubmitError, GENERIC_UPLOAD_ERROR};
use crate::evaluation::sanitize_filename;
use crate::report::ReportView;
use crate::state::AppState;

/// Upload cap enforced at the HTTP layer before a submission is parsed.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub const MIN_LEVEL: u8 = 3;
pub const MAX_LEVEL: u8 = 5;
pub const DEFAULT_LEVEL: u8 = 5;

const NO_FILE_MESSAGE: &str = "Please select an audio file";

/// Raw form fields as they came off the wire, before validation.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub audio: Option<AudioUpload>,
    pub question: Option<String>,
    pub level: Option<String>,
    pub session: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A validated submission, consumed exactly once per submit action.
#[derive(Debug, Clone)]
pub struct Submission {
    pub audio: AudioUpload,
    pub question: String,
    pub level: u8,
}

impl SubmissionForm {
    /// Validates the form. Nothing reaches the webhook unless this passes.
    pub fn into_submission(self) -> Result<Submission, SubmitError> {
        let mut audio = self
            .audio
            .ok_or_else(|| SubmitError::Validation(NO_FILE_MESSAGE.to_string()))?;
        if audio.bytes.is_empty() {
            return Err(SubmitError::Validation(NO_FILE_MESSAGE.to_string()));
        }

        audio.filename = sanitize_filename(&audio.filename);
        if audio.content_type.trim().is_empty() {
            audio.content_type = "application/octet-stream".to_string();
        }

        let level = match self.level.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => DEFAULT_LEVEL,
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .filter(|level| (MIN_LEVEL..=MAX_LEVEL).contains(level))
                .ok_or_else(|| {
                    SubmitError::Validation(format!(
                        "Level must be a whole number between {} and {}",
                        MIN_LEVEL, MAX_LEVEL
                    ))
                })?,
        };

        Ok(Submission {
            audio,
            question: self.question.unwrap_or_default(),
            level,
        })
    }
}

/// Runs one submit action end to end for the given session.
pub async fn submit(
    state: &AppState,
    session_id: Uuid,
    form: SubmissionForm,
) -> Result<ReportView, SubmitError> {
    let submission = form.into_submission()?;

    {
        let mut session = state.sessions.entry(session_id).or_default();
        session.begin().map_err(|_| SubmitError::Busy)?;
    }

    info!(
        %session_id,
        filename = %submission.audio.filename,
        bytes = submission.audio.bytes.len(),
        level = submission.level,
        "submitting recording for evaluation"
    );

    let outcome = state.backend.evaluate(&submission).await;

    let mut session = state.sessions.entry(session_id).or_default();
    match outcome {
        Ok(response) => {
            let report = response.normalize();
            let view = ReportView::from_report(&report);
            session.complete(report);
            Ok(view)
        }
        Err(err) => {
            warn!(%session_id, error = %err, "webhook evaluation failed");
            session.fail(GENERIC_UPLOAD_ERROR);
            Err(SubmitError::Webhook(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upload() -> AudioUpload {
        AudioUpload {
            filename: "answer.wav".into(),
            content_type: "audio/wav".into(),
            bytes: vec![0u8; 16],
        }
    }

    fn form_with_audio() -> SubmissionForm {
        SubmissionForm {
            audio: Some(upload()),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_missing_file() {
        let err = SubmissionForm::default()
            .into_submission()
            .expect_err("no file must not validate");
        assert_eq!(err.user_message(), NO_FILE_MESSAGE);
    }

    #[test]
    fn rejects_empty_file() {
        let mut form = form_with_audio();
        form.audio.as_mut().unwrap().bytes.clear();
        let err = form.into_submission().expect_err("empty file must not validate");
        assert_eq!(err.user_message(), NO_FILE_MESSAGE);
    }

    #[test]
    fn defaults_question_and_level() {
        let submission = form_with_audio().into_submission().unwrap();
        assert_eq!(submission.question, "");
        assert_eq!(submission.level, DEFAULT_LEVEL);
    }

    #[test]
    fn accepts_levels_in_range() {
        for raw in ["3", "4", "5", " 4 "] {
            let mut form = form_with_audio();
            form.level = Some(raw.into());
            let submission = form.into_submission().unwrap();
            assert!((MIN_LEVEL..=MAX_LEVEL).contains(&submission.level));
        }
    }

    #[test]
    fn rejects_levels_out_of_range() {
        for raw in ["2", "6", "4.5", "five", "-1"] {
            let mut form = form_with_audio();
            form.level = Some(raw.into());
            assert!(
                form.into_submission().is_err(),
                "level {:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn sanitizes_filename_and_defaults_content_type() {
        let mut form = form_with_audio();
        {
            let audio = form.audio.as_mut().unwrap();
            audio.filename = "../../etc/answer?.wav".into();
            audio.content_type = "  ".into();
        }
        let submission = form.into_submission().unwrap();
        assert_eq!(submission.audio.filename, "answer_.wav");
        assert_eq!(submission.audio.content_type, "application/octet-stream");
    }
}
