//! Per-client submission state. One session holds at most one in-flight
//! submission and at most one of: a completed report, a failure message.

use chrono::{DateTime, Utc};

use crate::evaluation::EvaluationReport;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Submitting,
    Complete(EvaluationReport),
    Failed(String),
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Complete(_) => "complete",
            SessionPhase::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a submission is already in progress")]
pub struct SubmissionInFlight;

#[derive(Debug, Clone)]
pub struct PracticeSession {
    phase: SessionPhase,
    changed_at: DateTime<Utc>,
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            changed_at: Utc::now(),
        }
    }
}

impl PracticeSession {
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitting)
    }

    pub fn report(&self) -> Option<&EvaluationReport> {
        match &self.phase {
            SessionPhase::Complete(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            SessionPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Takes the in-flight slot. Rejected while a submission is pending;
    /// otherwise any prior report or error is cleared here, before the
    /// webhook is contacted.
    pub fn begin(&mut self) -> Result<(), SubmissionInFlight> {
        if self.is_submitting() {
            return Err(SubmissionInFlight);
        }
        self.set_phase(SessionPhase::Submitting);
        Ok(())
    }

    pub fn complete(&mut self, report: EvaluationReport) {
        self.set_phase(SessionPhase::Complete(report));
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.set_phase(SessionPhase::Failed(message.into()));
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.changed_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_report() -> EvaluationReport {
        EvaluationReport {
            transcription: "hello".into(),
            scores: vec![],
            suggestions: vec![],
            length: None,
        }
    }

    #[test]
    fn begin_is_rejected_while_submitting() {
        let mut session = PracticeSession::default();
        session.begin().expect("idle session accepts a submission");
        assert_eq!(session.begin(), Err(SubmissionInFlight));
        assert!(session.is_submitting());
    }

    #[test]
    fn begin_clears_prior_result() {
        let mut session = PracticeSession::default();
        session.begin().unwrap();
        session.complete(sample_report());
        assert!(session.report().is_some());

        session.begin().expect("completed session accepts a new submission");
        assert!(session.report().is_none());
        assert!(session.error().is_none());
        assert!(session.is_submitting());
    }

    #[test]
    fn begin_clears_prior_error() {
        let mut session = PracticeSession::default();
        session.begin().unwrap();
        session.fail("boom");
        assert_eq!(session.error(), Some("boom"));

        session.begin().expect("failed session accepts a new submission");
        assert!(session.error().is_none());
    }

    #[test]
    fn result_and_error_are_mutually_exclusive() {
        let mut session = PracticeSession::default();
        session.begin().unwrap();
        session.complete(sample_report());
        assert!(session.error().is_none());

        session.begin().unwrap();
        session.fail("boom");
        assert!(session.report().is_none());
    }
}
