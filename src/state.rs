use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::config::Config;
use crate::session::PracticeSession;
use crate::webhook::{EvaluationBackend, WebhookClient};

/// Shared application state: immutable configuration, the evaluation
/// backend, and the per-client practice sessions.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn EvaluationBackend>,
    pub sessions: Arc<DashMap<Uuid, PracticeSession>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let backend = Arc::new(WebhookClient::new(config.webhook.url.clone()));
        Self::with_backend(config, backend)
    }

    /// Constructs state around a non-default backend. Tests use this to
    /// substitute a scripted implementation.
    pub fn with_backend(config: Config, backend: Arc<dyn EvaluationBackend>) -> Self {
        Self {
            config,
            backend,
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn create_session(&self) -> Uuid {
        let session_id = Uuid::new_v4();
        self.sessions.insert(session_id, PracticeSession::default());
        session_id
    }
}
