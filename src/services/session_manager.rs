//! Session Manager: lazily materializes per-client session state and owns
//! the deep analyzer cache invalidation rule (spec §4.6).
//!
//! Modeled on the teacher's `SessionService` (repository-backed CRUD plus
//! `#[instrument]`'d operations); the deep-analyzer cache-on-user-change
//! behavior is grounded on `app.py`'s `AppState.get_deep_analyzer`, which
//! keys its cache by session and drops the cached analyzer whenever the
//! bound user differs from the one it was built for.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DatasetDescriptor, LmContext, SessionState};

/// Coordinates session lifecycle and state for all connected clients.
///
/// Sessions are materialized lazily: the first operation referencing an
/// unknown `session_id` creates a fresh `SessionState` rather than erroring.
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Fetch a session, materializing it if this is the first reference.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, session_id: &str) -> SessionState {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(session_id))
            .clone()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Replace the bound dataset wholesale (spec §4.6: dataset updates
    /// replace, never merge).
    #[instrument(skip(self, dataset), err)]
    pub async fn update_dataset(&self, session_id: &str, dataset: DatasetDescriptor) -> DomainResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(session_id));
        session.current_dataset = Some(dataset);
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn update_model_config(&self, session_id: &str, model_config: LmContext) -> DomainResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(session_id));
        session.model_config = model_config;
        Ok(())
    }

    /// Bind a user to a session. If the session previously cached a deep
    /// analyzer for a *different* user, drop the cache — the cached
    /// analyzer's template preferences belong to the stale user.
    #[instrument(skip(self), err)]
    pub async fn set_user(&self, session_id: &str, user_id: &str) -> DomainResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(session_id));

        if session.deep_analyzer_user_id.as_deref() != Some(user_id) {
            session.deep_analyzer_user_id = None;
            session.current_deep_analysis_id = None;
        }
        session.user_id = Some(user_id.to_string());
        Ok(())
    }

    /// Mark that a deep analyzer has now been materialized for `user_id` on
    /// this session, so subsequent `set_user` calls with the same user don't
    /// invalidate it.
    #[instrument(skip(self), err)]
    pub async fn mark_deep_analyzer_ready(&self, session_id: &str, user_id: &str) -> DomainResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;
        session.deep_analyzer_user_id = Some(user_id.to_string());
        Ok(())
    }

    /// Whether this session currently has a ready (not-invalidated) deep
    /// analyzer for its bound user.
    #[instrument(skip(self))]
    pub async fn has_ready_deep_analyzer(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .is_some_and(|s| s.deep_analyzer_user_id.is_some() && s.deep_analyzer_user_id == s.user_id)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
