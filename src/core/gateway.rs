//! Persistence gateway
//!
//! Mediates prompt and category writes against a [`RecordStore`], requiring a
//! live session for each call and snapshotting the previous title and content
//! into the version history whenever an update changes the content.

use crate::core::data::{
    CategoryRecord, NewCategory, NewPromptVersion, Prompt, PromptDraft, PromptVersion, Session,
};
use crate::core::traits::{RecordStore, SessionProvider};
use crate::utils::error::{AppError, AppResult};
use chrono::Utc;
use std::sync::Arc;

pub struct PersistenceGateway {
    store: Arc<dyn RecordStore>,
    sessions: Arc<dyn SessionProvider>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn RecordStore>, sessions: Arc<dyn SessionProvider>) -> Self {
        Self { store, sessions }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionProvider> {
        &self.sessions
    }

    /// The current session, or `Unauthenticated` when absent or expired
    pub async fn require_session(&self) -> AppResult<Session> {
        match self.sessions.current_session().await? {
            Some(session) if !session.is_expired(Utc::now()) => Ok(session),
            Some(_) => {
                tracing::debug!("session expired");
                Err(AppError::unauthenticated())
            }
            None => Err(AppError::unauthenticated()),
        }
    }

    /// Create the prompt when the draft has no id, update it otherwise
    pub async fn save(&self, draft: PromptDraft) -> AppResult<Prompt> {
        let session = self.require_session().await?;

        match draft.id.clone() {
            Some(id) => self.update(&session, &id, draft).await,
            None => {
                let row = draft.into_new_prompt(&session.user.id);
                let created = self.store.insert_prompt(&session, &row).await?;
                tracing::debug!(id = %created.id, "prompt created");
                Ok(created)
            }
        }
    }

    async fn update(&self, session: &Session, id: &str, draft: PromptDraft) -> AppResult<Prompt> {
        let current = self.store.select_prompt(session, id).await?;

        if let Some(current) = &current
            && let Some(content) = &draft.content
            && *content != current.content
        {
            // Two separate calls: a failed update below leaves this snapshot behind.
            let snapshot = NewPromptVersion {
                prompt_id: id.to_string(),
                title: current.title.clone(),
                content: current.content.clone(),
            };
            let version = self.store.insert_version(session, &snapshot).await?;
            tracing::debug!(prompt_id = %id, version_id = %version.id, "version recorded");
        }

        let now = Utc::now();
        let updated_at = match &current {
            Some(current) if current.updated_at > now => current.updated_at,
            _ => now,
        };

        let updated = self
            .store
            .update_prompt(session, id, &draft.into_changes(updated_at))
            .await
            .inspect_err(|e| tracing::warn!(prompt_id = %id, error = %e, "prompt update failed"))?;

        tracing::debug!(id = %updated.id, "prompt updated");
        Ok(updated)
    }

    /// Hard delete by id; versions of the prompt are left in place
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let session = self.require_session().await?;
        self.store.delete_prompt(&session, id).await?;
        tracing::debug!(id = %id, "prompt deleted");
        Ok(())
    }

    /// All prompts of the session owner, newest-created first
    pub async fn list(&self) -> AppResult<Vec<Prompt>> {
        let session = self.require_session().await?;
        self.store.select_prompts(&session).await
    }

    /// Version history, newest first; any failure yields an empty list
    pub async fn list_versions(&self, prompt_id: &str) -> Vec<PromptVersion> {
        match self.try_list_versions(prompt_id).await {
            Ok(versions) => versions,
            Err(e) => {
                tracing::warn!(prompt_id = %prompt_id, error = %e, "failed to load versions");
                Vec::new()
            }
        }
    }

    /// Version history with failures surfaced
    pub async fn try_list_versions(&self, prompt_id: &str) -> AppResult<Vec<PromptVersion>> {
        let session = self.require_session().await?;
        self.store.select_versions(&session, prompt_id).await
    }

    /// User categories; failures yield an empty list so built-ins stay usable
    pub async fn list_categories(&self) -> Vec<CategoryRecord> {
        let result = match self.require_session().await {
            Ok(session) => self.store.select_categories(&session).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load categories");
            Vec::new()
        })
    }

    pub async fn save_category(&self, name: &str, color: &str) -> AppResult<CategoryRecord> {
        let session = self.require_session().await?;
        let row = NewCategory {
            user_id: session.user.id.clone(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.store.insert_category(&session, &row).await
    }
}
