//! View controller
//!
//! Owns the in-memory prompt and category lists, the active query and the
//! transient notification. CRUD actions are only reachable in
//! [`VaultMode::Ready`]; every successful mutation is followed by a reload.

use crate::core::assist::Assistant;
use crate::core::data::{
    Category, CategoryRecord, Prompt, PromptDraft, PromptVersion, UserProfile, merge_categories,
};
use crate::core::filter::{self, PromptQuery};
use crate::core::gateway::PersistenceGateway;
use crate::utils::error::{AppError, AppResult};
use crate::utils::export::{self, ExportFormat, ExportPayload};
use chrono::{DateTime, Duration, Local, Utc};

/// How long a notification stays visible
pub const NOTIFICATION_TTL_SECS: i64 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum VaultMode {
    Unauthenticated,
    Loading,
    Ready,
    /// Startup failed; the only way out is [`VaultController::start`] again
    Blocked(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

pub struct VaultController {
    gateway: PersistenceGateway,
    mode: VaultMode,
    user: Option<UserProfile>,
    prompts: Vec<Prompt>,
    categories: Vec<CategoryRecord>,
    query: PromptQuery,
    notification: Option<Notification>,
}

impl VaultController {
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self {
            gateway,
            mode: VaultMode::Unauthenticated,
            user: None,
            prompts: Vec::new(),
            categories: Vec::new(),
            query: PromptQuery::default(),
            notification: None,
        }
    }

    pub fn mode(&self) -> &VaultMode {
        &self.mode
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Resolve the session and load data; connectivity failures block the vault
    pub async fn start(&mut self) {
        self.mode = VaultMode::Loading;

        match self.gateway.sessions().current_session().await {
            Ok(Some(session)) if !session.is_expired(Utc::now()) => {
                self.on_session_changed(Some(session.user)).await;
            }
            Ok(_) => self.on_session_changed(None).await,
            Err(e) if e.is_blocking() => {
                tracing::error!(error = %e, "failed to initialise session");
                self.mode = VaultMode::Blocked(e.to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed");
                self.on_session_changed(None).await;
                self.notify(NotificationKind::Error, &format!("Error: {}", e));
            }
        }
    }

    /// Login/logout notification from the session provider
    pub async fn on_session_changed(&mut self, user: Option<UserProfile>) {
        match user {
            Some(user) => {
                self.user = Some(user);
                self.mode = VaultMode::Ready;
                self.reload().await;
            }
            None => {
                self.user = None;
                self.prompts.clear();
                self.categories.clear();
                self.mode = VaultMode::Unauthenticated;
            }
        }
    }

    pub async fn sign_out(&mut self) -> AppResult<()> {
        self.gateway.sessions().sign_out().await?;
        self.on_session_changed(None).await;
        Ok(())
    }

    /// Replace both lists wholesale; on failure the previous lists are kept
    pub async fn reload(&mut self) {
        if self.user.is_none() {
            return;
        }
        let (prompts, categories) =
            tokio::join!(self.gateway.list(), self.gateway.list_categories());

        match prompts {
            Ok(prompts) => {
                self.prompts = prompts;
                self.categories = categories;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to reload prompts");
                self.notify(NotificationKind::Error, "Failed to load remote data");
            }
        }
    }

    fn ensure_ready(&self) -> AppResult<()> {
        match &self.mode {
            VaultMode::Ready => Ok(()),
            VaultMode::Blocked(reason) => Err(AppError::Connectivity(reason.clone())),
            _ => Err(AppError::unauthenticated()),
        }
    }

    /// Create or update a prompt, then reload
    pub async fn save(&mut self, draft: PromptDraft) -> AppResult<Prompt> {
        self.ensure_ready()?;
        let is_update = draft.id.is_some();

        match self.gateway.save(draft).await {
            Ok(prompt) => {
                self.reload().await;
                let msg = if is_update { "Prompt updated" } else { "Prompt saved" };
                self.notify(NotificationKind::Success, msg);
                Ok(prompt)
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &format!("Error: {}", e));
                Err(e)
            }
        }
    }

    pub async fn delete(&mut self, id: &str) -> AppResult<()> {
        self.ensure_ready()?;

        match self.gateway.delete(id).await {
            Ok(()) => {
                self.reload().await;
                self.notify(NotificationKind::Info, "Prompt deleted");
                Ok(())
            }
            Err(e) => {
                self.notify(NotificationKind::Error, "Failed to delete prompt");
                Err(e)
            }
        }
    }

    /// Flip the favorite flag locally, then write it through the gateway
    ///
    /// A failed write leaves the local flip in place until the next reload.
    pub async fn toggle_favorite(&mut self, id: &str) -> AppResult<bool> {
        self.ensure_ready()?;

        let prompt = self
            .prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Prompt '{}'", id)))?;
        prompt.favorite = !prompt.favorite;
        let favorite = prompt.favorite;
        let draft = prompt.to_draft();

        match self.gateway.save(draft).await {
            Ok(_) => {
                let msg = if favorite { "Added to favorites" } else { "Removed from favorites" };
                self.notify(NotificationKind::Success, msg);
                Ok(favorite)
            }
            Err(e) => {
                tracing::warn!(prompt_id = %id, error = %e, "favorite write failed");
                self.notify(NotificationKind::Error, "Sync error");
                Err(e)
            }
        }
    }

    pub async fn add_category(&mut self, name: &str, color: &str) -> AppResult<CategoryRecord> {
        self.ensure_ready()?;
        match self.gateway.save_category(name, color).await {
            Ok(record) => {
                self.reload().await;
                self.notify(NotificationKind::Success, &format!("Category '{}' created", name));
                Ok(record)
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &format!("Error: {}", e));
                Err(e)
            }
        }
    }

    /// Version history for the edit form; empty when unavailable
    pub async fn versions(&self, prompt_id: &str) -> Vec<PromptVersion> {
        self.gateway.list_versions(prompt_id).await
    }

    pub fn find(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    /// Find by exact id, then id prefix, then case-insensitive title
    pub fn resolve(&self, identifier: &str) -> Option<&Prompt> {
        self.find(identifier)
            .or_else(|| {
                let mut matches = self.prompts.iter().filter(|p| p.id.starts_with(identifier));
                match (matches.next(), matches.next()) {
                    (Some(only), None) => Some(only),
                    _ => None,
                }
            })
            .or_else(|| {
                let wanted = identifier.to_lowercase();
                self.prompts.iter().find(|p| p.title.to_lowercase() == wanted)
            })
    }

    // ========== Query ==========

    pub fn query(&self) -> &PromptQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: PromptQuery) {
        self.query = query;
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.query.text = text.to_string();
    }

    /// The displayed list for the current query
    pub fn visible(&self) -> Vec<Prompt> {
        self.visible_at(&Local::now())
    }

    pub fn visible_at<Tz: chrono::TimeZone>(&self, now: &DateTime<Tz>) -> Vec<Prompt> {
        filter::apply(&self.prompts, &self.query, now)
    }

    /// Built-in categories merged with the user's own
    pub fn all_categories(&self) -> Vec<Category> {
        merge_categories(&self.categories)
    }

    /// Export the currently displayed list
    pub fn export(&mut self, format: ExportFormat) -> AppResult<ExportPayload> {
        let visible = self.visible();
        let payload = export::export_prompts(&visible, format, Utc::now())?;
        self.notify(
            NotificationKind::Success,
            &format!("Exported as {}", format.label()),
        );
        Ok(payload)
    }

    // ========== AI assistance ==========

    /// Replace the draft content with an improved version; on failure the draft is untouched
    pub async fn improve_draft(
        &mut self,
        assistant: &Assistant,
        draft: &mut PromptDraft,
    ) -> bool {
        let Some(content) = draft.content.as_deref().filter(|c| !c.is_empty()) else {
            return false;
        };
        match assistant.improve(content).await {
            Ok(improved) => {
                draft.content = Some(improved);
                true
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &e.to_string());
                false
            }
        }
    }

    /// Fill the draft's quality fields; on failure the draft is untouched
    pub async fn analyze_draft(
        &mut self,
        assistant: &Assistant,
        draft: &mut PromptDraft,
    ) -> bool {
        let Some(content) = draft.content.as_deref().filter(|c| !c.is_empty()) else {
            return false;
        };
        match assistant.analyze_quality(content).await {
            Ok(audit) => {
                draft.quality_score = Some(audit.score);
                draft.quality_feedback = Some(audit.feedback);
                draft.tone = Some(audit.tone);
                true
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &e.to_string());
                false
            }
        }
    }

    /// Fill the draft's category and tags; on failure the draft is untouched
    pub async fn tag_draft(
        &mut self,
        assistant: &Assistant,
        draft: &mut PromptDraft,
    ) -> bool {
        let Some(content) = draft.content.as_deref().filter(|c| !c.is_empty()) else {
            return false;
        };
        match assistant.auto_tag(content).await {
            Ok(suggestion) => {
                draft.category = Some(suggestion.category);
                draft.tags = Some(suggestion.tags);
                true
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &e.to_string());
                false
            }
        }
    }

    /// Generate a prompt from an idea and save it as a new record
    pub async fn create_from_idea(
        &mut self,
        assistant: &Assistant,
        idea: &str,
    ) -> AppResult<Prompt> {
        self.ensure_ready()?;
        let generated = match assistant.from_idea(idea).await {
            Ok(generated) => generated,
            Err(e) => {
                self.notify(NotificationKind::Error, &e.to_string());
                return Err(e);
            }
        };
        self.save(PromptDraft::new(generated.title, generated.content)).await
    }

    // ========== Notifications ==========

    pub fn notify(&mut self, kind: NotificationKind, message: &str) {
        self.notify_at(kind, message, Utc::now());
    }

    pub fn notify_at(&mut self, kind: NotificationKind, message: &str, now: DateTime<Utc>) {
        self.notification = Some(Notification {
            kind,
            message: message.to_string(),
            expires_at: now + Duration::seconds(NOTIFICATION_TTL_SECS),
        });
    }

    /// The notification if it has not expired at `now`
    pub fn notification_at(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| n.expires_at > now)
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification_at(Utc::now())
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }
}
