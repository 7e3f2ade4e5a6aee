//! Core trait definitions for the vault's external collaborators
//!
//! The gateway and controller only talk to the record store, the session
//! provider and the text generator through these seams.

use crate::core::data::{
    CategoryRecord, NewCategory, NewPrompt, NewPromptVersion, Prompt, PromptChanges,
    PromptVersion, Session,
};
use crate::utils::error::AppResult;
use async_trait::async_trait;

/// Session-scoped access to the prompts, prompt_versions and categorias collections
///
/// Every call carries the session whose owner scopes the rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All prompts of the session owner, newest-created first
    async fn select_prompts(&self, session: &Session) -> AppResult<Vec<Prompt>>;

    /// A single prompt by id
    async fn select_prompt(&self, session: &Session, id: &str) -> AppResult<Option<Prompt>>;

    async fn insert_prompt(&self, session: &Session, row: &NewPrompt) -> AppResult<Prompt>;

    async fn update_prompt(
        &self,
        session: &Session,
        id: &str,
        changes: &PromptChanges,
    ) -> AppResult<Prompt>;

    /// Hard delete; deleting an unknown id is not an error
    async fn delete_prompt(&self, session: &Session, id: &str) -> AppResult<()>;

    async fn insert_version(
        &self,
        session: &Session,
        row: &NewPromptVersion,
    ) -> AppResult<PromptVersion>;

    /// Versions of a prompt, newest first
    async fn select_versions(&self, session: &Session, prompt_id: &str)
    -> AppResult<Vec<PromptVersion>>;

    /// User categories ordered by name
    async fn select_categories(&self, session: &Session) -> AppResult<Vec<CategoryRecord>>;

    async fn insert_category(&self, session: &Session, row: &NewCategory)
    -> AppResult<CategoryRecord>;
}

/// Source of the current authenticated session
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The live session, refreshed if the provider knows how; `None` when signed out
    async fn current_session(&self) -> AppResult<Option<Session>>;

    async fn sign_out(&self) -> AppResult<()>;
}

/// Generative text service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Free-text completion
    async fn generate_text(&self, model: &str, prompt: &str) -> AppResult<String>;

    /// Completion constrained to a JSON schema; returns the raw JSON text
    async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> AppResult<String>;
}
