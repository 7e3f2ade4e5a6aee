//! In-process record store and session provider
//!
//! Behaves like the remote store for a single owner: server-assigned ids and
//! timestamps, owner scoping, newest-first ordering. Failures can be injected
//! per operation.

use crate::core::data::{
    CategoryRecord, NewCategory, NewPrompt, NewPromptVersion, Prompt, PromptChanges,
    PromptVersion, Session, UserProfile,
};
use crate::core::traits::{RecordStore, SessionProvider};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    SelectPrompts,
    SelectPrompt,
    InsertPrompt,
    UpdatePrompt,
    DeletePrompt,
    InsertVersion,
    SelectVersions,
    SelectCategories,
    InsertCategory,
}

#[derive(Default)]
struct Tables {
    prompts: Vec<Prompt>,
    versions: Vec<PromptVersion>,
    categories: Vec<CategoryRecord>,
    failures: HashMap<StoreOp, AppError>,
    writes: usize,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps so ordering never ties
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if last >= now => last + Duration::milliseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn check(&self, op: StoreOp) -> AppResult<()> {
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `op` fail with a store error carrying `message`
    pub fn fail_on(&self, op: StoreOp, message: &str) {
        self.fail_with(op, AppError::Remote(message.to_string()));
    }

    pub fn fail_with(&self, op: StoreOp, error: AppError) {
        self.lock().failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Number of successful insert, update and delete calls
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn version_count(&self) -> usize {
        self.lock().versions.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select_prompts(&self, session: &Session) -> AppResult<Vec<Prompt>> {
        let tables = self.lock();
        tables.check(StoreOp::SelectPrompts)?;
        let mut prompts: Vec<Prompt> = tables
            .prompts
            .iter()
            .filter(|p| p.user_id == session.user.id)
            .cloned()
            .collect();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prompts)
    }

    async fn select_prompt(&self, session: &Session, id: &str) -> AppResult<Option<Prompt>> {
        let tables = self.lock();
        tables.check(StoreOp::SelectPrompt)?;
        Ok(tables
            .prompts
            .iter()
            .find(|p| p.id == id && p.user_id == session.user.id)
            .cloned())
    }

    async fn insert_prompt(&self, session: &Session, row: &NewPrompt) -> AppResult<Prompt> {
        let mut tables = self.lock();
        tables.check(StoreOp::InsertPrompt)?;
        if row.user_id != session.user.id {
            return Err(AppError::Remote("new row violates row-level security policy".into()));
        }
        let now = tables.tick();
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            user_id: row.user_id.clone(),
            title: row.title.clone(),
            content: row.content.clone(),
            description: Some(row.description.clone()),
            category: Some(row.category.clone()),
            tags: row.tags.clone(),
            favorite: row.favorite,
            created_at: now,
            updated_at: now,
            quality_score: Some(row.quality_score),
            quality_feedback: Some(row.quality_feedback.clone()),
            tone: Some(row.tone.clone()),
        };
        tables.prompts.push(prompt.clone());
        tables.writes += 1;
        Ok(prompt)
    }

    async fn update_prompt(
        &self,
        session: &Session,
        id: &str,
        changes: &PromptChanges,
    ) -> AppResult<Prompt> {
        let mut tables = self.lock();
        tables.check(StoreOp::UpdatePrompt)?;
        let prompt = tables
            .prompts
            .iter_mut()
            .find(|p| p.id == id && p.user_id == session.user.id)
            .ok_or_else(|| AppError::Remote("JSON object requested, multiple (or no) rows returned".into()))?;

        if let Some(title) = &changes.title {
            prompt.title = title.clone();
        }
        if let Some(content) = &changes.content {
            prompt.content = content.clone();
        }
        if let Some(description) = &changes.description {
            prompt.description = Some(description.clone());
        }
        if let Some(category) = &changes.category {
            prompt.category = Some(category.clone());
        }
        if let Some(tags) = &changes.tags {
            prompt.tags = tags.clone();
        }
        if let Some(favorite) = changes.favorite {
            prompt.favorite = favorite;
        }
        if let Some(score) = changes.quality_score {
            prompt.quality_score = Some(score);
        }
        if let Some(feedback) = &changes.quality_feedback {
            prompt.quality_feedback = Some(feedback.clone());
        }
        if let Some(tone) = &changes.tone {
            prompt.tone = Some(tone.clone());
        }
        prompt.updated_at = changes.updated_at;

        let updated = prompt.clone();
        tables.writes += 1;
        Ok(updated)
    }

    async fn delete_prompt(&self, session: &Session, id: &str) -> AppResult<()> {
        let mut tables = self.lock();
        tables.check(StoreOp::DeletePrompt)?;
        tables
            .prompts
            .retain(|p| !(p.id == id && p.user_id == session.user.id));
        tables.writes += 1;
        Ok(())
    }

    async fn insert_version(
        &self,
        _session: &Session,
        row: &NewPromptVersion,
    ) -> AppResult<PromptVersion> {
        let mut tables = self.lock();
        tables.check(StoreOp::InsertVersion)?;
        let version = PromptVersion {
            id: Uuid::new_v4().to_string(),
            prompt_id: row.prompt_id.clone(),
            title: row.title.clone(),
            content: row.content.clone(),
            created_at: tables.tick(),
        };
        tables.versions.push(version.clone());
        tables.writes += 1;
        Ok(version)
    }

    async fn select_versions(
        &self,
        _session: &Session,
        prompt_id: &str,
    ) -> AppResult<Vec<PromptVersion>> {
        let tables = self.lock();
        tables.check(StoreOp::SelectVersions)?;
        let mut versions: Vec<PromptVersion> = tables
            .versions
            .iter()
            .filter(|v| v.prompt_id == prompt_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(versions)
    }

    async fn select_categories(&self, session: &Session) -> AppResult<Vec<CategoryRecord>> {
        let tables = self.lock();
        tables.check(StoreOp::SelectCategories)?;
        let mut categories: Vec<CategoryRecord> = tables
            .categories
            .iter()
            .filter(|c| c.user_id == session.user.id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn insert_category(
        &self,
        _session: &Session,
        row: &NewCategory,
    ) -> AppResult<CategoryRecord> {
        let mut tables = self.lock();
        tables.check(StoreOp::InsertCategory)?;
        if tables
            .categories
            .iter()
            .any(|c| c.user_id == row.user_id && c.name == row.name)
        {
            return Err(AppError::Remote(format!(
                "duplicate key value violates unique constraint on \"{}\"",
                row.name
            )));
        }
        let record = CategoryRecord {
            id: Uuid::new_v4().to_string(),
            user_id: row.user_id.clone(),
            name: row.name.clone(),
            color: row.color.clone(),
            created_at: Some(tables.tick()),
        };
        tables.categories.push(record.clone());
        tables.writes += 1;
        Ok(record)
    }
}

/// Session provider holding a fixed session that can be signed out
pub struct StaticSessions {
    session: Mutex<Option<Session>>,
    failure: Mutex<Option<AppError>>,
}

impl StaticSessions {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: Mutex::new(session),
            failure: Mutex::new(None),
        }
    }

    pub fn signed_in(user_id: &str) -> Self {
        Self::new(Some(test_session(user_id, Utc::now() + Duration::hours(1))))
    }

    pub fn expired(user_id: &str) -> Self {
        Self::new(Some(test_session(user_id, Utc::now() - Duration::minutes(1))))
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    /// Make `current_session` fail, e.g. to simulate an unreachable auth server
    pub fn fail_with(&self, error: AppError) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(error);
    }
}

fn test_session(user_id: &str, expires_at: DateTime<Utc>) -> Session {
    Session {
        access_token: format!("token-{}", user_id),
        refresh_token: None,
        expires_at,
        user: UserProfile {
            id: user_id.to_string(),
            name: user_id.to_string(),
            email: format!("{}@example.com", user_id),
        },
    }
}

#[async_trait]
impl SessionProvider for StaticSessions {
    async fn current_session(&self) -> AppResult<Option<Session>> {
        if let Some(err) = self.failure.lock().unwrap_or_else(|p| p.into_inner()).clone() {
            return Err(err);
        }
        Ok(self.session.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    async fn sign_out(&self) -> AppResult<()> {
        *self.session.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::PromptDraft;

    #[tokio::test]
    async fn test_rows_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let alice = test_session("alice", Utc::now() + Duration::hours(1));
        let bob = test_session("bob", Utc::now() + Duration::hours(1));

        let row = PromptDraft::new("Mine", "").into_new_prompt("alice");
        let created = store.insert_prompt(&alice, &row).await.unwrap();

        assert_eq!(store.select_prompts(&alice).await.unwrap().len(), 1);
        assert!(store.select_prompts(&bob).await.unwrap().is_empty());
        assert!(store.select_prompt(&bob, &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_category_is_rejected() {
        let store = MemoryStore::new();
        let session = test_session("alice", Utc::now() + Duration::hours(1));
        let row = NewCategory {
            user_id: "alice".into(),
            name: "Research".into(),
            color: "#123456".into(),
        };
        store.insert_category(&session, &row).await.unwrap();
        assert!(store.insert_category(&session, &row).await.is_err());
    }
}
