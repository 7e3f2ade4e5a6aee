use super::{check_response, http_client, send_error};
use crate::config::StoreConfig;
use crate::core::data::{
    CategoryRecord, NewCategory, NewPrompt, NewPromptVersion, Prompt, PromptChanges,
    PromptVersion, Session,
};
use crate::core::traits::RecordStore;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

const PROMPTS: &str = "prompts";
const VERSIONS: &str = "prompt_versions";
const CATEGORIES: &str = "categorias";

/// [`RecordStore`] over the hosted PostgREST API
pub struct RestStore {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }

    fn request(&self, method: Method, table: &str, session: &Session) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        session: &Session,
        query: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        tracing::debug!(table, ?query, "select");
        let response = self
            .request(Method::GET, table, session)
            .query(query)
            .send()
            .await
            .map_err(|e| send_error(&format!("Failed to read {}", table), e))?;

        check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Remote(format!("Failed to parse {} response: {}", table, e)))
    }

    /// Send a write and return the single row the store echoes back
    async fn write_one<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        session: &Session,
        query: &[(&str, String)],
        body: &B,
    ) -> AppResult<T> {
        tracing::debug!(table, %method, ?query, "write");
        let response = self
            .request(method, table, session)
            .query(query)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| send_error(&format!("Failed to write {}", table), e))?;

        let mut rows: Vec<T> = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Remote(format!("Failed to parse {} response: {}", table, e)))?;

        if rows.is_empty() {
            return Err(AppError::Remote(format!("No {} row returned", table)));
        }
        Ok(rows.swap_remove(0))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select_prompts(&self, session: &Session) -> AppResult<Vec<Prompt>> {
        self.fetch(
            PROMPTS,
            session,
            &[
                ("select", "*".to_string()),
                ("user_id", eq(&session.user.id)),
                ("order", "creado_en.desc".to_string()),
            ],
        )
        .await
    }

    async fn select_prompt(&self, session: &Session, id: &str) -> AppResult<Option<Prompt>> {
        let rows: Vec<Prompt> = self
            .fetch(
                PROMPTS,
                session,
                &[("select", "*".to_string()), ("id", eq(id))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_prompt(&self, session: &Session, row: &NewPrompt) -> AppResult<Prompt> {
        self.write_one(Method::POST, PROMPTS, session, &[], &[row]).await
    }

    async fn update_prompt(
        &self,
        session: &Session,
        id: &str,
        changes: &PromptChanges,
    ) -> AppResult<Prompt> {
        self.write_one(Method::PATCH, PROMPTS, session, &[("id", eq(id))], changes)
            .await
    }

    async fn delete_prompt(&self, session: &Session, id: &str) -> AppResult<()> {
        tracing::debug!(table = PROMPTS, id, "delete");
        let response = self
            .request(Method::DELETE, PROMPTS, session)
            .query(&[("id", eq(id))])
            .send()
            .await
            .map_err(|e| send_error("Failed to delete prompt", e))?;

        check_response(response).await?;
        Ok(())
    }

    async fn insert_version(
        &self,
        session: &Session,
        row: &NewPromptVersion,
    ) -> AppResult<PromptVersion> {
        self.write_one(Method::POST, VERSIONS, session, &[], &[row]).await
    }

    async fn select_versions(
        &self,
        session: &Session,
        prompt_id: &str,
    ) -> AppResult<Vec<PromptVersion>> {
        self.fetch(
            VERSIONS,
            session,
            &[
                ("select", "*".to_string()),
                ("prompt_id", eq(prompt_id)),
                ("order", "creado_en.desc".to_string()),
            ],
        )
        .await
    }

    async fn select_categories(&self, session: &Session) -> AppResult<Vec<CategoryRecord>> {
        self.fetch(
            CATEGORIES,
            session,
            &[
                ("select", "*".to_string()),
                ("user_id", eq(&session.user.id)),
                ("order", "nombre.asc".to_string()),
            ],
        )
        .await
    }

    async fn insert_category(
        &self,
        session: &Session,
        row: &NewCategory,
    ) -> AppResult<CategoryRecord> {
        self.write_one(Method::POST, CATEGORIES, session, &[], &[row]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let store = RestStore::new(&StoreConfig {
            url: "https://example.supabase.co/".into(),
            anon_key: "anon".into(),
        })
        .unwrap();
        assert_eq!(store.base_url, "https://example.supabase.co/rest/v1");
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq("abc"), "eq.abc");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connectivity_error() {
        let store = RestStore::new(&StoreConfig {
            url: "http://127.0.0.1:9".into(),
            anon_key: "anon".into(),
        })
        .unwrap();
        let session = Session {
            access_token: "token".into(),
            refresh_token: None,
            expires_at: chrono::Utc::now(),
            user: crate::core::data::UserProfile {
                id: "u1".into(),
                name: "u".into(),
                email: "u@example.com".into(),
            },
        };

        let err = store.select_prompts(&session).await.unwrap_err();
        assert!(matches!(err, AppError::Connectivity(_)));
    }
}
