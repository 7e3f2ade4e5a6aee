//! Password sessions against the hosted auth endpoints
//!
//! Sessions are kept in a JSON file next to the config and refreshed with the
//! refresh token once they are about to expire.

use super::{check_response, http_client, send_error};
use crate::config::StoreConfig;
use crate::core::data::{Session, UserProfile};
use crate::core::traits::SessionProvider;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Sessions this close to expiry are refreshed before use
const REFRESH_MARGIN_SECS: i64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    nombre: Option<String>,
}

/// Sign-up replies carry a session only when no email confirmation is pending
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending { id: String },
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(3600)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: UserProfile::resolve_name(
                self.user.id,
                self.user.email,
                self.user.user_metadata.nombre,
            ),
        }
    }
}

/// Outcome of a sign-up request
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired,
}

pub struct AuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }

    async fn post_token(&self, grant_type: &str, body: serde_json::Value) -> AppResult<Session> {
        let response = self
            .client
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("Failed to reach auth server", e))?;

        let token: TokenResponse = check_response(response)
            .await
            .map_err(auth_rejection)?
            .json()
            .await
            .map_err(|e| AppError::Remote(format!("Failed to parse auth response: {}", e)))?;

        Ok(token.into_session(Utc::now()))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        tracing::debug!(email, "password sign-in");
        self.post_token("password", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<Session> {
        tracing::debug!("refreshing session");
        self.post_token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> AppResult<SignUpOutcome> {
        let response = self
            .client
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "nombre": name }
            }))
            .send()
            .await
            .map_err(|e| send_error("Failed to reach auth server", e))?;

        let reply: SignUpResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Remote(format!("Failed to parse sign-up response: {}", e)))?;

        Ok(match reply {
            SignUpResponse::Session(token) => SignUpOutcome::SignedIn(token.into_session(Utc::now())),
            SignUpResponse::Pending { id } => {
                tracing::debug!(user_id = %id, "sign-up awaiting confirmation");
                SignUpOutcome::ConfirmationRequired
            }
        })
    }

    pub async fn sign_out(&self, session: &Session) -> AppResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| send_error("Failed to reach auth server", e))?;

        check_response(response).await?;
        Ok(())
    }
}

/// Bad credentials come back as 400; report them as an authentication failure
fn auth_rejection(err: AppError) -> AppError {
    match err {
        AppError::Remote(msg) => AppError::Unauthenticated(msg),
        other => other,
    }
}

pub fn session_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptvault")
        .join("session.json")
}

pub fn load_session(path: &Path) -> AppResult<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    match serde_json::from_str(&content) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
            Ok(None)
        }
    }
}

pub fn store_session(path: &Path, session: &Session) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(session)
        .map_err(|e| AppError::System(format!("Failed to serialize session: {}", e)))?;
    fs::write(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

pub fn clear_session(path: &Path) -> AppResult<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// [`SessionProvider`] backed by the session file and the auth endpoints
pub struct FileSessions {
    auth: AuthClient,
    path: PathBuf,
}

impl FileSessions {
    pub fn new(auth: AuthClient, path: PathBuf) -> Self {
        Self { auth, path }
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let session = self.auth.sign_in(email, password).await?;
        store_session(&self.path, &session)?;
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> AppResult<SignUpOutcome> {
        let outcome = self.auth.sign_up(email, password, name).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            store_session(&self.path, session)?;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl SessionProvider for FileSessions {
    async fn current_session(&self) -> AppResult<Option<Session>> {
        let Some(session) = load_session(&self.path)? else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS)) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            tracing::debug!("session expired without refresh token");
            clear_session(&self.path)?;
            return Ok(None);
        };

        match self.auth.refresh(refresh_token).await {
            Ok(fresh) => {
                store_session(&self.path, &fresh)?;
                Ok(Some(fresh))
            }
            Err(AppError::Unauthenticated(msg)) => {
                tracing::warn!(error = %msg, "session refresh rejected");
                clear_session(&self.path)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self) -> AppResult<()> {
        if let Some(session) = load_session(&self.path)?
            && let Err(e) = self.auth.sign_out(&session).await
        {
            tracing::warn!(error = %e, "remote sign-out failed, clearing local session anyway");
        }
        clear_session(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StoreConfig {
        StoreConfig {
            url: "http://127.0.0.1:9".into(),
            anon_key: "anon".into(),
        }
    }

    fn session(expires_at: DateTime<Utc>, refresh: Option<&str>) -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: refresh.map(str::to_string),
            expires_at,
            user: UserProfile {
                id: "u1".into(),
                name: "ana".into(),
                email: "ana@example.com".into(),
            },
        }
    }

    #[test]
    fn test_token_response_into_session() {
        let body = r#"{
            "access_token": "abc", "token_type": "bearer", "expires_in": 3600,
            "refresh_token": "ref",
            "user": {"id": "u1", "email": "ana@example.com", "user_metadata": {"nombre": "Ana"}}
        }"#;
        let token: TokenResponse = serde_json::from_str(body).unwrap();
        let now = Utc::now();
        let session = token.into_session(now);

        assert_eq!(session.access_token, "abc");
        assert_eq!(session.refresh_token.as_deref(), Some("ref"));
        assert_eq!(session.expires_at, now + Duration::seconds(3600));
        assert_eq!(session.user.name, "Ana");
    }

    #[test]
    fn test_sign_up_reply_without_session_is_pending() {
        let reply: SignUpResponse =
            serde_json::from_str(r#"{"id": "u1", "email": "ana@example.com"}"#).unwrap();
        assert!(matches!(reply, SignUpResponse::Pending { .. }));
    }

    #[test]
    fn test_session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let stored = session(Utc::now() + Duration::hours(1), Some("ref"));

        assert!(load_session(&path).unwrap().is_none());
        store_session(&path, &stored).unwrap();
        assert_eq!(load_session(&path).unwrap(), Some(stored));

        clear_session(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_session_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_session(&path).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_live_session_is_returned_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let stored = session(Utc::now() + Duration::hours(1), None);
        store_session(&path, &stored).unwrap();

        let sessions = FileSessions::new(AuthClient::new(&config()).unwrap(), path);
        assert_eq!(sessions.current_session().await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_expired_session_without_refresh_token_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        store_session(&path, &session(Utc::now() - Duration::minutes(5), None)).unwrap();

        let sessions = FileSessions::new(AuthClient::new(&config()).unwrap(), path.clone());
        assert!(sessions.current_session().await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_refresh_against_unreachable_server_is_connectivity_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        store_session(&path, &session(Utc::now() - Duration::minutes(5), Some("ref"))).unwrap();

        let sessions = FileSessions::new(AuthClient::new(&config()).unwrap(), path.clone());
        let err = sessions.current_session().await.unwrap_err();
        assert!(matches!(err, AppError::Connectivity(_)));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_sign_out_clears_file_even_when_offline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        store_session(&path, &session(Utc::now() + Duration::hours(1), None)).unwrap();

        let sessions = FileSessions::new(AuthClient::new(&config()).unwrap(), path.clone());
        sessions.sign_out().await.unwrap();
        assert!(!path.exists());
    }
}
