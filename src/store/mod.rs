//! Remote store and session clients
//!
//! `rest` talks to the hosted PostgREST endpoints, `auth` to the password
//! session endpoints. Tests use the in-process `memory` stand-in for both.

pub mod auth;
#[cfg(test)]
pub mod memory;
pub mod rest;

use crate::utils::error::{AppError, AppResult};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

const USER_AGENT: &str = concat!("promptvault/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client() -> AppResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::Connectivity(format!("Failed to create HTTP client: {}", e)))
}

/// Transport failures: unreachable host or timeout are connectivity errors
pub(crate) fn send_error(context: &str, e: reqwest::Error) -> AppError {
    if e.is_connect() || e.is_timeout() {
        AppError::Connectivity(format!("{}: {}", context, e))
    } else {
        AppError::Remote(format!("{}: {}", context, e))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// The most specific message a store or auth error body carries
pub(crate) fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_string())
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = error_message(body);
    let message = if message.is_empty() {
        status.to_string()
    } else {
        message
    };
    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthenticated(message),
        _ => AppError::Remote(message),
    }
}

/// Pass successful responses through, turn the rest into errors
pub(crate) async fn check_response(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = %status, body = %body, "request rejected");
    Err(status_error(status, &body))
}
