// Command handlers, one module per command group
pub mod ai;
pub mod auth;
pub mod categories;
pub mod config;
pub mod crud;
pub mod query;

use crate::ai::GeminiClient;
use crate::config::Config;
use crate::core::assist::Assistant;
use crate::core::controller::{NotificationKind, VaultController, VaultMode};
use crate::core::data::Prompt;
use crate::core::filter::PromptQuery;
use crate::core::gateway::PersistenceGateway;
use crate::store::auth::{AuthClient, FileSessions, session_file_path};
use crate::store::rest::RestStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::OutputStyle;
use std::sync::Arc;

pub(crate) fn file_sessions(config: &Config) -> AppResult<FileSessions> {
    let auth = AuthClient::new(config.require_store()?)?;
    Ok(FileSessions::new(auth, session_file_path()))
}

/// A started controller with the user's prompts loaded
pub(crate) async fn open_vault(config: &Config) -> AppResult<VaultController> {
    let store = Arc::new(RestStore::new(config.require_store()?)?);
    let sessions = Arc::new(file_sessions(config)?);

    let mut controller = VaultController::new(PersistenceGateway::new(store, sessions));
    controller.set_query(PromptQuery {
        sort: config.general.sort_by,
        ..Default::default()
    });
    controller.start().await;

    match controller.mode() {
        VaultMode::Ready => {}
        VaultMode::Blocked(reason) => return Err(AppError::Connectivity(reason.clone())),
        _ => return Err(AppError::unauthenticated()),
    }

    if let Some(note) = controller.notification()
        && note.kind == NotificationKind::Error
    {
        return Err(AppError::Remote(note.message.clone()));
    }
    Ok(controller)
}

pub(crate) fn build_assistant(config: &Config) -> AppResult<Assistant> {
    let client = GeminiClient::new(&config.ai)?;
    Ok(Assistant::new(Arc::new(client)).with_models(&config.ai.model, &config.ai.idea_model))
}

pub(crate) fn resolve_prompt(controller: &VaultController, identifier: &str) -> AppResult<Prompt> {
    controller
        .resolve(identifier)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Prompt '{}'", identifier)))
}

/// Print the pending notification, if any
pub(crate) fn announce(controller: &VaultController) {
    if let Some(note) = controller.notification() {
        OutputStyle::print_notification(note);
    }
}

/// Turn a failed AI action's notification into an error for the caller
pub(crate) fn ai_failure(controller: &VaultController) -> AppError {
    let message = controller
        .notification()
        .filter(|n| n.kind == NotificationKind::Error)
        .map(|n| n.message.clone())
        .unwrap_or_else(|| "The AI service returned nothing usable".to_string());
    AppError::Ai(message)
}
