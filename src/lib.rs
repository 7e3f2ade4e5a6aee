//! promptvault - a personal prompt vault backed by a hosted database
//!
//! The library holds the filter/sort engine, the persistence gateway with
//! prompt versioning, export formatting and the session-aware controller
//! the CLI drives.

pub mod ai;
pub mod cli;
pub mod config;
pub mod core;
pub mod manager;
pub mod store;
pub mod utils;

pub use core::{
    assist::Assistant,
    controller::{Notification, NotificationKind, VaultController, VaultMode},
    data::{Category, Prompt, PromptDraft, PromptVersion, Session, UserProfile},
    filter::{CategoryFilter, PromptQuery, SortKey, TimeWindow},
    gateway::PersistenceGateway,
    traits::{RecordStore, SessionProvider, TextGenerator},
};
pub use utils::error::{AppError, AppResult};
pub use utils::export::{ExportFormat, ExportPayload};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
