use crate::utils::output::OutputStyle;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Connection error: {0}")]
    Connectivity(String),

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("Store error: {0}")]
    Remote(String),

    #[error("AI service error: {0}")]
    Ai(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl AppError {
    /// Startup failures that should block the vault instead of showing a notification
    pub fn is_blocking(&self) -> bool {
        matches!(self, AppError::Connectivity(_) | AppError::Unauthenticated(_))
    }

    pub fn unauthenticated() -> Self {
        AppError::Unauthenticated(
            "Session is missing or expired. Please log in again.".to_string(),
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

/// Result type alias for consistent error handling across the application
pub type AppResult<T> = Result<T, AppError>;

pub enum FlowResult {
    EmptyList {
        item_type: String,
    },
    Cancelled(String),
}

pub fn report_error(err: &AppError) {
    match err {
        AppError::Connectivity(msg) => {
            eprintln!("🌐 {}", OutputStyle::error(&format!("Network: {}", msg)));
        }
        AppError::Unauthenticated(msg) => {
            eprintln!("🔒 {}", OutputStyle::warning(msg));
            eprintln!("   {}", OutputStyle::muted("Run `promptvault login` to start a session."));
        }
        AppError::Ai(msg) => {
            eprintln!("✨ {}", OutputStyle::warning(&format!("AI: {}", msg)));
        }
        AppError::NotFound(_) => {
            eprintln!("⚠️  {}", OutputStyle::warning(&err.to_string()));
        }
        AppError::Remote(msg) | AppError::Config(msg) | AppError::System(msg) | AppError::Io(msg) => {
            eprintln!("❌ {}", OutputStyle::error(msg));
        }
    }
}

pub fn handle_flow(flow: FlowResult) {
    match flow {
        FlowResult::EmptyList { item_type } => {
            let msg = format!("No {} found", item_type);
            println!("{}", OutputStyle::muted(&msg));
        }
        FlowResult::Cancelled(msg) => {
            println!("⏹️  {}", OutputStyle::muted(&msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_errors() {
        assert!(AppError::Connectivity("down".into()).is_blocking());
        assert!(AppError::unauthenticated().is_blocking());
        assert!(!AppError::Remote("rejected".into()).is_blocking());
        assert!(!AppError::Ai("bad json".into()).is_blocking());
    }

    #[test]
    fn test_remote_error_carries_store_message() {
        let err = AppError::Remote("duplicate key value".into());
        assert_eq!(err.to_string(), "Store error: duplicate key value");
    }
}
