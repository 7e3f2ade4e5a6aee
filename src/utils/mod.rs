pub mod command;
pub mod error;
pub mod export;
pub mod format;
pub mod interactive;
pub mod output;
pub mod pagination;
