use crate::utils::error::{AppError, AppResult};
use crossterm::terminal::size;
use std::io::IsTerminal;

/// Terminal height in rows
fn terminal_height() -> AppResult<u16> {
    size()
        .map(|(_, rows)| rows)
        .map_err(|e| AppError::System(format!("Failed to get terminal size: {}", e)))
}

/// Content taller than two thirds of the screen goes through the pager
pub fn should_paginate(content: &str, terminal_height: u16) -> bool {
    content.lines().count() > usize::from(terminal_height) * 2 / 3
}

fn page(content: &str) -> AppResult<()> {
    let pager = minus::Pager::new();
    pager
        .push_str(content)
        .map_err(|e| AppError::System(format!("Failed to push content to pager: {}", e)))?;

    if let Err(e) = minus::page_all(pager) {
        // quitting the pager with Ctrl+C is not an error
        if e.to_string().to_lowercase().contains("abort") {
            return Ok(());
        }
        return Err(AppError::System(format!("Failed to run pager: {}", e)));
    }
    Ok(())
}

/// Print `content`, paging it when stdout is a terminal and it does not fit
pub fn print_long(content: &str) -> AppResult<()> {
    if io_is_terminal()
        && let Ok(rows) = terminal_height()
        && should_paginate(content, rows)
    {
        return page(content);
    }
    println!("{}", content);
    Ok(())
}

fn io_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}
