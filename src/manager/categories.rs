// Category commands

use super::{announce, open_vault};
use crate::cli::CategoryCommands;
use crate::config::Config;
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::parse_hex_color;
use crate::utils::output::OutputStyle;

pub async fn handle_categories_command(
    config: &Config,
    command: Option<CategoryCommands>,
) -> AppResult<()> {
    match command.unwrap_or(CategoryCommands::List) {
        CategoryCommands::List => {
            let controller = open_vault(config).await?;
            OutputStyle::print_categories(&controller.all_categories());
        }
        CategoryCommands::Add { name, color } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::System("Category name cannot be empty".to_string()));
            }
            if parse_hex_color(&color).is_none() {
                return Err(AppError::System(format!(
                    "Invalid color '{}', expected #rrggbb",
                    color
                )));
            }

            let mut controller = open_vault(config).await?;
            if controller.all_categories().iter().any(|c| c.name == name) {
                return Err(AppError::System(format!("Category '{}' already exists", name)));
            }
            controller.add_category(name, &color).await?;
            announce(&controller);
        }
    }
    Ok(())
}
