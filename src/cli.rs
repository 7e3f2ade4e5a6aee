use crate::config::Config;
use crate::core::filter::{CategoryFilter, PromptQuery, SortKey, TimeWindow};
use crate::manager;
use crate::utils::export::ExportFormat;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "promptvault")]
#[command(about = "A personal prompt vault backed by a hosted database")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    pub async fn execute(self, config: Config, config_path: &Path) -> Result<()> {
        match self {
            Commands::Login(args) => manager::auth::handle_login_command(&config, &args).await?,
            Commands::Logout => manager::auth::handle_logout_command(&config).await?,
            Commands::Whoami => manager::auth::handle_whoami_command(&config).await?,
            Commands::New(args) => manager::crud::handle_new_command(&config, &args).await?,
            Commands::Edit(args) => manager::crud::handle_edit_command(&config, &args).await?,
            Commands::Show(args) => manager::crud::handle_show_command(&config, &args).await?,
            Commands::Delete(args) => manager::crud::handle_delete_command(&config, &args).await?,
            Commands::Fav(args) => manager::crud::handle_fav_command(&config, &args).await?,
            Commands::History(args) => manager::crud::handle_history_command(&config, &args).await?,
            Commands::Revert(args) => manager::crud::handle_revert_command(&config, &args).await?,
            Commands::List(args) => manager::query::handle_list_command(&config, &args).await?,
            Commands::Exec(args) => manager::query::handle_exec_command(&config, &args).await?,
            Commands::Export(args) => manager::query::handle_export_command(&config, &args).await?,
            Commands::Categories(args) => {
                manager::categories::handle_categories_command(&config, args.command).await?
            }
            Commands::Ai(args) => manager::ai::handle_ai_command(&config, args.command).await?,
            Commands::Config(args) => manager::config::handle_config_command(config, config_path, args.command)?,
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in (or sign up) and store the session
    Login(LoginArgs),

    /// End the current session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Create a new prompt
    New(NewArgs),

    /// Edit an existing prompt
    Edit(EditArgs),

    /// Show prompt details
    Show(ShowArgs),

    /// List prompts with filters
    List(ListArgs),

    /// Delete a prompt
    Delete(DeleteArgs),

    /// Toggle the favorite flag of a prompt
    Fav(TargetArgs),

    /// Show the version history of a prompt
    History(TargetArgs),

    /// Restore title and content from a past version
    Revert(RevertArgs),

    /// Fill in {{variables}} and copy or print the prompt
    Exec(ExecArgs),

    /// Export the filtered prompt list to a file
    Export(ExportArgs),

    /// Category management
    Categories(CategoriesArgs),

    /// AI assistance
    Ai(AiArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub email: Option<String>,

    #[arg(long, help = "Create a new account instead of signing in")]
    pub signup: bool,

    #[arg(short, long, help = "Display name for a new account")]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct NewArgs {
    #[arg(short = 'T', long)]
    pub title: Option<String>,

    #[arg(short = 'd', long)]
    pub description: Option<String>,

    #[arg(short = 't', long, value_delimiter = ',', help = "Comma-separated tags")]
    pub tags: Vec<String>,

    #[arg(short = 'c', long)]
    pub category: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(long, help = "Write the content in the configured editor")]
    pub editor: bool,

    #[arg(short = 'f', long)]
    pub favorite: bool,

    #[arg(long, help = "Suggest category and tags with AI before saving")]
    pub auto_tag: bool,
}

#[derive(Args)]
pub struct EditArgs {
    #[arg(help = "Prompt ID, ID prefix or title")]
    pub identifier: String,

    #[arg(short = 'T', long)]
    pub title: Option<String>,

    #[arg(short = 'd', long)]
    pub description: Option<String>,

    #[arg(short = 't', long, value_delimiter = ',', help = "Replace tags (comma-separated)")]
    pub tags: Option<Vec<String>>,

    #[arg(short = 'c', long)]
    pub category: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(long, help = "Edit the content in the configured editor")]
    pub editor: bool,
}

#[derive(Args)]
pub struct TargetArgs {
    #[arg(help = "Prompt ID, ID prefix or title")]
    pub identifier: String,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(help = "Prompt ID, ID prefix or title")]
    pub identifier: String,

    #[arg(long, help = "Also list previous versions")]
    pub history: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(help = "Prompt ID, ID prefix or title")]
    pub identifier: String,

    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct RevertArgs {
    #[arg(help = "Prompt ID, ID prefix or title")]
    pub identifier: String,

    #[arg(help = "Version number as shown by `history` (1 = most recent)")]
    pub version: usize,

    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    #[arg(short = 'q', long, help = "Match title, content or tags")]
    pub query: Option<String>,

    #[arg(short = 'c', long)]
    pub category: Option<String>,

    #[arg(short = 'f', long, help = "Only favorites")]
    pub favorites: bool,

    #[arg(long, value_enum, default_value_t = TimeWindow::Any)]
    pub since: TimeWindow,

    #[arg(short, long, value_enum, help = "Sort order (defaults to general.sort_by)")]
    pub sort: Option<SortKey>,
}

impl FilterArgs {
    pub fn to_query(&self, default_sort: SortKey) -> PromptQuery {
        PromptQuery {
            text: self.query.clone().unwrap_or_default(),
            category: CategoryFilter::from_option(self.category.as_deref()),
            favorites_only: self.favorites,
            time_window: self.since,
            sort: self.sort.unwrap_or(default_sort),
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(long, value_enum)]
    pub format: Option<ListFormat>,
}

#[derive(Args)]
pub struct ExecArgs {
    #[arg(help = "Prompt ID, ID prefix or title")]
    pub identifier: String,

    #[arg(long, help = "Copy the rendered prompt to the clipboard")]
    pub copy: bool,

    #[arg(long = "var", value_name = "NAME=VALUE", help = "Variable value; asked interactively when missing")]
    pub vars: Vec<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub format: ExportFormat,

    #[arg(short, long, help = "Target directory (defaults to general.export_dir)")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(clap::ValueEnum, Clone)]
pub enum ListFormat {
    Simple,
    Table,
    Json,
}

#[derive(Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: Option<CategoryCommands>,
}

#[derive(Subcommand, Clone)]
pub enum CategoryCommands {
    /// List built-in and custom categories
    List,

    /// Create a custom category
    Add {
        name: String,

        #[arg(long, default_value = "#94a3b8", help = "Hex color (#rrggbb)")]
        color: String,
    },
}

#[derive(Args)]
pub struct AiArgs {
    #[command(subcommand)]
    pub command: AiCommands,
}

#[derive(Subcommand, Clone)]
pub enum AiCommands {
    /// Rewrite a prompt's content to be more effective
    Improve {
        identifier: String,

        #[arg(long, help = "Save the improved content")]
        apply: bool,
    },

    /// Score a prompt and detect its tone
    Analyze {
        identifier: String,

        #[arg(long, help = "Store the analysis on the prompt")]
        save: bool,
    },

    /// Suggest a category and tags for a prompt
    Tag {
        identifier: String,

        #[arg(long, help = "Store the suggestion on the prompt")]
        save: bool,
    },

    /// Create a new prompt from a short idea
    Idea { idea: Vec<String> },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Open,

    /// Reset configuration to defaults
    Reset,
}
