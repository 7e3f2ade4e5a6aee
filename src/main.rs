use clap::Parser;
use tracing_subscriber::EnvFilter;

use promptvault::cli::Cli;
use promptvault::config::Config;
use promptvault::utils::error::{AppError, report_error};

fn init_tracing(debug: bool) {
    let default = if debug { "promptvault=debug" } else { "promptvault=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.config.is_none() {
        Config::ensure_config_exists()?;
    }

    let config_path = Config::active_path(cli.config.as_deref());
    let config = Config::load_custom(&config_path)?;

    if !config.general.color {
        colored::control::set_override(false);
    }
    tracing::debug!(sort = ?config.general.sort_by, "configuration loaded");

    cli.command.execute(config, &config_path).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<AppError>() {
            Some(app_err) => report_error(app_err),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}
