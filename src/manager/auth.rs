// Session commands - Login, Logout, Whoami

use super::file_sessions;
use crate::cli::LoginArgs;
use crate::config::Config;
use crate::core::traits::SessionProvider;
use crate::store::auth::SignUpOutcome;
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::format_datetime;
use crate::utils::interactive;
use crate::utils::output::{OutputStyle, print_success};

pub async fn handle_login_command(config: &Config, args: &LoginArgs) -> AppResult<()> {
    let sessions = file_sessions(config)?;

    let email = match &args.email {
        Some(email) => email.trim().to_string(),
        None => interactive::prompt_input(&format!("{}: ", OutputStyle::label("Email")))?,
    };
    if email.is_empty() {
        return Err(AppError::System("Email cannot be empty".to_string()));
    }
    let password = interactive::prompt_password(&format!("{}: ", OutputStyle::label("Password")))?;

    if args.signup {
        let name = match &args.name {
            Some(name) => name.clone(),
            None => interactive::prompt_input(&format!("{}: ", OutputStyle::label("Name")))?,
        };
        match sessions.sign_up(&email, &password, &name).await? {
            SignUpOutcome::SignedIn(session) => {
                print_success(&format!("Welcome, {}!", session.user.name));
            }
            SignUpOutcome::ConfirmationRequired => {
                println!(
                    "{}",
                    OutputStyle::info("Account created. Confirm your email, then run login again.")
                );
            }
        }
        return Ok(());
    }

    let session = sessions.sign_in(&email, &password).await?;
    print_success(&format!("Signed in as {}", session.user.name));
    Ok(())
}

pub async fn handle_logout_command(config: &Config) -> AppResult<()> {
    let sessions = file_sessions(config)?;
    sessions.sign_out().await?;
    print_success("Signed out");
    Ok(())
}

pub async fn handle_whoami_command(config: &Config) -> AppResult<()> {
    let sessions = file_sessions(config)?;
    match sessions.current_session().await? {
        Some(session) => {
            OutputStyle::print_field_colored("Name", &session.user.name, OutputStyle::title);
            OutputStyle::print_field_colored("Email", &session.user.email, OutputStyle::description);
            OutputStyle::print_field_colored(
                "Expires",
                &format_datetime(&session.expires_at),
                OutputStyle::muted,
            );
        }
        None => println!("{}", OutputStyle::muted("Not signed in")),
    }
    Ok(())
}
