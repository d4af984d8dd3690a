use std::process::ExitCode;

use anyhow::Result;
use calbulk_core::{AuthError, UndoStore};
use calbulk_provider_google::{Session, fetch_account_email};
use chrono::Local;
use owo_colors::OwoColorize;

use crate::commands::App;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(app: &App) -> Result<ExitCode> {
    // A status check must never prompt.
    match app.auth()?.get_token(false).await {
        Ok(token) => {
            let spinner = tui::create_spinner("Checking account...".to_string());
            let email = fetch_account_email(&token, app.config.google.request_timeout()).await;
            spinner.finish_and_clear();

            match email {
                Ok(email) => println!("Signed in as {}", email.green()),
                Err(e) => println!("{} {:#}", "Token rejected:".red(), e),
            }

            if app.uses_stored_session() {
                let expiry = Session::load(&Session::default_path()?)?
                    .and_then(|session| session.expires_at());
                if let Some(expires_at) = expiry {
                    let local = expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
                    println!("{}", format!("Session expires at {}", local).dimmed());
                }
            }
        }
        Err(AuthError::NotSignedIn) => {
            println!("{}", "Not signed in.".yellow());
            println!("Run `calbulk login` or pass --token.");
        }
        Err(e) => println!("{} {}", "Not signed in:".yellow(), e),
    }

    println!("Calendar: {}", app.config.google.calendar_id);

    match app.undo_store()?.load()? {
        Some(record) => println!("Last action: {}", record.render()),
        None => println!("Last action: {}", "nothing to undo".dimmed()),
    }

    Ok(ExitCode::SUCCESS)
}
