use std::process::ExitCode;

use anyhow::{Context, Result};
use calbulk_core::BearerToken;
use calbulk_provider_google::{Session, fetch_account_email};
use dialoguer::Password;
use owo_colors::OwoColorize;

use crate::commands::App;
use crate::utils::tui;

pub async fn login(app: &App, token: Option<String>, expires_in: Option<i64>) -> Result<ExitCode> {
    let token = match token {
        Some(token) => token,
        None => Password::new()
            .with_prompt("Google access token")
            .interact()
            .context("Failed to read access token")?,
    };
    let token = token.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Access token is empty");
    }

    let spinner = tui::create_spinner("Verifying token...".to_string());
    let email = fetch_account_email(
        &BearerToken::new(token.clone()),
        app.config.google.request_timeout(),
    )
    .await;
    spinner.finish_and_clear();

    let email = email.context("Google did not accept this token")?;

    let path = Session::default_path()?;
    Session::new(&path, &token, Some(email.clone()), expires_in).save()?;

    println!("Signed in as {}", email.green());
    Ok(ExitCode::SUCCESS)
}

pub fn logout() -> Result<ExitCode> {
    if Session::remove(&Session::default_path()?)? {
        println!("Signed out.");
    } else {
        println!("{}", "Not signed in.".dimmed());
    }
    Ok(ExitCode::SUCCESS)
}
