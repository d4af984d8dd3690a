use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use calbulk_core::Operation;
use dialoguer::Confirm;

use crate::commands::{App, attach_progress, finish, read_selection};

pub async fn run(app: &App, ids: Vec<String>, yes: bool) -> Result<ExitCode> {
    let selection = read_selection(ids)?;

    if selection.is_empty() {
        println!("No events selected.");
        return Ok(ExitCode::SUCCESS);
    }

    if !yes && !confirm(selection.len())? {
        return Ok(ExitCode::SUCCESS);
    }

    let mut engine = app.engine()?;
    let operation = Operation::Delete;

    let bar = attach_progress(&mut engine, &operation);
    let result = engine.bulk_delete(&selection).await;

    finish(bar, &operation, result)
}

fn confirm(count: usize) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Refusing to delete without confirmation. Pass --yes when piping ids.");
    }

    Confirm::new()
        .with_prompt(format!(
            "Are you sure you want to delete {} selected event(s)?",
            count
        ))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
