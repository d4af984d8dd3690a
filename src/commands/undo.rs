use std::process::ExitCode;

use anyhow::Result;
use calbulk_core::{Operation, UndoAction};
use owo_colors::OwoColorize;

use crate::commands::{App, attach_progress, finish};
use crate::render::Render;

pub async fn run(app: &App) -> Result<ExitCode> {
    let mut engine = app.engine()?;

    let Some(record) = engine.last_action()? else {
        println!("{}", "Nothing to undo.".dimmed());
        return Ok(ExitCode::SUCCESS);
    };

    println!("Undoing: {}", record.render());

    let operation = match (record.action, record.delta) {
        (UndoAction::Move, Some(delta)) => Operation::MoveBy(-delta),
        _ => Operation::Recreate,
    };

    let bar = attach_progress(&mut engine, &operation);
    let result = engine
        .undo_last_action()
        .await
        .map(|undone| undone.unwrap_or_default());

    finish(bar, &operation, result)
}
