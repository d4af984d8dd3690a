use std::process::ExitCode;

use anyhow::Result;
use calbulk_core::Operation;

use crate::commands::{App, attach_progress, finish, read_selection};

pub async fn run(app: &App, ids: Vec<String>, minutes: i64) -> Result<ExitCode> {
    if minutes == 0 {
        anyhow::bail!("Nothing to do: move by a non-zero number of minutes.");
    }

    let selection = read_selection(ids)?;

    if selection.is_empty() {
        println!("No events selected.");
        return Ok(ExitCode::SUCCESS);
    }

    let mut engine = app.engine()?;
    let operation = Operation::MoveBy(minutes);

    let bar = attach_progress(&mut engine, &operation);
    let result = engine.bulk_move(&selection, minutes).await;

    finish(bar, &operation, result)
}
