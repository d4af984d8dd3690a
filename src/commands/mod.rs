pub mod delete;
pub mod r#move;
pub mod session;
pub mod status;
pub mod undo;

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use calbulk_core::{
    AuthorizationProvider, BatchResult, BearerToken, BulkOperationEngine, BulkResult,
    FileUndoStore, Operation, ResourceId, SelectionState, StaticTokenProvider,
};
use calbulk_provider_google::{GoogleCalendarApi, Session, SessionTokenProvider};
use indicatif::ProgressBar;

use crate::config::CliConfig;
use crate::render::{BatchReport, Render};
use crate::utils::tui;

/// Everything a command needs, resolved once from config and flags.
pub struct App {
    pub config: CliConfig,
    token: Option<String>,
}

impl App {
    pub fn new(config: CliConfig, token: Option<String>) -> Self {
        App { config, token }
    }

    /// `--token` / `CALBULK_TOKEN` wins over the stored session.
    pub fn auth(&self) -> Result<Arc<dyn AuthorizationProvider>> {
        match &self.token {
            Some(token) => Ok(Arc::new(StaticTokenProvider::new(Some(BearerToken::new(
                token.clone(),
            ))))),
            None => Ok(Arc::new(SessionTokenProvider::new(Session::default_path()?))),
        }
    }

    pub fn uses_stored_session(&self) -> bool {
        self.token.is_none()
    }

    pub fn undo_store(&self) -> Result<FileUndoStore> {
        Ok(FileUndoStore::new(self.undo_path()?))
    }

    pub fn undo_path(&self) -> Result<PathBuf> {
        self.config
            .engine
            .undo_path()
            .context("Could not locate the undo record")
    }

    pub fn engine(&self) -> Result<BulkOperationEngine> {
        let api = GoogleCalendarApi::new(&self.config.google)?;

        Ok(BulkOperationEngine::new(
            Arc::new(api),
            self.auth()?,
            Arc::new(self.undo_store()?),
            &self.config.engine,
        ))
    }
}

/// Ids from the command line, or whitespace-separated from piped stdin.
pub fn read_selection(ids: Vec<String>) -> Result<SelectionState> {
    if !ids.is_empty() {
        return Ok(parse_ids(&ids.join(" ")));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!(
            "No event ids given.\n\n\
            Pass them as arguments or pipe them in:\n  \
            calbulk delete abc123 def456\n  \
            cat ids.txt | calbulk move 30"
        );
    }

    let mut input = String::new();
    stdin
        .read_to_string(&mut input)
        .context("Failed to read event ids from stdin")?;

    Ok(parse_ids(&input))
}

fn parse_ids(input: &str) -> SelectionState {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|id| !id.is_empty())
        .map(ResourceId::from)
        .collect()
}

/// Show a progress bar fed by the engine's wave callback.
pub fn attach_progress(engine: &mut BulkOperationEngine, operation: &Operation) -> ProgressBar {
    let bar = tui::create_progress_bar(operation);
    engine.set_progress_callback(tui::progress_callback(&bar, operation));
    bar
}

/// Clear the bar, print the report, and map the verdict to an exit code.
pub fn finish(
    bar: ProgressBar,
    operation: &Operation,
    result: BulkResult<BatchResult>,
) -> Result<ExitCode> {
    bar.finish_and_clear();
    let result = result?;

    println!("{}", BatchReport::new(operation, &result).render());

    Ok(exit_code(&result))
}

pub fn exit_code(result: &BatchResult) -> ExitCode {
    if result.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
