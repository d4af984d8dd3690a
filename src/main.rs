mod commands;
mod config;
mod render;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::App;
use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "calbulk")]
#[command(about = "Delete or move many Google Calendar events at once, with one-step undo")]
struct Cli {
    /// Bearer token to use instead of the stored session
    #[arg(long, global = true, env = "CALBULK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete events by id (ids are read from stdin when none are given)
    Delete {
        ids: Vec<String>,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Shift events by minutes or a duration like `1h30m` (negative moves them earlier)
    Move {
        #[arg(allow_hyphen_values = true, value_parser = utils::time::parse_minutes)]
        minutes: i64,

        ids: Vec<String>,
    },
    /// Revert the last delete or move
    Undo,
    /// Show the signed-in account and the action `undo` would revert
    Status,
    /// Store an access token for later commands
    Login {
        /// Prompted for when omitted
        token: Option<String>,

        /// Seconds until the token expires (Google access tokens last 3600)
        #[arg(long)]
        expires_in: Option<i64>,
    },
    /// Forget the stored access token
    Logout,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let app = App::new(CliConfig::load()?, cli.token);

    match cli.command {
        Commands::Delete { ids, yes } => commands::delete::run(&app, ids, yes).await,
        Commands::Move { minutes, ids } => commands::r#move::run(&app, ids, minutes).await,
        Commands::Undo => commands::undo::run(&app).await,
        Commands::Status => commands::status::run(&app).await,
        Commands::Login { token, expires_in } => {
            commands::session::login(&app, token, expires_in).await
        }
        Commands::Logout => commands::session::logout(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_accepts_negative_minutes() {
        let cli = Cli::try_parse_from(["calbulk", "move", "-90", "abc", "def"]).unwrap();
        match cli.command {
            Commands::Move { minutes, ids } => {
                assert_eq!(minutes, -90);
                assert_eq!(ids, vec!["abc", "def"]);
            }
            _ => panic!("expected move"),
        }
    }

    #[test]
    fn test_move_accepts_signed_durations() {
        let cli = Cli::try_parse_from(["calbulk", "move", "-1h30m", "abc"]).unwrap();
        assert!(matches!(cli.command, Commands::Move { minutes: -90, .. }));

        let cli = Cli::try_parse_from(["calbulk", "--token", "t", "move", "2days", "abc"]).unwrap();
        assert!(matches!(cli.command, Commands::Move { minutes: 2880, .. }));

        assert!(Cli::try_parse_from(["calbulk", "move", "45s", "abc"]).is_err());
    }

    #[test]
    fn test_token_flag_is_global() {
        let cli = Cli::try_parse_from(["calbulk", "delete", "--yes", "abc", "--token", "t"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert!(matches!(cli.command, Commands::Delete { yes: true, .. }));
    }
}
