//! Command-line interface.
//!
//! `play` runs the interactive game; the other subcommands inspect or change
//! the stored account without starting a game.

mod commands;
mod play;

pub use commands::{ParseCommandError, PlayerCommand, HELP};
pub use play::{render, run};

use clap::{Parser, Subcommand};

use crate::error::StorageError;
use crate::game::ProgressStore;
use crate::storage::{AccountService, Storage};

/// Deduction game backed by Langbase Pipes.
#[derive(Parser, Debug)]
#[command(name = "langbase-mystery", version, about)]
pub struct Cli {
    /// Subcommand to run; defaults to `play`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Play interactively (default)
    Play,

    /// Show the logged-in player's profile
    Profile,

    /// Show recently finished cases
    History {
        /// Maximum number of cases to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Log out the current player
    Logout,
}

/// Result of a one-shot command.
#[derive(Debug)]
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a non-interactive command against the account store.
///
/// `Play` is handled by the caller and reported as an error here.
pub async fn execute_command<S: Storage>(
    command: Commands,
    accounts: &AccountService<S>,
) -> CliResult {
    match command {
        Commands::Profile => execute_profile(accounts).await,
        Commands::History { limit } => execute_history(accounts, limit).await,
        Commands::Logout => execute_logout(accounts).await,
        Commands::Play => CliResult::error("play is interactive"),
    }
}

fn not_logged_in(e: StorageError) -> CliResult {
    match e {
        StorageError::NotAuthenticated => {
            CliResult::error("Nobody is logged in. Run `play` and log in first.")
        }
        other => CliResult::error(format!("Error: {}", other)),
    }
}

async fn execute_profile<S: Storage>(accounts: &AccountService<S>) -> CliResult {
    let profile = match accounts.require_profile().await {
        Ok(p) => p,
        Err(e) => return not_logged_in(e),
    };

    let mut output = String::new();
    output.push_str(&format!("Detective {}\n", profile.username));
    output.push_str(&format!("  Level:        {}\n", profile.level));
    output.push_str(&format!(
        "  XP:           {}/{} ({:.0}%)\n",
        profile.current_xp,
        profile.xp_to_next_level,
        profile.level_progress() * 100.0
    ));
    output.push_str(&format!("  Total XP:     {}\n", profile.total_xp));
    output.push_str(&format!("  Cases solved: {}", profile.cases_solved));
    CliResult::success(output)
}

async fn execute_history<S: Storage>(accounts: &AccountService<S>, limit: u32) -> CliResult {
    let records = match accounts.recent_cases(limit).await {
        Ok(r) => r,
        Err(e) => return not_logged_in(e),
    };

    if records.is_empty() {
        return CliResult::success("No cases finished yet.");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<17} {:<10} {:<9} {:>5}  {}\n",
        "WHEN", "DIFFICULTY", "OUTCOME", "XP", "CASE"
    ));
    for record in records {
        output.push_str(&format!(
            "{:<17} {:<10} {:<9} {:>5}  {}\n",
            record.created_at.format("%Y-%m-%d %H:%M").to_string(),
            record.difficulty.to_string(),
            record.outcome.to_string(),
            record.reward,
            record.title
        ));
    }
    CliResult::success(output.trim_end())
}

async fn execute_logout<S: Storage>(accounts: &AccountService<S>) -> CliResult {
    match accounts.logout().await {
        Ok(()) => CliResult::success("Logged out."),
        Err(e) => CliResult::error(format!("Logout failed: {}", e)),
    }
}
