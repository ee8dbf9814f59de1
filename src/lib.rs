//! # Langbase Mystery
//!
//! A single-player deduction game. Each case is written on demand by a
//! Langbase Pipe; the player uncovers clues (some behind a code lock), asks
//! for hints and accuses a suspect. Solved cases earn XP and levels, which
//! are persisted in SQLite.
//!
//! ## Architecture
//!
//! ```text
//! CLI driver → GameStateMachine → CaseGenerator / HintProvider → Langbase Pipes (HTTP)
//!                     ↓
//!               ProgressStore → AccountService → SQLite
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use langbase_mystery::{Config, GameStateMachine};
//! use langbase_mystery::game::Collaborators;
//! use langbase_mystery::langbase::{LangbaseClient, MysteryOracle};
//! use langbase_mystery::storage::{AccountService, SqliteStorage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let langbase = LangbaseClient::new(&config.langbase, config.request.clone())?;
//!     let oracle = Arc::new(MysteryOracle::new(langbase, &config.pipes));
//!     let collaborators = Collaborators {
//!         generator: oracle.clone(),
//!         hints: oracle,
//!         progress: Arc::new(AccountService::new(storage)),
//!     };
//!     let mut machine = GameStateMachine::new(collaborators, config.game.clone());
//!     machine.boot().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface and interactive driver.
pub mod cli;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Game core: data model, rules and the state machine.
pub mod game;
/// Langbase API client and pipe-backed case generation.
pub mod langbase;
/// System prompts for Langbase pipes.
pub mod prompts;
/// SQLite storage for profiles, login sessions and case history.
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use game::{GameStateMachine, SessionPhase};
