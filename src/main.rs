use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use langbase_mystery::{
    cli::{self, Cli, Commands},
    config::{Config, LogFormat},
    game::{Collaborators, GameStateMachine},
    langbase::{LangbaseClient, MysteryOracle},
    storage::{AccountService, SqliteStorage},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Langbase Mystery starting...");

    // Initialize storage
    let storage = match SqliteStorage::new(&config.database).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "Database initialized");
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            return Err(e.into());
        }
    };
    let accounts = Arc::new(AccountService::new(storage));

    let command = cli.command.unwrap_or(Commands::Play);
    if command != Commands::Play {
        let result = cli::execute_command(command, &*accounts).await;
        if result.exit_code == 0 {
            println!("{}", result.message);
        } else {
            eprintln!("{}", result.message);
        }
        std::process::exit(result.exit_code);
    }

    // Initialize Langbase client
    let langbase = match LangbaseClient::new(&config.langbase, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %config.langbase.base_url, "Langbase client initialized");
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Langbase client");
            return Err(e.into());
        }
    };

    if langbase.has_api_key() {
        info!("Ensuring required Langbase pipes exist...");
        if let Err(e) = langbase.ensure_pipes(&config.pipes).await {
            warn!(error = %e, "Could not ensure pipes exist, continuing with existing ones");
        }
    } else {
        warn!("LANGBASE_API_KEY is not set, cases cannot be generated");
    }

    let oracle = Arc::new(MysteryOracle::new(langbase, &config.pipes));
    let collaborators = Collaborators {
        generator: oracle.clone(),
        hints: oracle,
        progress: accounts,
    };
    let mut machine = GameStateMachine::new(collaborators, config.game.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = cli::run(&mut machine, stdin, std::io::stdout()).await {
        error!(error = %e, "Terminal error");
        return Err(e.into());
    }

    info!("Game closed");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
