use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub langbase: LangbaseConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub pipes: PipeConfig,
    pub game: GameConfig,
}

/// Langbase API configuration
///
/// A missing API key is not a load error: it surfaces as a configuration
/// failure the first time a case is requested.
#[derive(Debug, Clone)]
pub struct LangbaseConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Langbase pipe name configuration
#[derive(Debug, Clone)]
pub struct PipeConfig {
    pub case: String,
    pub hint: String,
}

/// Game pacing configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Length of the celebration interlude before the success screen
    pub celebration_ms: u64,
    /// Number of digits in a clue-lock code
    pub puzzle_length: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let langbase = LangbaseConfig {
            api_key: env::var("LANGBASE_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: env::var("LANGBASE_BASE_URL")
                .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/mystery.db".to_string()),
            ),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 30000),
            max_retries: parse_env("MAX_RETRIES", 3),
            retry_delay_ms: parse_env("RETRY_DELAY_MS", 1000),
        };

        let pipes = PipeConfig {
            case: env::var("PIPE_CASE").unwrap_or_else(|_| "mystery-case-v1".to_string()),
            hint: env::var("PIPE_HINT").unwrap_or_else(|_| "mystery-hint-v1".to_string()),
        };

        let game = GameConfig {
            celebration_ms: parse_env("CELEBRATION_MS", 2500),
            puzzle_length: parse_env("PUZZLE_LENGTH", 4),
        };

        if game.puzzle_length == 0 {
            return Err(AppError::Config {
                message: "PUZZLE_LENGTH must be at least 1".to_string(),
            });
        }

        Ok(Config {
            langbase,
            database,
            logging,
            request,
            pipes,
            game,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            case: "mystery-case-v1".to_string(),
            hint: "mystery-hint-v1".to_string(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            celebration_ms: 2500,
            puzzle_length: 4,
        }
    }
}
