use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Langbase error: {0}")]
    Langbase(#[from] LangbaseError),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Profile not found: {username}")]
    ProfileNotFound { username: String },

    #[error("No authenticated session")]
    NotAuthenticated,

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Langbase API errors
#[derive(Debug, Error)]
pub enum LangbaseError {
    #[error("LANGBASE_API_KEY is not configured")]
    MissingApiKey,

    #[error("Langbase unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Rule violations raised by the game core.
///
/// These are caller errors: the action was not legal in the current phase or
/// referred to something that is not part of the active case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Action '{action}' is not allowed in phase {phase}")]
    InvalidTransition { phase: String, action: String },

    #[error("At least one clue must be revealed before solving")]
    NoCluesRevealed,

    #[error("No suspect selected")]
    NoSuspectSelected,

    #[error("Unknown suspect: {option_id}")]
    UnknownSuspect { option_id: String },

    #[error("Unknown clue: {clue_id}")]
    UnknownClue { clue_id: u32 },

    #[error("No puzzle is open")]
    NoActivePuzzle,

    #[error("Invalid case: {message}")]
    InvalidCase { message: String },
}

/// Failure reported by an external collaborator (case generation, hints, progress).
///
/// The core only tells configuration problems apart from everything else.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Service misconfigured: {message}")]
    Configuration { message: String },

    #[error("Service unavailable: {message}")]
    Unavailable { message: String },
}

impl CollaboratorError {
    /// Build an unavailable error from anything displayable
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        CollaboratorError::Unavailable {
            message: err.to_string(),
        }
    }
}

impl From<LangbaseError> for CollaboratorError {
    fn from(err: LangbaseError) -> Self {
        match err {
            LangbaseError::MissingApiKey => CollaboratorError::Configuration {
                message: err.to_string(),
            },
            other => CollaboratorError::unavailable(other),
        }
    }
}

impl From<StorageError> for CollaboratorError {
    fn from(err: StorageError) -> Self {
        CollaboratorError::unavailable(err)
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for Langbase operations
pub type LangbaseResult<T> = Result<T, LangbaseError>;

/// Result type alias for game rule checks
pub type GameResult<T> = Result<T, GameError>;

/// Result type alias for collaborator calls
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = AppError::Internal {
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Internal error: unexpected");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Connection {
            message: "failed to connect".to_string(),
        };
        assert_eq!(err.to_string(), "Database connection failed: failed to connect");

        let err = StorageError::ProfileNotFound {
            username: "holmes".to_string(),
        };
        assert_eq!(err.to_string(), "Profile not found: holmes");

        assert_eq!(
            StorageError::NotAuthenticated.to_string(),
            "No authenticated session"
        );
    }

    #[test]
    fn test_langbase_error_display() {
        let err = LangbaseError::Unavailable {
            message: "server down".to_string(),
            retries: 3,
        };
        assert_eq!(err.to_string(), "Langbase unavailable: server down (retries: 3)");

        let err = LangbaseError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - unauthorized");

        let err = LangbaseError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_game_error_display() {
        let err = GameError::InvalidTransition {
            phase: "idle".to_string(),
            action: "solve".to_string(),
        };
        assert_eq!(err.to_string(), "Action 'solve' is not allowed in phase idle");

        let err = GameError::UnknownSuspect {
            option_id: "s9".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown suspect: s9");

        let err = GameError::UnknownClue { clue_id: 42 };
        assert_eq!(err.to_string(), "Unknown clue: 42");
    }

    #[test]
    fn test_missing_api_key_maps_to_configuration() {
        let err: CollaboratorError = LangbaseError::MissingApiKey.into();
        assert!(matches!(err, CollaboratorError::Configuration { .. }));
    }

    #[test]
    fn test_other_langbase_errors_map_to_unavailable() {
        let err: CollaboratorError = LangbaseError::Timeout { timeout_ms: 10 }.into();
        assert!(matches!(err, CollaboratorError::Unavailable { .. }));

        let err: CollaboratorError = LangbaseError::InvalidResponse {
            message: "garbage".to_string(),
        }
        .into();
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_storage_error_maps_to_unavailable() {
        let err: CollaboratorError = StorageError::NotAuthenticated.into();
        assert_eq!(
            err,
            CollaboratorError::Unavailable {
                message: "No authenticated session".to_string()
            }
        );
    }

    #[test]
    fn test_game_error_conversion_to_app_error() {
        let app_err: AppError = GameError::NoCluesRevealed.into();
        assert!(matches!(app_err, AppError::Game(_)));
    }

    #[test]
    fn test_storage_error_conversion_to_app_error() {
        let app_err: AppError = StorageError::NotAuthenticated.into();
        assert!(matches!(app_err, AppError::Storage(_)));
    }
}
