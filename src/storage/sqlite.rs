use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use super::{CaseOutcome, CaseRecord, PlayerProfile, Storage};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};
use crate::game::Difficulty;

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed storage implementation
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create a storage instance backed by a private in-memory database.
    ///
    /// Uses a single connection, since every SQLite connection to `:memory:`
    /// opens its own database.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_profile(&self, profile: &PlayerProfile) -> StorageResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO profiles (username, level, current_xp, xp_to_next_level, cases_solved, total_xp, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.username)
        .bind(i64::from(profile.level))
        .bind(i64::from(profile.current_xp))
        .bind(i64::from(profile.xp_to_next_level))
        .bind(i64::from(profile.cases_solved))
        .bind(to_db_u64(profile.total_xp))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_profile(&self, username: &str) -> StorageResult<Option<PlayerProfile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT username, level, current_xp, xp_to_next_level, cases_solved, total_xp
            FROM profiles
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn update_profile(&self, profile: &PlayerProfile) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET level = ?, current_xp = ?, xp_to_next_level = ?, cases_solved = ?, total_xp = ?, updated_at = ?
            WHERE username = ?
            "#,
        )
        .bind(i64::from(profile.level))
        .bind(i64::from(profile.current_xp))
        .bind(i64::from(profile.xp_to_next_level))
        .bind(i64::from(profile.cases_solved))
        .bind(to_db_u64(profile.total_xp))
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&profile.username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ProfileNotFound {
                username: profile.username.clone(),
            });
        }

        Ok(())
    }

    async fn set_current_user(&self, username: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_session (id, username, logged_in_at)
            VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET username = excluded.username, logged_in_at = excluded.logged_in_at
            "#,
        )
        .bind(username)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_current_user(&self) -> StorageResult<Option<String>> {
        let username: Option<String> =
            sqlx::query_scalar("SELECT username FROM auth_session WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(username)
    }

    async fn clear_current_user(&self) -> StorageResult<()> {
        sqlx::query("DELETE FROM auth_session")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_case_record(&self, record: &CaseRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO case_history (id, username, title, difficulty, outcome, reward, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.username)
        .bind(&record.title)
        .bind(record.difficulty.as_str())
        .bind(record.outcome.to_string())
        .bind(i64::from(record.reward))
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_case_records(
        &self,
        username: &str,
        limit: u32,
    ) -> StorageResult<Vec<CaseRecord>> {
        let rows: Vec<CaseRecordRow> = sqlx::query_as(
            r#"
            SELECT id, username, title, difficulty, outcome, reward, created_at
            FROM case_history
            WHERE username = ?
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )
        .bind(username)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CaseRecord::try_from).collect()
    }
}

fn to_db_u64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

// Internal row types for SQLx mapping
#[derive(sqlx::FromRow)]
struct ProfileRow {
    username: String,
    level: i64,
    current_xp: i64,
    xp_to_next_level: i64,
    cases_solved: i64,
    total_xp: i64,
}

impl From<ProfileRow> for PlayerProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            username: row.username,
            level: from_db_u32(row.level).max(1),
            current_xp: from_db_u32(row.current_xp),
            xp_to_next_level: from_db_u32(row.xp_to_next_level).max(1),
            cases_solved: from_db_u32(row.cases_solved),
            total_xp: u64::try_from(row.total_xp).unwrap_or(0),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CaseRecordRow {
    id: String,
    username: String,
    title: String,
    difficulty: String,
    outcome: String,
    reward: i64,
    created_at: String,
}

impl TryFrom<CaseRecordRow> for CaseRecord {
    type Error = StorageError;

    fn try_from(row: CaseRecordRow) -> Result<Self, Self::Error> {
        use chrono::DateTime;

        let difficulty =
            Difficulty::from_str(&row.difficulty).map_err(|message| StorageError::Query {
                message,
            })?;
        let outcome =
            CaseOutcome::from_str(&row.outcome).map_err(|message| StorageError::Query {
                message,
            })?;

        Ok(Self {
            id: row.id,
            username: row.username,
            title: row.title,
            difficulty,
            outcome,
            reward: from_db_u32(row.reward),
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}
