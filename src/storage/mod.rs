//! Storage layer for player progress.
//!
//! This module provides SQLite-based storage for player profiles, the current
//! login session and the history of finished cases, plus [`AccountService`],
//! which exposes them to the game as a [`ProgressStore`](crate::game::ProgressStore).

mod account;
mod sqlite;


pub use account::AccountService;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageResult;
use crate::game::progression::STARTING_XP_THRESHOLD;
use crate::game::Difficulty;

/// A player's persistent progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Unique player name.
    pub username: String,
    /// Current level, starting at 1.
    pub level: u32,
    /// XP earned towards the next level. Always below `xp_to_next_level`.
    pub current_xp: u32,
    /// XP needed to reach the next level.
    pub xp_to_next_level: u32,
    /// Number of cases solved.
    pub cases_solved: u32,
    /// Lifetime XP; never decreases.
    pub total_xp: u64,
}

impl PlayerProfile {
    /// A fresh level-1 profile.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            level: 1,
            current_xp: 0,
            xp_to_next_level: STARTING_XP_THRESHOLD,
            cases_solved: 0,
            total_xp: 0,
        }
    }

    /// Progress towards the next level as a fraction in `[0, 1)`.
    pub fn level_progress(&self) -> f64 {
        if self.xp_to_next_level == 0 {
            return 0.0;
        }
        f64::from(self.current_xp) / f64::from(self.xp_to_next_level)
    }
}

/// Result of persisting an XP award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    /// Profile after the award.
    pub profile: PlayerProfile,
    /// Whether the award crossed at least one level boundary.
    pub leveled_up: bool,
}

/// How a finished case ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    /// The player accused the culprit.
    Solved,
    /// The player gave up after a wrong accusation and was shown the answer.
    Revealed,
}

impl std::fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseOutcome::Solved => write!(f, "solved"),
            CaseOutcome::Revealed => write!(f, "revealed"),
        }
    }
}

impl std::str::FromStr for CaseOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solved" => Ok(CaseOutcome::Solved),
            "revealed" => Ok(CaseOutcome::Revealed),
            _ => Err(format!("Unknown case outcome: {}", s)),
        }
    }
}

/// One finished case in a player's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Unique record identifier.
    pub id: String,
    /// Player who played the case.
    pub username: String,
    /// Case title.
    pub title: String,
    /// Case difficulty.
    pub difficulty: Difficulty,
    /// How it ended.
    pub outcome: CaseOutcome,
    /// XP granted (0 when the answer was revealed).
    pub reward: u32,
    /// When the case was finished.
    pub created_at: DateTime<Utc>,
}

impl CaseRecord {
    /// Create a new record stamped with the current time
    pub fn new(
        username: impl Into<String>,
        title: impl Into<String>,
        difficulty: Difficulty,
        outcome: CaseOutcome,
        reward: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            title: title.into(),
            difficulty,
            outcome,
            reward,
            created_at: Utc::now(),
        }
    }
}

/// Storage trait for database operations.
#[async_trait]
pub trait Storage: Send + Sync {
    // Profile operations

    /// Create a new profile.
    async fn create_profile(&self, profile: &PlayerProfile) -> StorageResult<()>;
    /// Get a profile by username.
    async fn get_profile(&self, username: &str) -> StorageResult<Option<PlayerProfile>>;
    /// Update an existing profile.
    async fn update_profile(&self, profile: &PlayerProfile) -> StorageResult<()>;

    // Login session operations

    /// Mark `username` as the logged-in player, replacing any previous login.
    async fn set_current_user(&self, username: &str) -> StorageResult<()>;
    /// Username of the logged-in player.
    async fn get_current_user(&self) -> StorageResult<Option<String>>;
    /// Forget the logged-in player.
    async fn clear_current_user(&self) -> StorageResult<()>;

    // Case history operations

    /// Append a finished case.
    async fn create_case_record(&self, record: &CaseRecord) -> StorageResult<()>;
    /// Most recent finished cases of a player, newest first.
    async fn get_case_records(&self, username: &str, limit: u32)
        -> StorageResult<Vec<CaseRecord>>;
}
