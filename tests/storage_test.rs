//! Integration tests for SQLite storage layer
//!
//! Tests database operations using an in-memory SQLite database, plus one
//! file-backed database to check that progress survives a reopen.

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use langbase_mystery::config::DatabaseConfig;
use langbase_mystery::error::StorageError;
use langbase_mystery::game::{Difficulty, ProgressStore};
use langbase_mystery::storage::{
    AccountService, CaseOutcome, CaseRecord, PlayerProfile, SqliteStorage, Storage,
};

/// Create an in-memory storage instance for testing
async fn create_test_storage() -> SqliteStorage {
    SqliteStorage::new_in_memory()
        .await
        .expect("Failed to create in-memory storage")
}

#[cfg(test)]
mod profile_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_and_get_profile() {
        let storage = create_test_storage().await;
        let profile = PlayerProfile::new("marple");

        storage.create_profile(&profile).await.unwrap();
        let retrieved = storage.get_profile("marple").await.unwrap();

        assert_eq!(retrieved, Some(profile));
    }

    #[tokio::test]
    async fn test_get_missing_profile() {
        let storage = create_test_storage().await;
        assert!(storage.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_profile_fails() {
        let storage = create_test_storage().await;
        let profile = PlayerProfile::new("marple");

        storage.create_profile(&profile).await.unwrap();
        assert!(storage.create_profile(&profile).await.is_err());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let storage = create_test_storage().await;
        let mut profile = PlayerProfile::new("marple");
        storage.create_profile(&profile).await.unwrap();

        profile.level = 3;
        profile.current_xp = 40;
        profile.xp_to_next_level = 225;
        profile.cases_solved = 4;
        profile.total_xp = 290;
        storage.update_profile(&profile).await.unwrap();

        assert_eq!(storage.get_profile("marple").await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_update_missing_profile() {
        let storage = create_test_storage().await;
        let result = storage.update_profile(&PlayerProfile::new("ghost")).await;

        assert!(matches!(
            result,
            Err(StorageError::ProfileNotFound { ref username }) if username == "ghost"
        ));
    }
}

#[cfg(test)]
mod login_session_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_current_user_lifecycle() {
        let storage = create_test_storage().await;
        storage
            .create_profile(&PlayerProfile::new("marple"))
            .await
            .unwrap();
        storage
            .create_profile(&PlayerProfile::new("poirot"))
            .await
            .unwrap();

        assert_eq!(storage.get_current_user().await.unwrap(), None);

        storage.set_current_user("marple").await.unwrap();
        assert_eq!(
            storage.get_current_user().await.unwrap().as_deref(),
            Some("marple")
        );

        // Only one player is logged in at a time
        storage.set_current_user("poirot").await.unwrap();
        assert_eq!(
            storage.get_current_user().await.unwrap().as_deref(),
            Some("poirot")
        );

        storage.clear_current_user().await.unwrap();
        assert_eq!(storage.get_current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_requires_existing_profile() {
        let storage = create_test_storage().await;
        assert!(storage.set_current_user("nobody").await.is_err());
    }
}

#[cfg(test)]
mod case_history_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_records_newest_first_with_limit() {
        let storage = create_test_storage().await;
        storage
            .create_profile(&PlayerProfile::new("marple"))
            .await
            .unwrap();

        for (title, outcome, reward) in [
            ("First", CaseOutcome::Solved, 50),
            ("Second", CaseOutcome::Revealed, 0),
            ("Third", CaseOutcome::Solved, 200),
        ] {
            let record = CaseRecord::new("marple", title, Difficulty::Easy, outcome, reward);
            storage.create_case_record(&record).await.unwrap();
        }

        let records = storage.get_case_records("marple", 2).await.unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "Second"]);
        assert_eq!(records[1].outcome, CaseOutcome::Revealed);
        assert_eq!(records[1].reward, 0);
    }

    #[tokio::test]
    async fn test_record_roundtrip_keeps_fields() {
        let storage = create_test_storage().await;
        storage
            .create_profile(&PlayerProfile::new("marple"))
            .await
            .unwrap();

        let record = CaseRecord::new(
            "marple",
            "The Orchid Cipher",
            Difficulty::Hard,
            CaseOutcome::Solved,
            200,
        );
        storage.create_case_record(&record).await.unwrap();

        let stored = &storage.get_case_records("marple", 10).await.unwrap()[0];
        assert_eq!(stored.id, record.id);
        assert_eq!(stored.difficulty, Difficulty::Hard);
        assert_eq!(stored.created_at.timestamp(), record.created_at.timestamp());
    }

    #[tokio::test]
    async fn test_records_are_per_player() {
        let storage = create_test_storage().await;
        storage
            .create_profile(&PlayerProfile::new("marple"))
            .await
            .unwrap();

        let record = CaseRecord::new("marple", "Mine", Difficulty::Medium, CaseOutcome::Solved, 100);
        storage.create_case_record(&record).await.unwrap();

        assert!(storage
            .get_case_records("poirot", 10)
            .await
            .unwrap()
            .is_empty());
    }
}

#[cfg(test)]
mod file_backed_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(dir: &TempDir) -> DatabaseConfig {
        DatabaseConfig {
            path: dir.path().join("nested").join("mystery.db"),
            max_connections: 2,
        }
    }

    #[tokio::test]
    async fn test_progress_survives_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let accounts = AccountService::new(SqliteStorage::new(&config(&dir)).await.unwrap());
            accounts.login("marple").await.unwrap();
            let award = accounts.add_xp(200).await.unwrap();
            assert!(award.leveled_up);
        }

        let accounts = AccountService::new(SqliteStorage::new(&config(&dir)).await.unwrap());
        let profile = accounts
            .current_session()
            .await
            .unwrap()
            .expect("session persisted");

        assert_eq!(profile.username, "marple");
        assert_eq!(profile.level, 2);
        assert_eq!(profile.current_xp, 100);
        assert_eq!(profile.xp_to_next_level, 150);
        assert_eq!(profile.cases_solved, 1);
        assert_eq!(profile.total_xp, 200);
    }
}
