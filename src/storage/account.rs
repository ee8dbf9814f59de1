use async_trait::async_trait;
use tracing::{debug, info};

use super::{CaseRecord, PlayerProfile, Storage, XpAward};
use crate::error::{CollaboratorError, CollaboratorResult, StorageError, StorageResult};
use crate::game::progression::apply_xp;
use crate::game::ProgressStore;

/// Login sessions and authoritative XP accounting on top of a [`Storage`].
#[derive(Clone)]
pub struct AccountService<S> {
    storage: S,
}

impl<S: Storage> AccountService<S> {
    /// Wrap a storage backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Profile of the logged-in player, failing when nobody is logged in.
    pub async fn require_profile(&self) -> StorageResult<PlayerProfile> {
        let username = self
            .storage
            .get_current_user()
            .await?
            .ok_or(StorageError::NotAuthenticated)?;

        self.storage
            .get_profile(&username)
            .await?
            .ok_or(StorageError::ProfileNotFound { username })
    }

    /// Most recent finished cases of the logged-in player.
    pub async fn recent_cases(&self, limit: u32) -> StorageResult<Vec<CaseRecord>> {
        let profile = self.require_profile().await?;
        self.storage
            .get_case_records(&profile.username, limit)
            .await
    }
}

#[async_trait]
impl<S: Storage> ProgressStore for AccountService<S> {
    async fn current_session(&self) -> CollaboratorResult<Option<PlayerProfile>> {
        let Some(username) = self.storage.get_current_user().await? else {
            return Ok(None);
        };
        Ok(self.storage.get_profile(&username).await?)
    }

    async fn login(&self, username: &str) -> CollaboratorResult<PlayerProfile> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CollaboratorError::Unavailable {
                message: "username cannot be empty".to_string(),
            });
        }

        let profile = match self.storage.get_profile(username).await? {
            Some(existing) => existing,
            None => {
                let profile = PlayerProfile::new(username);
                self.storage.create_profile(&profile).await?;
                info!(username = %username, "Created player profile");
                profile
            }
        };

        self.storage.set_current_user(username).await?;
        Ok(profile)
    }

    async fn logout(&self) -> CollaboratorResult<()> {
        self.storage.clear_current_user().await?;
        debug!("Cleared login session");
        Ok(())
    }

    async fn add_xp(&self, amount: u32) -> CollaboratorResult<XpAward> {
        let before = self.require_profile().await?;

        let (mut profile, leveled_up) = apply_xp(&before, amount);
        profile.cases_solved = profile.cases_solved.saturating_add(1);
        self.storage.update_profile(&profile).await?;

        info!(
            username = %profile.username,
            amount,
            level = profile.level,
            current_xp = profile.current_xp,
            leveled_up,
            "XP saved"
        );

        Ok(XpAward {
            profile,
            leveled_up,
        })
    }

    async fn record_case(&self, record: &CaseRecord) -> CollaboratorResult<()> {
        Ok(self.storage.create_case_record(record).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Difficulty;
    use crate::storage::{CaseOutcome, SqliteStorage};

    async fn service() -> AccountService<SqliteStorage> {
        let storage = SqliteStorage::new_in_memory()
            .await
            .expect("Failed to create in-memory storage");
        AccountService::new(storage)
    }

    #[tokio::test]
    async fn test_no_session_initially() {
        let accounts = service().await;
        assert!(accounts.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_creates_profile_once() {
        let accounts = service().await;

        let first = accounts.login("  lestrade ").await.unwrap();
        assert_eq!(first.username, "lestrade");
        assert_eq!(first.level, 1);

        accounts.add_xp(50).await.unwrap();
        accounts.logout().await.unwrap();

        let again = accounts.login("lestrade").await.unwrap();
        assert_eq!(again.current_xp, 50);
    }

    #[tokio::test]
    async fn test_login_rejects_blank_name() {
        let accounts = service().await;
        assert!(accounts.login("   ").await.is_err());
        assert!(accounts.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let accounts = service().await;
        accounts.login("lestrade").await.unwrap();
        assert!(accounts.current_session().await.unwrap().is_some());

        accounts.logout().await.unwrap();
        assert!(accounts.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_xp_requires_login() {
        let accounts = service().await;
        assert!(matches!(
            accounts.add_xp(100).await,
            Err(CollaboratorError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_xp_levels_up_and_persists() {
        let accounts = service().await;
        accounts.login("lestrade").await.unwrap();

        let award = accounts.add_xp(200).await.unwrap();
        assert!(award.leveled_up);
        assert_eq!(award.profile.level, 2);
        assert_eq!(award.profile.current_xp, 100);
        assert_eq!(award.profile.xp_to_next_level, 150);
        assert_eq!(award.profile.cases_solved, 1);
        assert_eq!(award.profile.total_xp, 200);

        let stored = accounts.current_session().await.unwrap().unwrap();
        assert_eq!(stored, award.profile);
    }

    #[tokio::test]
    async fn test_add_xp_without_level_up() {
        let accounts = service().await;
        accounts.login("lestrade").await.unwrap();

        let award = accounts.add_xp(50).await.unwrap();
        assert!(!award.leveled_up);
        assert_eq!(award.profile.level, 1);
        assert_eq!(award.profile.current_xp, 50);
    }

    #[tokio::test]
    async fn test_recent_cases_newest_first() {
        let accounts = service().await;
        accounts.login("lestrade").await.unwrap();

        for (title, outcome, reward) in [
            ("First", CaseOutcome::Solved, 50),
            ("Second", CaseOutcome::Revealed, 0),
            ("Third", CaseOutcome::Solved, 200),
        ] {
            let record = CaseRecord::new("lestrade", title, Difficulty::Easy, outcome, reward);
            accounts.record_case(&record).await.unwrap();
        }

        let recent = accounts.recent_cases(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "Third");
        assert_eq!(recent[1].title, "Second");
        assert_eq!(recent[1].outcome, CaseOutcome::Revealed);
    }
}
