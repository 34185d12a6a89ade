//! Repository pattern for profile and interaction persistence.
//!
//! The service only talks to these traits. `SqliteRepository` is the durable
//! adapter; `InMemoryRepository` keeps everything in process memory.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::db::Database;
use crate::error::{MatchError, Result};
use crate::models::{CandidateFilter, InteractionType, MatchInteraction, NewInteraction, Profile};

/// Profile persistence collaborator
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile by wallet address
    async fn get_by_key(&self, wallet_address: &str) -> Result<Option<Profile>>;

    /// Fetch up to `limit` active profiles matching `filter`, in a stable order
    async fn query(&self, filter: &CandidateFilter, limit: usize) -> Result<Vec<Profile>>;

    /// Insert or replace a profile, returning the stored record
    async fn upsert(&self, profile: Profile) -> Result<Profile>;

    /// Fetch several profiles; unknown keys are skipped
    async fn get_many(&self, wallet_addresses: &[String]) -> Result<Vec<Profile>> {
        let mut found = Vec::with_capacity(wallet_addresses.len());
        for key in wallet_addresses {
            if let Some(profile) = self.get_by_key(key).await? {
                found.push(profile);
            }
        }
        Ok(found)
    }
}

/// Append-only interaction log collaborator
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Append one interaction
    async fn append(&self, interaction: NewInteraction) -> Result<MatchInteraction>;

    /// Interactions sent by `wallet_address`
    async fn query_by_sender(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>>;

    /// Interactions received by `wallet_address`
    async fn query_by_recipient(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>>;
}

/// Store adapter over the SQLite `Database`; blocking calls run off the runtime threads
#[derive(Clone)]
pub struct SqliteRepository {
    database: Database,
}

impl SqliteRepository {
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Database) -> Result<T> + Send + 'static,
    {
        let database = self.database.clone();
        tokio::task::spawn_blocking(move || work(database)).await?
    }
}

#[async_trait]
impl ProfileStore for SqliteRepository {
    async fn get_by_key(&self, wallet_address: &str) -> Result<Option<Profile>> {
        let key = wallet_address.to_string();
        self.blocking(move |db| db.get_profile(&key)).await
    }

    async fn query(&self, filter: &CandidateFilter, limit: usize) -> Result<Vec<Profile>> {
        let filter = filter.clone();
        self.blocking(move |db| db.query_profiles(&filter, limit)).await
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile> {
        self.blocking(move |db| db.upsert_profile(&profile)).await
    }

    async fn get_many(&self, wallet_addresses: &[String]) -> Result<Vec<Profile>> {
        let keys = wallet_addresses.to_vec();
        self.blocking(move |db| db.get_profiles(&keys)).await
    }
}

#[async_trait]
impl InteractionStore for SqliteRepository {
    async fn append(&self, interaction: NewInteraction) -> Result<MatchInteraction> {
        self.blocking(move |db| db.add_interaction(interaction)).await
    }

    async fn query_by_sender(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>> {
        let key = wallet_address.to_string();
        self.blocking(move |db| db.get_interactions_by_sender(&key, interaction_type))
            .await
    }

    async fn query_by_recipient(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>> {
        let key = wallet_address.to_string();
        self.blocking(move |db| db.get_interactions_by_recipient(&key, interaction_type))
            .await
    }
}

/// Process-local store; profiles keep insertion order
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    profiles: RwLock<Vec<Profile>>,
    interactions: RwLock<Vec<MatchInteraction>>,
}

fn poisoned<E>(_: E) -> MatchError {
    MatchError::StoreUnavailable("in-memory store lock poisoned".to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `profiles`, in the given order
    #[must_use]
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
            interactions: RwLock::default(),
        }
    }

    fn interactions_matching(
        &self,
        interaction_type: InteractionType,
        predicate: impl Fn(&MatchInteraction) -> bool,
    ) -> Result<Vec<MatchInteraction>> {
        let log = self.interactions.read().map_err(poisoned)?;
        let mut found: Vec<MatchInteraction> = log
            .iter()
            .filter(|i| i.interaction_type == interaction_type && predicate(i))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }
}

#[async_trait]
impl ProfileStore for InMemoryRepository {
    async fn get_by_key(&self, wallet_address: &str) -> Result<Option<Profile>> {
        let profiles = self.profiles.read().map_err(poisoned)?;
        Ok(profiles.iter().find(|p| p.wallet_address == wallet_address).cloned())
    }

    async fn query(&self, filter: &CandidateFilter, limit: usize) -> Result<Vec<Profile>> {
        filter.validate()?;
        let profiles = self.profiles.read().map_err(poisoned)?;
        Ok(profiles.iter().filter(|p| filter.matches(p)).take(limit).cloned().collect())
    }

    async fn upsert(&self, mut profile: Profile) -> Result<Profile> {
        let mut profiles = self.profiles.write().map_err(poisoned)?;
        if let Some(existing) = profiles.iter_mut().find(|p| p.wallet_address == profile.wallet_address) {
            profile.created_at = existing.created_at;
            *existing = profile.clone();
        } else {
            profiles.push(profile.clone());
        }
        Ok(profile)
    }
}

#[async_trait]
impl InteractionStore for InMemoryRepository {
    async fn append(&self, interaction: NewInteraction) -> Result<MatchInteraction> {
        let mut log = self.interactions.write().map_err(poisoned)?;
        let id = log.last().map_or(1, |last| last.id + 1);
        let stored = MatchInteraction::from_new(id, interaction);
        log.push(stored.clone());
        Ok(stored)
    }

    async fn query_by_sender(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>> {
        self.interactions_matching(interaction_type, |i| i.sender == wallet_address)
    }

    async fn query_by_recipient(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>> {
        self.interactions_matching(interaction_type, |i| i.recipient == wallet_address)
    }
}
