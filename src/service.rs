use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::MatchingConfig;
use crate::error::{MatchError, Result};
use crate::logging::OperationTimer;
use crate::metrics::MatchMetrics;
use crate::models::{
    CandidateFilter, ConversationPartner, InteractionType, MatchInteraction, MessageKind, MessagePayload,
    NewInteraction, Profile, ProfileUpdate, ScoredProfile,
};
use crate::ranking;
use crate::repository::{InteractionStore, ProfileStore};
use crate::validation::InputValidator;

/// Matching operations over injected profile and interaction stores.
///
/// Every store round-trip is bounded by `MatchingConfig::store_timeout_ms`.
/// Store failures are returned to the caller; nothing is substituted.
pub struct MatchService {
    profiles: Arc<dyn ProfileStore>,
    interactions: Arc<dyn InteractionStore>,
    settings: MatchingConfig,
    metrics: MatchMetrics,
}

impl MatchService {
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        interactions: Arc<dyn InteractionStore>,
        settings: MatchingConfig,
    ) -> Self {
        Self {
            profiles,
            interactions,
            settings,
            metrics: MatchMetrics::default(),
        }
    }

    /// Service whose profile and interaction stores are the same object
    #[must_use]
    pub fn with_store<S>(store: Arc<S>, settings: MatchingConfig) -> Self
    where
        S: ProfileStore + InteractionStore + 'static,
    {
        Self::new(store.clone(), store, settings)
    }

    #[must_use]
    pub const fn settings(&self) -> &MatchingConfig {
        &self.settings
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let timer = OperationTimer::new(operation);
        let outcome = match tokio::time::timeout(self.settings.store_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(MatchError::Timeout {
                operation,
                timeout_ms: self.settings.store_timeout_ms,
            }),
        };

        self.metrics.record_store_operation(operation, timer.elapsed(), outcome.is_ok());
        if let Err(err) = &outcome {
            self.metrics.record_error(err.kind(), operation);
            warn!(operation, error = %err, "Store operation failed");
        }
        outcome
    }

    async fn require_profile(&self, wallet_address: &str) -> Result<Profile> {
        self.bounded("profiles.get_by_key", self.profiles.get_by_key(wallet_address))
            .await?
            .ok_or_else(|| MatchError::ProfileNotFound(wallet_address.to_string()))
    }

    /// Best-scoring candidates for `requester_key`, highest score first.
    ///
    /// `limit` defaults to `MatchingConfig::default_limit`. An empty pool is
    /// an empty result, not an error.
    pub async fn get_potential_matches(&self, requester_key: &str, limit: Option<usize>) -> Result<Vec<ScoredProfile>> {
        let limit = limit.unwrap_or(self.settings.default_limit);
        let requester_key = InputValidator::normalize_wallet_address(requester_key)?;
        InputValidator::validate_limit(limit, self.settings.max_limit)?;

        let timer = OperationTimer::new("get_potential_matches");
        let requester = self.require_profile(&requester_key).await?;

        let filter = CandidateFilter::for_requester(&requester);
        filter.validate()?;

        let pool_size = limit.saturating_mul(self.settings.candidate_pool_multiplier);
        let pool = self.bounded("profiles.query", self.profiles.query(&filter, pool_size)).await?;
        let scored_count = pool.len();

        let ranked = ranking::rank_candidates(&requester, pool, limit);

        self.metrics.record_ranking(scored_count, ranked.len(), timer.elapsed());
        info!(
            requester = %requester_key,
            pool = scored_count,
            returned = ranked.len(),
            "Ranked potential matches"
        );
        timer.finish();

        Ok(ranked)
    }

    /// Append a `message` interaction from `from` to `to`
    pub async fn record_message(
        &self,
        from: &str,
        to: &str,
        kind: MessageKind,
        content: Option<String>,
        url: Option<String>,
    ) -> Result<MatchInteraction> {
        let payload = MessagePayload { kind, content, url };
        self.record(from, to, InteractionType::Message, Some(payload)).await
    }

    /// Append a `view_profile` interaction from `from` to `to`
    pub async fn record_profile_view(&self, from: &str, to: &str) -> Result<MatchInteraction> {
        self.record(from, to, InteractionType::ViewProfile, None).await
    }

    async fn record(
        &self,
        from: &str,
        to: &str,
        interaction_type: InteractionType,
        message: Option<MessagePayload>,
    ) -> Result<MatchInteraction> {
        let from = InputValidator::normalize_wallet_address(from)?;
        let to = InputValidator::normalize_wallet_address(to)?;
        if from == to {
            return Err(MatchError::Validation("sender and recipient must differ".to_string()));
        }

        let new_interaction = NewInteraction {
            sender: from.clone(),
            recipient: to.clone(),
            interaction_type,
            message,
            created_at: Utc::now(),
        };

        let stored = self
            .bounded("interactions.append", self.interactions.append(new_interaction))
            .await?;
        self.metrics.record_interaction(interaction_type);
        debug!(
            id = stored.id,
            sender = %from,
            recipient = %to,
            interaction_type = interaction_type.as_str(),
            "Interaction recorded"
        );
        Ok(stored)
    }

    /// Everyone who has messaged `me`, most recent first, one entry per sender
    pub async fn get_users_who_messaged_me(&self, me: &str) -> Result<Vec<ConversationPartner>> {
        let me = InputValidator::normalize_wallet_address(me)?;
        let received = self
            .bounded(
                "interactions.query_by_recipient",
                self.interactions.query_by_recipient(&me, InteractionType::Message),
            )
            .await?;
        self.partners(received, |i| i.sender.as_str()).await
    }

    /// Everyone `me` has messaged, most recent first, one entry per recipient
    pub async fn get_users_i_messaged(&self, me: &str) -> Result<Vec<ConversationPartner>> {
        let me = InputValidator::normalize_wallet_address(me)?;
        let sent = self
            .bounded(
                "interactions.query_by_sender",
                self.interactions.query_by_sender(&me, InteractionType::Message),
            )
            .await?;
        self.partners(sent, |i| i.recipient.as_str()).await
    }

    async fn partners<F>(&self, interactions: Vec<MatchInteraction>, counterpart: F) -> Result<Vec<ConversationPartner>>
    where
        F: Fn(&MatchInteraction) -> &str,
    {
        // counterpart -> (latest time, latest id, count)
        let mut latest: HashMap<String, (DateTime<Utc>, i64, usize)> = HashMap::new();
        for interaction in &interactions {
            let entry = latest
                .entry(counterpart(interaction).to_string())
                .or_insert((interaction.created_at, interaction.id, 0));
            if (interaction.created_at, interaction.id) > (entry.0, entry.1) {
                entry.0 = interaction.created_at;
                entry.1 = interaction.id;
            }
            entry.2 += 1;
        }

        let mut order: Vec<(String, DateTime<Utc>, i64, usize)> = latest
            .into_iter()
            .map(|(key, (at, id, count))| (key, at, id, count))
            .collect();
        order.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

        let keys: Vec<String> = order.iter().map(|(key, ..)| key.clone()).collect();
        let found = self.bounded("profiles.get_many", self.profiles.get_many(&keys)).await?;
        let mut by_key: HashMap<String, Profile> =
            found.into_iter().map(|p| (p.wallet_address.clone(), p)).collect();

        let mut partners = Vec::with_capacity(order.len());
        for (key, last_interaction_at, _, message_count) in order {
            match by_key.remove(&key) {
                Some(profile) => partners.push(ConversationPartner {
                    profile,
                    last_interaction_at,
                    message_count,
                }),
                None => warn!(counterpart = %key, "Skipping interaction with unknown profile"),
            }
        }

        Ok(partners)
    }

    /// Fetch a profile, failing with `ProfileNotFound` when absent
    pub async fn get_profile(&self, wallet_address: &str) -> Result<Profile> {
        let wallet_address = InputValidator::normalize_wallet_address(wallet_address)?;
        self.require_profile(&wallet_address).await
    }

    /// Validate and store a full profile (onboarding or replacement)
    pub async fn save_profile(&self, mut profile: Profile) -> Result<Profile> {
        profile.wallet_address = InputValidator::normalize_wallet_address(&profile.wallet_address)?;
        profile.display_name = InputValidator::sanitize_text(&profile.display_name);
        profile.bio = InputValidator::sanitize_text(&profile.bio);
        InputValidator::validate_profile(&profile, self.settings.minimum_age)?;

        let stored = self.bounded("profiles.upsert", self.profiles.upsert(profile)).await?;
        info!(wallet_address = %stored.wallet_address, "Profile saved");
        Ok(stored)
    }

    /// Apply an owner's field-level update to an existing profile
    pub async fn update_profile(&self, wallet_address: &str, update: ProfileUpdate) -> Result<Profile> {
        let mut profile = self.get_profile(wallet_address).await?;
        update.apply_to(&mut profile);
        profile.last_active = Utc::now();
        self.save_profile(profile).await
    }

    /// Soft-deactivate a profile so it no longer appears in candidate pools
    pub async fn deactivate_profile(&self, wallet_address: &str) -> Result<Profile> {
        let mut profile = self.get_profile(wallet_address).await?;
        profile.is_active = false;
        let stored = self.bounded("profiles.upsert", self.profiles.upsert(profile)).await?;
        info!(wallet_address, "Profile deactivated");
        Ok(stored)
    }
}
