use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    db::{InteractionStore, SessionCache, UserDirectory},
    error::{AppError, AppResult},
    models::{MatchStatus, NewInteraction, PartnerView, Requester},
    services::session::{push_bounded, PartnerSession},
};

/// Tunables of the matching engine
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Proposals an unverified user may receive per calendar day
    pub max_daily_views: u32,
    /// Time-to-live of every session cache write
    pub session_ttl: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_daily_views: 10,
            session_ttl: Duration::from_secs(60 * 60 * 24),
        }
    }
}

/// Selects partners, enforces the daily quota and records likes
///
/// Operations are not atomic: each step commits on its own and a failure
/// part-way leaves the steps before it in place.
pub struct MatchingEngine {
    users: Arc<dyn UserDirectory>,
    interactions: Arc<dyn InteractionStore>,
    session: PartnerSession,
    max_daily_views: u32,
    rng: Mutex<StdRng>,
}

impl MatchingEngine {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        interactions: Arc<dyn InteractionStore>,
        cache: Arc<dyn SessionCache>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            users,
            interactions,
            session: PartnerSession::new(cache, settings.session_ttl),
            max_daily_views: settings.max_daily_views,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replaces the entropy-seeded generator with a deterministic one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Proposes a new partner not among the user's recent views ("pass")
    #[tracing::instrument(skip(self), fields(user_id = requester.user_id))]
    pub async fn propose_partner(&self, requester: Requester) -> AppResult<PartnerView> {
        let today = Utc::now().date_naive();
        let views = self.check_quota(requester, today).await?;
        self.propose(requester, today, views).await
    }

    /// Returns the partner currently proposed to the user, proposing one if needed
    ///
    /// The quota applies even when a partner is already assigned.
    #[tracing::instrument(skip(self), fields(user_id = requester.user_id))]
    pub async fn current_partner(&self, requester: Requester) -> AppResult<PartnerView> {
        let today = Utc::now().date_naive();
        let views = self.check_quota(requester, today).await?;

        let partner_id = self.session.current_partner(requester.user_id).await?;
        if partner_id <= 0 {
            tracing::debug!("No current partner, proposing one");
            return self.propose(requester, today, views).await;
        }

        let partner = self.users.get_by_id(partner_id).await?;
        let status = self.derive_status(requester.user_id, partner_id).await;
        Ok(PartnerView::from_profile(partner, status))
    }

    /// Records a like for the user's current partner
    ///
    /// When the partner already liked the user both likes end up `Approved`.
    #[tracing::instrument(skip(self))]
    pub async fn like_partner(&self, user_id: i64) -> AppResult<()> {
        let partner_id = self.session.current_partner(user_id).await?;
        if partner_id <= 0 {
            return Err(AppError::NoCurrentPartner);
        }

        if self.interactions.count_by_pair(user_id, partner_id).await? > 0 {
            return Err(AppError::AlreadyLiked);
        }

        let reciprocal = self.interactions.count_by_pair(partner_id, user_id).await? > 0;
        let partner = self.users.get_by_id(partner_id).await?;
        let status = if reciprocal {
            MatchStatus::Approved
        } else {
            MatchStatus::Pending
        };

        self.interactions
            .create(NewInteraction {
                user_id,
                partner_id,
                partner_name: partner.fullname,
                status,
            })
            .await?;

        if reciprocal {
            self.interactions
                .update_status(partner_id, user_id, MatchStatus::Approved)
                .await?;
            tracing::info!(partner_id, "Mutual match");
        } else {
            tracing::info!(partner_id, "Partner liked");
        }

        Ok(())
    }

    /// Every like the user has made, with its stored status
    pub async fn list_liked(&self, user_id: i64) -> AppResult<Vec<PartnerView>> {
        let records = self.interactions.list_by_source(user_id).await?;
        Ok(records.into_iter().map(PartnerView::from).collect())
    }

    /// Display status of a partner: `Approved` once the user has liked them
    ///
    /// Only the user's own direction is checked. Lookup failures fall back
    /// to `Pending`.
    pub async fn derive_status(&self, user_id: i64, partner_id: i64) -> MatchStatus {
        match self.interactions.count_by_pair(user_id, partner_id).await {
            Ok(count) if count > 0 => MatchStatus::Approved,
            Ok(_) => MatchStatus::Pending,
            Err(e) => {
                tracing::warn!(error = %e, user_id, partner_id, "Status lookup failed");
                MatchStatus::Pending
            }
        }
    }

    /// Fails once an unverified user has used up today's quota
    ///
    /// Returns today's view count for unverified users, `None` for verified ones.
    async fn check_quota(&self, requester: Requester, day: NaiveDate) -> AppResult<Option<u32>> {
        if requester.is_verified {
            return Ok(None);
        }

        let views = self.session.daily_views(requester.user_id, day).await?;
        if views >= self.max_daily_views {
            tracing::info!(views, quota = self.max_daily_views, "Daily quota reached");
            return Err(AppError::QuotaExceeded);
        }

        Ok(Some(views))
    }

    async fn propose(
        &self,
        requester: Requester,
        day: NaiveDate,
        views: Option<u32>,
    ) -> AppResult<PartnerView> {
        let user_id = requester.user_id;
        let population = self.users.count().await?;
        let mut history = self.session.viewed_history(user_id).await?;

        let selection = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            choose_candidate(&mut *rng, user_id, population, &history)
        };
        let Some(Selection { partner_id, reset }) = selection else {
            return Err(AppError::NotFound(
                "no candidate partners available".to_string(),
            ));
        };

        // Nothing is written until the candidate's profile is confirmed
        let partner = self.users.get_by_id(partner_id).await?;

        if reset {
            tracing::debug!(population, "Viewed history exhausted, starting over");
            history.clear();
        }
        push_bounded(&mut history, partner_id);
        self.session.set_viewed_history(user_id, &history).await?;
        self.session.set_current_partner(user_id, partner_id).await?;

        if let Some(views) = views {
            self.session
                .set_daily_views(user_id, day, views + 1)
                .await?;
        }

        let status = self.derive_status(user_id, partner_id).await;
        tracing::info!(partner_id, status = %status, "Partner proposed");

        Ok(PartnerView::from_profile(partner, status))
    }
}

/// Outcome of a candidate draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub partner_id: i64,
    /// The history covered everyone and was ignored for this draw
    pub reset: bool,
}

/// Draws a partner id uniformly from `1..=population`
///
/// The user and everyone in `history` are excluded, unless the history already
/// covers every other user, in which case only the user is. `None` when the
/// population has nobody but the user.
pub fn choose_candidate<R: Rng + ?Sized>(
    rng: &mut R,
    user_id: i64,
    population: i64,
    history: &[i64],
) -> Option<Selection> {
    let in_population = |id: i64| (1..=population).contains(&id);

    let others = population - i64::from(in_population(user_id));
    if others <= 0 {
        return None;
    }

    let mut excluded: HashSet<i64> = history
        .iter()
        .copied()
        .filter(|id| *id != user_id && in_population(*id))
        .collect();

    let reset = excluded.len() as i64 >= others;
    if reset {
        excluded.clear();
    }
    excluded.insert(user_id);

    loop {
        let partner_id = rng.gen_range(1..=population);
        if !excluded.contains(&partner_id) {
            return Some(Selection { partner_id, reset });
        }
    }
}
