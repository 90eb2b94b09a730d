//! `GameEngine` builder and command surface.
//!
//! The engine ties the layers together: rules from `spyglass-session`,
//! storage from `spyglass-store`, and randomness plus the guess scorer it
//! owns itself. Every command is a short request/response call; mutations
//! go through [`SessionStore::update`], so commands on one session are
//! serialized and a rejected command leaves nothing behind.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use spyglass_protocol::{
    GroupId, GuessResult, LocationCandidate, RoleCard, RoundStart, SessionId, UserId, VoteReceipt,
};
use spyglass_session::{
    GameSettings, LevenshteinScorer, RosterEntry, Session, SessionError, SimilarityScorer,
};
use spyglass_store::{LocationCatalog, SessionStore};

use crate::SpyglassError;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`GameEngine`].
///
/// # Example
///
/// ```rust
/// use spyglass::prelude::*;
///
/// let engine = GameEngineBuilder::new()
///     .seed(42)
///     .build(InMemorySessionStore::new(), InMemoryCatalog::with_defaults());
/// # let _ = engine;
/// ```
pub struct GameEngineBuilder {
    seed: Option<u64>,
    scorer: Box<dyn SimilarityScorer>,
}

impl GameEngineBuilder {
    /// Creates a builder with an OS-seeded RNG and [`LevenshteinScorer`].
    pub fn new() -> Self {
        Self {
            seed: None,
            scorer: Box::new(LevenshteinScorer),
        }
    }

    /// Seeds the RNG so that every draw (location, spies, turn order) is
    /// reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the guess scorer.
    pub fn scorer(mut self, scorer: impl SimilarityScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Builds the engine around its two collaborators.
    pub fn build<S: SessionStore, C: LocationCatalog>(
        self,
        store: S,
        catalog: C,
    ) -> GameEngine<S, C> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        GameEngine {
            store,
            catalog,
            rng: Mutex::new(rng),
            scorer: self.scorer,
        }
    }
}

impl Default for GameEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The Spyglass game engine.
///
/// Stateless apart from its RNG: sessions live in `S`, locations in `C`,
/// and group settings arrive with each call.
pub struct GameEngine<S: SessionStore, C: LocationCatalog> {
    store: S,
    catalog: C,
    rng: Mutex<StdRng>,
    scorer: Box<dyn SimilarityScorer>,
}

impl<S: SessionStore, C: LocationCatalog> GameEngine<S, C> {
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Opens registration for a new session in `group_id`.
    ///
    /// Fails with `AlreadyActiveSession` if the group already has a session
    /// in Registration or InProgress.
    pub async fn create_session(&self, group_id: GroupId) -> Result<Session, SpyglassError> {
        match self.store.create_session(group_id, Utc::now()).await {
            Ok(session) => {
                tracing::info!(session_id = %session.id(), %group_id, "session created");
                Ok(session)
            }
            Err(e) => {
                tracing::debug!(%group_id, error = %e, "create rejected");
                Err(e.into())
            }
        }
    }

    /// Loads any session by id.
    pub async fn session(&self, session_id: SessionId) -> Result<Session, SpyglassError> {
        Ok(self.store.load(session_id).await?)
    }

    /// The group's session in Registration or InProgress, if any.
    pub async fn active_session(
        &self,
        group_id: GroupId,
    ) -> Result<Option<Session>, SpyglassError> {
        Ok(self.store.active_for_group(group_id).await?)
    }

    /// Ends registration with an explicit location pool and deals the round.
    ///
    /// Location, spies, turn order, and status are committed together.
    pub async fn close_registration(
        &self,
        session_id: SessionId,
        pool: &[LocationCandidate],
        settings: &GameSettings,
    ) -> Result<RoundStart, SpyglassError> {
        let now = Utc::now();
        let round = self
            .mutate(session_id, "close registration", |s| {
                let mut rng = self.rng();
                s.close_registration(pool, settings, &mut *rng, now)
            })
            .await?;

        tracing::info!(
            %session_id,
            location = %round.location.id,
            spies = round.spies.len(),
            players = round.turn_order.len(),
            "round started"
        );
        Ok(round)
    }

    /// Ends registration using the group's pool from the catalog.
    pub async fn start_round(
        &self,
        session_id: SessionId,
        settings: &GameSettings,
    ) -> Result<RoundStart, SpyglassError> {
        let group_id = self.store.load(session_id).await?.group_id();
        let pool = self.catalog.locations_for_group(group_id).await;
        tracing::debug!(%session_id, %group_id, pool = pool.len(), "location pool loaded");
        self.close_registration(session_id, &pool, settings).await
    }

    /// Ends the session from Registration or InProgress.
    pub async fn end_session(&self, session_id: SessionId) -> Result<Session, SpyglassError> {
        let now = Utc::now();
        let session = self
            .mutate(session_id, "end", |s| {
                s.finish(now)?;
                Ok(s.clone())
            })
            .await?;
        tracing::info!(%session_id, "session finished");
        Ok(session)
    }

    /// Reopens a finished round where it left off.
    pub async fn resume_session(&self, session_id: SessionId) -> Result<Session, SpyglassError> {
        let session = self
            .mutate(session_id, "resume", |s| {
                s.resume()?;
                Ok(s.clone())
            })
            .await?;
        tracing::info!(%session_id, "session resumed");
        Ok(session)
    }

    // -- Roster -------------------------------------------------------------

    /// Adds `user_id` to the roster. Returns the updated roster.
    pub async fn join(
        &self,
        session_id: SessionId,
        user_id: UserId,
        settings: &GameSettings,
    ) -> Result<Vec<RosterEntry>, SpyglassError> {
        let now = Utc::now();
        let roster = self
            .mutate(session_id, "join", |s| {
                s.join(user_id, settings.max_players(), now)?;
                Ok(s.roster().to_vec())
            })
            .await?;
        tracing::debug!(%session_id, %user_id, players = roster.len(), "player joined");
        Ok(roster)
    }

    /// Acknowledges a player passing. Changes nothing and cannot fail.
    pub fn pass(&self, session_id: SessionId, user_id: UserId) {
        tracing::debug!(%session_id, %user_id, "player passed");
    }

    /// Marks a player as eliminated. Voting and turns are unaffected.
    pub async fn eliminate_player(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<(), SpyglassError> {
        self.mutate(session_id, "eliminate", |s| s.eliminate(user_id))
            .await?;
        tracing::debug!(%session_id, %user_id, "player eliminated");
        Ok(())
    }

    /// What `user_id` may know: spy, or the location name in `language`.
    pub async fn reveal_role(
        &self,
        session_id: SessionId,
        user_id: UserId,
        language: &str,
    ) -> Result<RoleCard, SpyglassError> {
        let session = self.store.load(session_id).await?;
        Ok(session.reveal_role(user_id, language)?)
    }

    // -- Turns --------------------------------------------------------------

    /// The player whose turn it is.
    pub async fn current_player(&self, session_id: SessionId) -> Result<UserId, SpyglassError> {
        let session = self.store.load(session_id).await?;
        Ok(session.current_player()?)
    }

    /// Passes the turn on and returns the new current player.
    pub async fn advance_turn(&self, session_id: SessionId) -> Result<UserId, SpyglassError> {
        let player = self
            .mutate(session_id, "advance turn", Session::advance_turn)
            .await?;
        tracing::debug!(%session_id, current = %player, "turn advanced");
        Ok(player)
    }

    // -- Voting and guessing ------------------------------------------------

    /// Records an accusation. Resolves the round once everyone has voted.
    pub async fn cast_vote(
        &self,
        session_id: SessionId,
        voter: UserId,
        accused: UserId,
    ) -> Result<VoteReceipt, SpyglassError> {
        let now = Utc::now();
        let receipt = self
            .mutate(session_id, "vote", |s| s.cast_vote(voter, accused, now))
            .await?;

        tracing::debug!(
            %session_id,
            %voter,
            %accused,
            votes = receipt.votes_cast,
            roster = receipt.roster_size,
            "vote cast"
        );
        if let Some(resolution) = &receipt.resolution {
            tracing::info!(
                %session_id,
                accused = %resolution.accused,
                outcome = ?resolution.outcome,
                "vote resolved"
            );
        }
        Ok(receipt)
    }

    /// Scores a spy's guess against the location name in `language`.
    pub async fn submit_guess(
        &self,
        session_id: SessionId,
        user_id: UserId,
        guess: &str,
        language: &str,
    ) -> Result<GuessResult, SpyglassError> {
        let now = Utc::now();
        let scorer = self.scorer.as_ref();
        let result = self
            .mutate(session_id, "guess", |s| {
                s.submit_guess(user_id, guess, language, scorer, now)
            })
            .await?;

        tracing::debug!(
            %session_id,
            %user_id,
            similarity = result.similarity,
            verdict = ?result.verdict,
            "guess scored"
        );
        if result.verdict.ends_session() {
            tracing::info!(%session_id, verdict = ?result.verdict, "guess resolved");
        }
        Ok(result)
    }

    // -- Helpers ------------------------------------------------------------

    /// Runs a rule method under the store's per-session lock and logs
    /// rejections.
    async fn mutate<T, F>(
        &self,
        session_id: SessionId,
        command: &'static str,
        apply: F,
    ) -> Result<T, SpyglassError>
    where
        F: FnOnce(&mut Session) -> Result<T, SessionError> + Send,
        T: Send,
    {
        let result = self
            .store
            .update(session_id, move |s| apply(s).map_err(SpyglassError::from))
            .await;
        if let Err(e) = &result {
            tracing::debug!(%session_id, command, error = %e, "command rejected");
        }
        result
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
