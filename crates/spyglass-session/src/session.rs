//! The Session aggregate and its lifecycle transitions.
//!
//! A session is one round of the game in one group. It owns everything
//! that round needs: the roster, the secret location, the turn order, and
//! the accusation votes. The rule modules (`roster`, `turns`, `voting`,
//! `guess`) add their own `impl Session` blocks; this file holds the data
//! and the status transitions.
//!
//! ```text
//! new() ──→ [Registration] ──close_registration()──→ [InProgress]
//!                 │                                     │    ↑
//!              finish()                    finish() / vote /  resume()
//!                 │                          guess resolution  │
//!                 ▼                                     ▼    │
//!             [Finished] ←──────────────────────────[Finished]
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use spyglass_protocol::{
    GroupId, LocationCandidate, RoleCard, RoundStart, SessionId, SessionStatus, UserId,
};

use crate::{GameSettings, SessionError, build_order, select_spies};

// ---------------------------------------------------------------------------
// RosterEntry
// ---------------------------------------------------------------------------

/// One player's participation in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub user_id: UserId,
    /// Dealt when registration closes. Never changes afterwards.
    pub is_spy: bool,
    /// Set by [`Session::eliminate`]. Not consulted by voting or turns.
    pub is_eliminated: bool,
    pub joined_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One social-deduction round for a group.
///
/// Fields are private so the invariants below can only be changed through
/// the rule methods:
///
/// - a user appears at most once in the roster;
/// - `location`, spies, and `turn_order` are set together, exactly once,
///   when registration closes;
/// - `current_turn < turn_order.len()` whenever the order is non-empty;
/// - every key and value in `votes` is a roster member, and no one votes
///   for themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionDraft")]
pub struct Session {
    id: SessionId,
    group_id: GroupId,
    status: SessionStatus,
    location: Option<LocationCandidate>,
    pub(crate) roster: Vec<RosterEntry>,
    pub(crate) turn_order: Vec<UserId>,
    pub(crate) current_turn: usize,
    /// voter → accused. One entry per voter; a re-vote overwrites.
    pub(crate) votes: BTreeMap<UserId, UserId>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates an empty session in Registration.
    pub fn new(id: SessionId, group_id: GroupId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            group_id,
            status: SessionStatus::Registration,
            location: None,
            roster: Vec::new(),
            turn_order: Vec::new(),
            current_turn: 0,
            votes: BTreeMap::new(),
            created_at: now,
            started_at: None,
            finished_at: None,
        }
    }

    // -- Accessors --------------------------------------------------------

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The secret location. `None` until registration closes.
    pub fn location(&self) -> Option<&LocationCandidate> {
        self.location.as_ref()
    }

    /// Players in join order.
    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    /// Roster user ids in join order.
    pub fn player_ids(&self) -> Vec<UserId> {
        self.roster.iter().map(|e| e.user_id).collect()
    }

    pub fn entry(&self, user_id: UserId) -> Option<&RosterEntry> {
        self.roster.iter().find(|e| e.user_id == user_id)
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.entry(user_id).is_some()
    }

    /// Spy user ids in ascending order. Empty before the round starts.
    pub fn spies(&self) -> Vec<UserId> {
        let mut spies: Vec<UserId> = self
            .roster
            .iter()
            .filter(|e| e.is_spy)
            .map(|e| e.user_id)
            .collect();
        spies.sort();
        spies
    }

    pub fn turn_order(&self) -> &[UserId] {
        &self.turn_order
    }

    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    pub fn votes(&self) -> &BTreeMap<UserId, UserId> {
        &self.votes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    // -- Transitions ------------------------------------------------------

    /// Ends registration and deals the round.
    ///
    /// Picks a location uniformly from `pool`, selects the spies, and
    /// shuffles the turn order. Each draw uses its own generator forked
    /// from `rng`, so the spy set and the turn order are independent and
    /// each is reproducible for a seeded `rng`. Nothing is drawn if
    /// validation fails.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless in Registration
    /// - [`SessionError::NotEnoughPlayers`] / [`SessionError::TooManyPlayers`]
    /// - [`SessionError::NoLocationsAvailable`] if `pool` is empty
    pub fn close_registration<R: Rng>(
        &mut self,
        pool: &[LocationCandidate],
        settings: &GameSettings,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<RoundStart, SessionError> {
        self.require(SessionStatus::Registration, "close registration")?;

        let have = self.roster.len();
        if have < settings.min_players() {
            return Err(SessionError::NotEnoughPlayers {
                have,
                min: settings.min_players(),
            });
        }
        if have > settings.max_players() {
            return Err(SessionError::TooManyPlayers {
                have,
                max: settings.max_players(),
            });
        }
        if pool.is_empty() {
            return Err(SessionError::NoLocationsAvailable);
        }

        let mut location_rng = StdRng::from_rng(rng);
        let mut spy_rng = StdRng::from_rng(rng);
        let mut order_rng = StdRng::from_rng(rng);

        let location = pool
            .choose(&mut location_rng)
            .cloned()
            .ok_or(SessionError::NoLocationsAvailable)?;
        let players = self.player_ids();
        let spies = select_spies(&players, settings.spy_percentage(), &mut spy_rng);
        let turn_order = build_order(&players, &mut order_rng);

        // All checks passed; write everything at once.
        for entry in &mut self.roster {
            entry.is_spy = spies.binary_search(&entry.user_id).is_ok();
        }
        self.location = Some(location.clone());
        self.turn_order = turn_order.clone();
        self.current_turn = 0;
        self.votes.clear();
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);

        Ok(RoundStart {
            session_id: self.id,
            location,
            spies,
            turn_order,
        })
    }

    /// Moves the session to Finished.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] if already Finished.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if !self.status.can_transition_to(SessionStatus::Finished) {
            return Err(self.invalid("end the session"));
        }
        self.status = SessionStatus::Finished;
        self.finished_at = Some(now);
        Ok(())
    }

    /// Reopens a finished round.
    ///
    /// Location, spies, turn order, current turn, and votes are kept as
    /// they were. Only rounds that actually started can be resumed; a
    /// session ended during registration has nothing to resume into.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless Finished after having started.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.require(SessionStatus::Finished, "resume the session")?;
        if self.started_at.is_none() || self.turn_order.is_empty() {
            return Err(self.invalid("resume a session that never started"));
        }
        self.status = SessionStatus::InProgress;
        self.finished_at = None;
        Ok(())
    }

    /// Marks a player as eliminated.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless InProgress;
    /// [`SessionError::NotInRoster`] for unknown players.
    pub fn eliminate(&mut self, user_id: UserId) -> Result<(), SessionError> {
        self.require(SessionStatus::InProgress, "eliminate a player")?;
        let entry = self
            .roster
            .iter_mut()
            .find(|e| e.user_id == user_id)
            .ok_or(SessionError::NotInRoster(user_id))?;
        entry.is_eliminated = true;
        Ok(())
    }

    /// What `user_id` is allowed to know about the round.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless InProgress;
    /// [`SessionError::NotInRoster`] for unknown players.
    pub fn reveal_role(&self, user_id: UserId, language: &str) -> Result<RoleCard, SessionError> {
        self.require(SessionStatus::InProgress, "reveal roles")?;
        let entry = self
            .entry(user_id)
            .ok_or(SessionError::NotInRoster(user_id))?;
        if entry.is_spy {
            return Ok(RoleCard::Spy);
        }
        let location = self
            .location
            .as_ref()
            .ok_or_else(|| self.invalid("reveal roles without a location"))?;
        Ok(RoleCard::Civilian {
            location: location.name(language).to_owned(),
        })
    }

    // -- Helpers ----------------------------------------------------------

    /// Fails with `InvalidState` unless the status is `expected`.
    pub(crate) fn require(
        &self,
        expected: SessionStatus,
        action: &'static str,
    ) -> Result<(), SessionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    pub(crate) fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidState {
            action,
            status: self.status,
        }
    }

    /// Finishing from inside a rule that already checked InProgress.
    pub(crate) fn mark_finished(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Finished;
        self.finished_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Unvalidated wire shape of [`Session`].
#[derive(Deserialize)]
struct SessionDraft {
    id: SessionId,
    group_id: GroupId,
    status: SessionStatus,
    location: Option<LocationCandidate>,
    roster: Vec<RosterEntry>,
    turn_order: Vec<UserId>,
    current_turn: usize,
    votes: BTreeMap<UserId, UserId>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionDraft> for Session {
    type Error = String;

    /// Rebuilds a session, rejecting snapshots no sequence of rule
    /// methods could have produced.
    fn try_from(d: SessionDraft) -> Result<Self, Self::Error> {
        let mut members: Vec<UserId> = d.roster.iter().map(|e| e.user_id).collect();
        members.sort();
        if members.windows(2).any(|w| w[0] == w[1]) {
            return Err("roster lists a player twice".into());
        }

        if d.turn_order.is_empty() {
            if d.status == SessionStatus::InProgress {
                return Err("in-progress session without a turn order".into());
            }
            if d.current_turn != 0 || !d.votes.is_empty() {
                return Err("turn or votes recorded before the round started".into());
            }
            if d.roster.iter().any(|e| e.is_spy) {
                return Err("spies dealt before the round started".into());
            }
        } else {
            let mut order = d.turn_order.clone();
            order.sort();
            if order != members {
                return Err("turn order is not a permutation of the roster".into());
            }
            if d.current_turn >= d.turn_order.len() {
                return Err(format!(
                    "current turn {} out of range for {} players",
                    d.current_turn,
                    d.turn_order.len()
                ));
            }
            if d.location.is_none() || d.started_at.is_none() {
                return Err("dealt round without a location or start time".into());
            }
        }

        for (voter, accused) in &d.votes {
            if voter == accused {
                return Err(format!("{voter} voted for themselves"));
            }
            if members.binary_search(voter).is_err() || members.binary_search(accused).is_err() {
                return Err(format!("vote {voter} -> {accused} involves a non-member"));
            }
        }

        if d.finished_at.is_some() != (d.status == SessionStatus::Finished) {
            return Err(format!("finish time inconsistent with status {}", d.status));
        }

        Ok(Self {
            id: d.id,
            group_id: d.group_id,
            status: d.status,
            location: d.location,
            roster: d.roster,
            turn_order: d.turn_order,
            current_turn: d.current_turn,
            votes: d.votes,
            created_at: d.created_at,
            started_at: d.started_at,
            finished_at: d.finished_at,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
