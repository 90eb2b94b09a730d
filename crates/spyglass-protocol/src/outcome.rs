//! What the engine's commands hand back to the transport.
//!
//! These are plain data. The transport decides how to phrase them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{LocationCandidate, SessionId, UserId};

/// Result of closing registration: everything dealt at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStart {
    pub session_id: SessionId,
    /// The secret location.
    pub location: LocationCandidate,
    /// Players holding the spy role, in ascending id order.
    pub spies: Vec<UserId>,
    /// The order players take turns in. `turn_order[0]` goes first.
    pub turn_order: Vec<UserId>,
}

/// How an accusation round ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VoteOutcome {
    /// The most-accused player was a spy. Civilians win.
    SpyCaught { spy: UserId },
    /// The most-accused player was innocent. The real spies are revealed.
    SpyEscaped { accused: UserId, spies: Vec<UserId> },
}

/// The tally that ended an accusation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResolution {
    /// The player with the most votes (lowest id among ties).
    pub accused: UserId,
    /// Votes received per accused player.
    pub tally: BTreeMap<UserId, usize>,
    pub outcome: VoteOutcome,
}

/// Acknowledgement of a recorded vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub voter: UserId,
    pub accused: UserId,
    /// Distinct voters with a recorded vote, including this one.
    pub votes_cast: usize,
    pub roster_size: usize,
    /// Present when this vote completed the round. The session is then
    /// Finished.
    pub resolution: Option<VoteResolution>,
}

/// Classification of a spy's location guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessVerdict {
    /// Close enough. The spy wins and the session ends.
    Correct,
    /// Nearly right. Nothing changes; the spy may try again.
    Close,
    /// Wrong. The spy loses and the session ends.
    Wrong,
}

impl GuessVerdict {
    /// Returns `true` if this verdict finishes the session.
    pub fn ends_session(self) -> bool {
        !matches!(self, Self::Close)
    }
}

/// Result of a spy's guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub verdict: GuessVerdict,
    /// Similarity to the true location name, 0–100.
    pub similarity: u8,
    /// The true location, revealed only when the guess ended the session.
    pub revealed: Option<LocationCandidate>,
}

/// What a player sees when they privately check their role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleCard {
    /// The player is a spy and does not know the location.
    Spy,
    /// The player is a civilian; `location` is the localized name.
    Civilian { location: String },
}
