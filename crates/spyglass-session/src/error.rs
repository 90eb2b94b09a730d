//! Error types for the rules layer.

use spyglass_protocol::{SessionStatus, UserId};

/// A command was rejected by the game rules.
///
/// All variants are recoverable: the session is unchanged and the caller
/// can report the problem to the player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The command isn't valid in the session's current status, e.g.
    /// voting during registration or ending an already finished session.
    #[error("cannot {action} while session is {status}")]
    InvalidState {
        action: &'static str,
        status: SessionStatus,
    },

    /// Registration is at capacity.
    #[error("roster is full ({max} players)")]
    RosterFull { max: usize },

    /// The player is already on the roster.
    #[error("player {0} already joined")]
    AlreadyJoined(UserId),

    /// The acting player isn't on the roster.
    #[error("player {0} is not in this game")]
    NotInRoster(UserId),

    /// The accused player isn't on the roster.
    #[error("cannot accuse {0}: not in this game")]
    InvalidVoteTarget(UserId),

    /// A player tried to accuse themselves.
    #[error("player {0} cannot vote for themselves")]
    SelfVote(UserId),

    /// Only spies may guess the location.
    #[error("player {0} is not a spy")]
    NotSpy(UserId),

    /// The location pool handed to close-registration was empty.
    #[error("no locations available")]
    NoLocationsAvailable,

    #[error("not enough players: {have} joined, {min} required")]
    NotEnoughPlayers { have: usize, min: usize },

    #[error("too many players: {have} joined, at most {max} allowed")]
    TooManyPlayers { have: usize, max: usize },

    /// Group settings out of range. Raised by [`GameSettings::new`](crate::GameSettings::new).
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
