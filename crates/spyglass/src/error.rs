//! Unified error type for the Spyglass engine.

use spyglass_session::SessionError;
use spyglass_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// Engine callers deal with this single type instead of importing errors
/// from each sub-crate. `#[from]` on each variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpyglassError {
    /// A game rule was violated.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The session store refused or could not find the session.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What went wrong, without the details.
///
/// The transport maps each kind to user-facing text. Every engine
/// operation fails with exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyActiveSession,
    SessionNotFound,
    InvalidState,
    RosterFull,
    AlreadyJoined,
    NotInRoster,
    InvalidVoteTarget,
    SelfVote,
    NotSpy,
    NoLocationsAvailable,
    NotEnoughPlayers,
    TooManyPlayers,
    InvalidSettings,
}

impl ErrorKind {
    /// Stable snake_case code, suitable as a lookup key for localized text.
    pub fn code(self) -> &'static str {
        match self {
            Self::AlreadyActiveSession => "already_active_session",
            Self::SessionNotFound => "session_not_found",
            Self::InvalidState => "invalid_state",
            Self::RosterFull => "roster_full",
            Self::AlreadyJoined => "already_joined",
            Self::NotInRoster => "not_in_roster",
            Self::InvalidVoteTarget => "invalid_vote_target",
            Self::SelfVote => "self_vote",
            Self::NotSpy => "not_spy",
            Self::NoLocationsAvailable => "no_locations_available",
            Self::NotEnoughPlayers => "not_enough_players",
            Self::TooManyPlayers => "too_many_players",
            Self::InvalidSettings => "invalid_settings",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl SpyglassError {
    /// The flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => match e {
                SessionError::InvalidState { .. } => ErrorKind::InvalidState,
                SessionError::RosterFull { .. } => ErrorKind::RosterFull,
                SessionError::AlreadyJoined(_) => ErrorKind::AlreadyJoined,
                SessionError::NotInRoster(_) => ErrorKind::NotInRoster,
                SessionError::InvalidVoteTarget(_) => ErrorKind::InvalidVoteTarget,
                SessionError::SelfVote(_) => ErrorKind::SelfVote,
                SessionError::NotSpy(_) => ErrorKind::NotSpy,
                SessionError::NoLocationsAvailable => ErrorKind::NoLocationsAvailable,
                SessionError::NotEnoughPlayers { .. } => ErrorKind::NotEnoughPlayers,
                SessionError::TooManyPlayers { .. } => ErrorKind::TooManyPlayers,
                SessionError::InvalidSettings(_) => ErrorKind::InvalidSettings,
            },
            Self::Store(e) => match e {
                StoreError::SessionNotFound(_) => ErrorKind::SessionNotFound,
                StoreError::AlreadyActiveSession { .. } => ErrorKind::AlreadyActiveSession,
            },
        }
    }
}
