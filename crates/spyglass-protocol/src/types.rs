//! Core identity and status types.
//!
//! Chat platforms hand us plain integers for users and groups. Wrapping
//! them in newtypes means a `GroupId` can never be passed where a `UserId`
//! is expected, even though both are `i64` underneath.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A chat user.
///
/// Signed because chat platforms use the full `i64` range for ids.
/// `Ord` matters: accusation ties are broken by the lowest numeric id.
///
/// `#[serde(transparent)]` serializes `UserId(42)` as plain `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A group conversation. Each group runs at most one live session.
///
/// Group chats usually have negative ids on the platforms we target,
/// hence `i64`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// One play-through of the game, allocated by the session store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// A location in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
/// Registration ──(close registration)──→ InProgress ──(end / resolve)──→ Finished
///       │                                     ↑                             │
///       └──────────────(end)──────────────────┼───────────→ Finished        │
///                                             └─────────(resume)────────────┘
/// ```
///
/// - **Registration**: players may join. No location, spies, or turn order.
/// - **InProgress**: roles are dealt. Turns, votes, and guesses are accepted.
/// - **Finished**: the round is over. May be resumed back to InProgress
///   with its roles, order, and votes intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Registration,
    InProgress,
    Finished,
}

impl SessionStatus {
    /// Returns `true` while the session counts against its group's
    /// one-live-session limit.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Registration | Self::InProgress)
    }

    /// Returns `true` if players may still join.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Registration)
    }

    /// Returns `true` if moving from `self` to `target` is a legal edge.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Registration, Self::InProgress)
                | (Self::Registration, Self::Finished)
                | (Self::InProgress, Self::Finished)
                | (Self::Finished, Self::InProgress)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration => write!(f, "Registration"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_group_id_deserializes_negative_number() {
        let gid: GroupId = serde_json::from_str("-100123").unwrap();
        assert_eq!(gid, GroupId(-100123));
    }

    #[test]
    fn test_id_display_prefixes() {
        assert_eq!(UserId(7).to_string(), "U-7");
        assert_eq!(GroupId(-3).to_string(), "G--3");
        assert_eq!(SessionId(12).to_string(), "S-12");
        assert_eq!(LocationId(5).to_string(), "L-5");
    }

    #[test]
    fn test_user_id_orders_numerically() {
        let mut ids = vec![UserId(30), UserId(-2), UserId(7)];
        ids.sort();
        assert_eq!(ids, vec![UserId(-2), UserId(7), UserId(30)]);
    }

    // =====================================================================
    // SessionStatus
    // =====================================================================

    #[test]
    fn test_status_is_active() {
        assert!(SessionStatus::Registration.is_active());
        assert!(SessionStatus::InProgress.is_active());
        assert!(!SessionStatus::Finished.is_active());
    }

    #[test]
    fn test_status_is_joinable_only_in_registration() {
        assert!(SessionStatus::Registration.is_joinable());
        assert!(!SessionStatus::InProgress.is_joinable());
        assert!(!SessionStatus::Finished.is_joinable());
    }

    #[test]
    fn test_status_can_transition_to() {
        use SessionStatus::*;
        assert!(Registration.can_transition_to(InProgress));
        assert!(Registration.can_transition_to(Finished));
        assert!(InProgress.can_transition_to(Finished));
        assert!(Finished.can_transition_to(InProgress));

        assert!(!InProgress.can_transition_to(Registration));
        assert!(!Finished.can_transition_to(Registration));
        assert!(!Finished.can_transition_to(Finished));
        assert!(!InProgress.can_transition_to(InProgress));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
    }
}
