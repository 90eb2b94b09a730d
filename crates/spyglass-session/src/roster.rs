//! Roster management: who is playing.

use chrono::{DateTime, Utc};
use spyglass_protocol::UserId;

use crate::{RosterEntry, Session, SessionError};

impl Session {
    /// Adds a player during registration.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless in Registration
    /// - [`SessionError::AlreadyJoined`] if the player is on the roster
    /// - [`SessionError::RosterFull`] if `max_players` already joined
    pub fn join(
        &mut self,
        user_id: UserId,
        max_players: usize,
        now: DateTime<Utc>,
    ) -> Result<&RosterEntry, SessionError> {
        if !self.status().is_joinable() {
            return Err(self.invalid("join"));
        }
        if self.is_member(user_id) {
            return Err(SessionError::AlreadyJoined(user_id));
        }
        if self.roster.len() >= max_players {
            return Err(SessionError::RosterFull { max: max_players });
        }

        self.roster.push(RosterEntry {
            user_id,
            is_spy: false,
            is_eliminated: false,
            joined_at: now,
        });
        self.roster
            .last()
            .ok_or(SessionError::NotInRoster(user_id))
    }
}

#[cfg(test)]
mod tests {
    use spyglass_protocol::SessionStatus;

    use crate::session::tests::{now, registered, started, uid};
    use crate::*;

    #[test]
    fn test_join_adds_non_spy_entry() {
        let mut s = registered(&[]);
        let entry = s.join(uid(1), 10, now()).unwrap();
        assert_eq!(entry.user_id, uid(1));
        assert!(!entry.is_spy);
        assert!(!entry.is_eliminated);
        assert_eq!(s.roster().len(), 1);
    }

    #[test]
    fn test_join_twice_returns_already_joined() {
        let mut s = registered(&[1]);
        let err = s.join(uid(1), 10, now()).unwrap_err();
        assert_eq!(err, SessionError::AlreadyJoined(uid(1)));
        assert_eq!(s.roster().len(), 1, "roster size unchanged");
    }

    #[test]
    fn test_join_full_roster_returns_roster_full() {
        let mut s = registered(&[1, 2, 3, 4]);
        let err = s.join(uid(5), 4, now()).unwrap_err();
        assert_eq!(err, SessionError::RosterFull { max: 4 });
        assert!(!s.is_member(uid(5)));
    }

    #[test]
    fn test_join_after_start_is_invalid_state() {
        let mut s = started(&[1, 2, 3, 4]);
        let err = s.join(uid(5), 10, now()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { action: "join", .. }));
    }

    #[test]
    fn test_join_after_finish_is_invalid_state() {
        let mut s = registered(&[1, 2]);
        s.finish(now()).unwrap();
        let err = s.join(uid(3), 10, now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                action: "join",
                status: SessionStatus::Finished,
            }
        ));
        assert_eq!(s.roster().len(), 2);
    }

    #[test]
    fn test_join_keeps_join_order() {
        let s = registered(&[30, 10, 20]);
        assert_eq!(s.player_ids(), vec![uid(30), uid(10), uid(20)]);
    }
}
