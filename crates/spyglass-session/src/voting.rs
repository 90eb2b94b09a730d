//! Accusation voting.
//!
//! Every roster member may accuse one other member. A later vote from the
//! same voter replaces the earlier one. Once every roster member has a
//! vote on record, the round resolves on its own:
//!
//! ```text
//! cast_vote ──→ votes[voter] = accused ──→ all voted? ──no──→ wait
//!                                              │
//!                                             yes
//!                                              ▼
//!                               tally → leading accused → spy?
//!                                        │                 │
//!                                    SpyCaught        SpyEscaped
//!                                        └──→ Finished ←──┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use spyglass_protocol::{SessionStatus, UserId, VoteOutcome, VoteReceipt, VoteResolution};

use crate::{Session, SessionError};

/// Counts votes per accused player.
pub fn tally(votes: &BTreeMap<UserId, UserId>) -> BTreeMap<UserId, usize> {
    let mut counts = BTreeMap::new();
    for accused in votes.values() {
        *counts.entry(*accused).or_insert(0) += 1;
    }
    counts
}

/// The most-accused player. Ties go to the lowest user id.
///
/// `BTreeMap` iterates in ascending id order and only a strictly higher
/// count replaces the leader, so the first id to reach the maximum wins.
pub fn leading(tally: &BTreeMap<UserId, usize>) -> Option<UserId> {
    let mut best: Option<(UserId, usize)> = None;
    for (&accused, &count) in tally {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((accused, count));
        }
    }
    best.map(|(accused, _)| accused)
}

impl Session {
    /// Records `voter`'s accusation of `accused`.
    ///
    /// If this vote means every roster member has voted, the round is
    /// resolved in the same call and the session becomes Finished.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless InProgress
    /// - [`SessionError::NotInRoster`] if `voter` isn't playing
    /// - [`SessionError::InvalidVoteTarget`] if `accused` isn't playing
    /// - [`SessionError::SelfVote`] if they are the same player
    pub fn cast_vote(
        &mut self,
        voter: UserId,
        accused: UserId,
        now: DateTime<Utc>,
    ) -> Result<VoteReceipt, SessionError> {
        self.require(SessionStatus::InProgress, "cast a vote")?;
        if !self.is_member(voter) {
            return Err(SessionError::NotInRoster(voter));
        }
        if !self.is_member(accused) {
            return Err(SessionError::InvalidVoteTarget(accused));
        }
        if voter == accused {
            return Err(SessionError::SelfVote(voter));
        }

        self.votes.insert(voter, accused);

        let resolution = if self.all_voted() {
            self.resolve_votes(now)
        } else {
            None
        };

        Ok(VoteReceipt {
            voter,
            accused,
            votes_cast: self.votes.len(),
            roster_size: self.roster.len(),
            resolution,
        })
    }

    /// `true` once each current roster member has a vote recorded.
    fn all_voted(&self) -> bool {
        !self.roster.is_empty()
            && self
                .roster
                .iter()
                .all(|e| self.votes.contains_key(&e.user_id))
    }

    /// Tallies, picks the accused, and finishes the session. `None` only
    /// if there are no votes, which `all_voted` rules out.
    fn resolve_votes(&mut self, now: DateTime<Utc>) -> Option<VoteResolution> {
        let counts = tally(&self.votes);
        let accused = leading(&counts)?;

        let caught = self.entry(accused).is_some_and(|e| e.is_spy);
        let outcome = if caught {
            VoteOutcome::SpyCaught { spy: accused }
        } else {
            VoteOutcome::SpyEscaped {
                accused,
                spies: self.spies(),
            }
        };

        self.mark_finished(now);

        Some(VoteResolution {
            accused,
            tally: counts,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::session::tests::{now, registered, set_spies, started, uid};

    fn votes(pairs: &[(i64, i64)]) -> BTreeMap<UserId, UserId> {
        pairs.iter().map(|&(v, a)| (uid(v), uid(a))).collect()
    }

    // =====================================================================
    // tally() / leading()
    // =====================================================================

    #[test]
    fn test_tally_counts_per_accused() {
        let t = tally(&votes(&[(1, 5), (2, 5), (3, 6)]));
        assert_eq!(t.get(&uid(5)), Some(&2));
        assert_eq!(t.get(&uid(6)), Some(&1));
    }

    #[test]
    fn test_leading_tie_goes_to_lowest_id() {
        // A=10 gets 1, B=20 and C=30 get 2 each → B.
        let t = tally(&votes(&[(1, 10), (2, 20), (3, 20), (4, 30), (5, 30)]));
        assert_eq!(leading(&t), Some(uid(20)));
    }

    #[test]
    fn test_leading_clear_winner() {
        let t = tally(&votes(&[(1, 30), (2, 30), (3, 10)]));
        assert_eq!(leading(&t), Some(uid(30)));
    }

    #[test]
    fn test_leading_empty_is_none() {
        assert_eq!(leading(&BTreeMap::new()), None);
    }

    // =====================================================================
    // cast_vote() validation
    // =====================================================================

    #[test]
    fn test_cast_vote_self_vote_rejected() {
        let mut s = started(&[1, 2, 3, 4]);
        assert_eq!(
            s.cast_vote(uid(1), uid(1), now()),
            Err(SessionError::SelfVote(uid(1)))
        );
        assert!(s.votes().is_empty());
    }

    #[test]
    fn test_cast_vote_outsider_target_rejected() {
        let mut s = started(&[1, 2, 3, 4]);
        assert_eq!(
            s.cast_vote(uid(1), uid(99), now()),
            Err(SessionError::InvalidVoteTarget(uid(99)))
        );
    }

    #[test]
    fn test_cast_vote_outsider_voter_rejected() {
        let mut s = started(&[1, 2, 3, 4]);
        assert_eq!(
            s.cast_vote(uid(99), uid(1), now()),
            Err(SessionError::NotInRoster(uid(99)))
        );
    }

    #[test]
    fn test_cast_vote_during_registration_is_invalid_state() {
        let mut s = registered(&[1, 2, 3, 4]);
        assert!(matches!(
            s.cast_vote(uid(1), uid(2), now()),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_cast_vote_revote_replaces_previous() {
        let mut s = started(&[1, 2, 3, 4]);
        s.cast_vote(uid(1), uid(2), now()).unwrap();
        let receipt = s.cast_vote(uid(1), uid(3), now()).unwrap();

        assert_eq!(receipt.votes_cast, 1);
        assert_eq!(s.votes().len(), 1);
        assert_eq!(s.votes().get(&uid(1)), Some(&uid(3)));
    }

    // =====================================================================
    // Resolution
    // =====================================================================

    #[test]
    fn test_cast_vote_resolves_when_everyone_voted_spy_caught() {
        // Roster 1..=4, X=4 is the spy. 1,2,3 accuse X, X accuses 1.
        let mut s = started(&[1, 2, 3, 4]);
        set_spies(&mut s, &[4]);

        for voter in [1, 2] {
            let r = s.cast_vote(uid(voter), uid(4), now()).unwrap();
            assert!(r.resolution.is_none());
        }
        let r = s.cast_vote(uid(4), uid(1), now()).unwrap();
        assert!(r.resolution.is_none(), "3 of 4 voted");
        assert_eq!(s.status(), SessionStatus::InProgress);

        let r = s.cast_vote(uid(3), uid(4), now()).unwrap();
        let resolution = r.resolution.expect("fourth vote resolves");

        assert_eq!(resolution.accused, uid(4));
        assert_eq!(resolution.tally.get(&uid(4)), Some(&3));
        assert_eq!(resolution.outcome, VoteOutcome::SpyCaught { spy: uid(4) });
        assert_eq!(s.status(), SessionStatus::Finished);
        assert_eq!(s.finished_at(), Some(now()));
    }

    #[test]
    fn test_cast_vote_innocent_accused_spy_escapes() {
        let mut s = started(&[1, 2, 3, 4]);
        set_spies(&mut s, &[2]);

        s.cast_vote(uid(1), uid(3), now()).unwrap();
        s.cast_vote(uid(2), uid(3), now()).unwrap();
        s.cast_vote(uid(4), uid(3), now()).unwrap();
        let r = s.cast_vote(uid(3), uid(1), now()).unwrap();

        assert_eq!(
            r.resolution.unwrap().outcome,
            VoteOutcome::SpyEscaped {
                accused: uid(3),
                spies: vec![uid(2)],
            }
        );
        assert_eq!(s.status(), SessionStatus::Finished);
    }

    #[test]
    fn test_cast_vote_tie_resolves_to_lowest_id() {
        // Votes: 3 and 4 tied at 2 each; 3 wins the tie.
        let mut s = started(&[1, 2, 3, 4]);
        set_spies(&mut s, &[3]);

        s.cast_vote(uid(1), uid(3), now()).unwrap();
        s.cast_vote(uid(2), uid(4), now()).unwrap();
        s.cast_vote(uid(4), uid(3), now()).unwrap();
        let r = s.cast_vote(uid(3), uid(4), now()).unwrap();

        let resolution = r.resolution.unwrap();
        assert_eq!(resolution.accused, uid(3));
        assert_eq!(resolution.outcome, VoteOutcome::SpyCaught { spy: uid(3) });
    }

    #[test]
    fn test_cast_vote_after_resolution_is_invalid_state() {
        let mut s = started(&[1, 2]);
        s.cast_vote(uid(1), uid(2), now()).unwrap();
        s.cast_vote(uid(2), uid(1), now()).unwrap();
        assert_eq!(s.status(), SessionStatus::Finished);

        assert!(matches!(
            s.cast_vote(uid(1), uid(2), now()),
            Err(SessionError::InvalidState { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_leading_has_max_count_and_lowest_id(
            raw in proptest::collection::btree_map(0i64..50, 0i64..8, 1..40),
        ) {
            let votes: BTreeMap<UserId, UserId> =
                raw.into_iter().map(|(v, a)| (UserId(v), UserId(a))).collect();
            let t = tally(&votes);
            let winner = leading(&t).unwrap();

            let max = *t.values().max().unwrap();
            prop_assert_eq!(t[&winner], max);
            for (id, count) in &t {
                if *count == max {
                    prop_assert!(winner <= *id);
                }
            }
        }
    }
}
