//! Turn sequencing.

use rand::Rng;
use rand::seq::SliceRandom;
use spyglass_protocol::{SessionStatus, UserId};

use crate::{Session, SessionError};

/// A uniformly random permutation of `roster`.
pub fn build_order<R: Rng + ?Sized>(roster: &[UserId], rng: &mut R) -> Vec<UserId> {
    let mut order = roster.to_vec();
    order.shuffle(rng);
    order
}

impl Session {
    /// The player whose turn it is.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless InProgress.
    pub fn current_player(&self) -> Result<UserId, SessionError> {
        self.require(SessionStatus::InProgress, "look up the current player")?;
        self.turn_order
            .get(self.current_turn)
            .copied()
            .ok_or_else(|| self.invalid("look up the current player"))
    }

    /// Passes the turn to the next player, wrapping at the end of the order.
    /// Returns the new current player.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless InProgress.
    pub fn advance_turn(&mut self) -> Result<UserId, SessionError> {
        self.require(SessionStatus::InProgress, "advance the turn")?;
        if self.turn_order.is_empty() {
            return Err(self.invalid("advance the turn"));
        }
        self.current_turn = (self.current_turn + 1) % self.turn_order.len();
        Ok(self.turn_order[self.current_turn])
    }
}
