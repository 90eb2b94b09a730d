//! Role assignment: choosing the spies.

use rand::Rng;
use rand::seq::index;
use spyglass_protocol::UserId;

/// Number of spies for a roster of `roster_size` players.
///
/// `max(1, floor(roster_size * spy_percentage / 100))`, never more than the
/// roster itself. An empty roster has no spies.
pub fn spy_count(roster_size: usize, spy_percentage: u8) -> usize {
    let scaled = roster_size * usize::from(spy_percentage) / 100;
    scaled.max(1).min(roster_size)
}

/// Picks [`spy_count`] distinct players uniformly at random without
/// replacement. Returned ids are sorted ascending.
pub fn select_spies<R: Rng + ?Sized>(
    roster: &[UserId],
    spy_percentage: u8,
    rng: &mut R,
) -> Vec<UserId> {
    let count = spy_count(roster.len(), spy_percentage);
    let mut spies: Vec<UserId> = index::sample(rng, roster.len(), count)
        .into_iter()
        .map(|i| roster[i])
        .collect();
    spies.sort();
    spies
}
