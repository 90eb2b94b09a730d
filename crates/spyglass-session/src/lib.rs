//! The Session aggregate and the rules that act on it.
//!
//! Everything in this crate is synchronous and deterministic given its
//! inputs: randomness arrives as a `&mut impl Rng`, time as a
//! `DateTime<Utc>`. Storage and locking live one layer up.
//!
//! # Components
//!
//! - **Roster** ([`Session::join`]): who is playing, capacity checks.
//! - **Roles** ([`select_spies`], [`spy_count`]): which players are spies.
//! - **Turns** ([`build_order`], [`Session::advance_turn`]): who speaks next.
//! - **Voting** ([`Session::cast_vote`], [`tally`], [`leading`]):
//!   accusations and their resolution.
//! - **Guessing** ([`Session::submit_guess`], [`SimilarityScorer`]): a
//!   spy's attempt to name the location.
//! - **Lifecycle** ([`Session::close_registration`], [`Session::finish`],
//!   [`Session::resume`]): the state machine tying them together.
//!
//! Every mutating method validates first and writes last, so a method
//! that returns `Err` leaves the session untouched.

mod config;
mod error;
mod guess;
mod roles;
mod roster;
mod session;
mod turns;
mod voting;

pub use config::GameSettings;
pub use error::SessionError;
pub use guess::{
    CLOSE_THRESHOLD, CORRECT_THRESHOLD, LevenshteinScorer, SimilarityScorer, classify,
};
pub use roles::{select_spies, spy_count};
pub use session::{RosterEntry, Session};
pub use turns::build_order;
pub use voting::{leading, tally};
