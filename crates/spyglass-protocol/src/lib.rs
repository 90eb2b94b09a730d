//! Shared vocabulary for Spyglass.
//!
//! This crate defines the data that crosses the boundary between the game
//! engine and its transport collaborator (a chat bot, an HTTP layer, a test
//! harness):
//!
//! - **Identity types** ([`GroupId`], [`SessionId`], [`UserId`],
//!   [`LocationId`]): newtypes so ids can't be mixed up.
//! - **Status** ([`SessionStatus`]): the session state machine.
//! - **Locations** ([`LocationCandidate`], [`LocationScope`]): the read-only
//!   pool a round's secret location is drawn from.
//! - **Results** ([`RoundStart`], [`VoteReceipt`], [`GuessResult`],
//!   [`RoleCard`], ...): what each command hands back.
//!
//! Nothing here knows about storage, randomness, or rules. Framing and
//! user-facing text are the transport's job.
//!
//! ```text
//! Transport → Engine (spyglass) → Rules (spyglass-session) → Store
//!                  └──────── all speak spyglass-protocol ────────┘
//! ```

mod location;
mod outcome;
mod types;

pub use location::{DEFAULT_LANGUAGE, LocationCandidate, LocationScope};
pub use outcome::{
    GuessResult, GuessVerdict, RoleCard, RoundStart, VoteOutcome, VoteReceipt,
    VoteResolution,
};
pub use types::{GroupId, LocationId, SessionId, SessionStatus, UserId};
