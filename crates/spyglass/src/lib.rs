//! # Spyglass
//!
//! Game engine for a social deduction game played in group chats.
//!
//! Every player but the spies learns a secret location. Players take turns
//! asking each other questions, then accuse whoever they think is a spy.
//! A spy may instead try to name the location. The engine owns the rules
//! and the session lifecycle; the chat client, text, and database are
//! collaborators plugged in from outside.
//!
//! ```text
//!   transport (chat bot) ──command──→ GameEngine ──update──→ SessionStore
//!                        ←─result───      │
//!                                         └──pool──→ LocationCatalog
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spyglass::prelude::*;
//!
//! # async fn round() -> Result<(), SpyglassError> {
//! let engine = GameEngineBuilder::new()
//!     .build(InMemorySessionStore::new(), InMemoryCatalog::with_defaults());
//! let settings = GameSettings::default();
//!
//! let session = engine.create_session(GroupId(1)).await?;
//! for user in 1..=4 {
//!     engine.join(session.id(), UserId(user), &settings).await?;
//! }
//! let round = engine.start_round(session.id(), &settings).await?;
//! println!("first up: {}", round.turn_order[0]);
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;

pub use engine::{GameEngine, GameEngineBuilder};
pub use error::{ErrorKind, SpyglassError};

pub use spyglass_protocol as protocol;
pub use spyglass_session as session;
pub use spyglass_store as store;

/// Everything needed to drive a game.
pub mod prelude {
    pub use crate::{ErrorKind, GameEngine, GameEngineBuilder, SpyglassError};

    pub use spyglass_protocol::{
        GroupId, GuessResult, GuessVerdict, LocationCandidate, LocationId, LocationScope,
        RoleCard, RoundStart, SessionId, SessionStatus, UserId, VoteOutcome, VoteReceipt,
        VoteResolution,
    };
    pub use spyglass_session::{
        GameSettings, LevenshteinScorer, RosterEntry, Session, SimilarityScorer,
    };
    pub use spyglass_store::{
        InMemoryCatalog, InMemorySessionStore, LocationCatalog, SessionStore,
    };
}
