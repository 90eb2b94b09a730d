//! Storage seams for Spyglass.
//!
//! The engine never talks to a database directly. It needs two
//! collaborators, each defined here as a trait with an in-memory
//! implementation:
//!
//! - [`SessionStore`]: atomic read-modify-write of one session, plus an
//!   atomic "create unless the group already has a live session".
//! - [`LocationCatalog`]: the locations a group may draw from.
//!
//! # Concurrency
//!
//! [`InMemorySessionStore`] gives each session its own async mutex, so
//! commands on one session run one at a time while different sessions
//! proceed in parallel. A separate index of live sessions per group makes
//! the create check-and-insert a single step.
//!
//! ```text
//! Engine ──update(id, f)──→ [session mutex] → clone → f(&mut draft) → commit
//!        ──create(group)──→ [group index]   → check → insert
//! ```

mod catalog;
mod error;
mod memory;
mod store;

pub use catalog::{DEFAULT_LOCATIONS, InMemoryCatalog, LocationCatalog};
pub use error::StoreError;
pub use memory::InMemorySessionStore;
pub use store::SessionStore;
