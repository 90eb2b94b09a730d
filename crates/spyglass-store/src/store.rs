//! The session repository contract.

use std::future::Future;

use chrono::{DateTime, Utc};
use spyglass_protocol::{GroupId, SessionId};
use spyglass_session::Session;

use crate::StoreError;

/// Persists sessions and serializes changes to each one.
///
/// # Contract
///
/// - [`create_session`](Self::create_session) checks "no live session for
///   this group" and inserts in one atomic step.
/// - [`update`](Self::update) runs `mutate` with exclusive access to the
///   session. If `mutate` returns `Err`, nothing is written. Concurrent
///   updates to the same session never interleave.
/// - A session counts as live while its status is Registration or
///   InProgress. At most one live session exists per group; an update
///   that would break this fails with [`StoreError::AlreadyActiveSession`]
///   and is not written.
/// - Deleting a group's data is the store's business, not the engine's.
///
/// Methods return `Send` futures so engine calls can be spawned onto a
/// multi-threaded runtime.
pub trait SessionStore: Send + Sync + 'static {
    /// Creates a session in Registration for `group_id`.
    fn create_session(
        &self,
        group_id: GroupId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Returns a snapshot of the session.
    fn load(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Returns the group's live session, if any.
    fn active_for_group(
        &self,
        group_id: GroupId,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Atomically applies `mutate` to the session.
    fn update<T, E, F>(
        &self,
        session_id: SessionId,
        mutate: F,
    ) -> impl Future<Output = Result<T, E>> + Send
    where
        F: FnOnce(&mut Session) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send;
}
