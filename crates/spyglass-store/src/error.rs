//! Error types for the storage layer.

use spyglass_protocol::{GroupId, SessionId};

/// Errors raised by a [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No session has this id.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The group already has a session in Registration or InProgress.
    /// Raised by create, and by any update that would make a second
    /// session of the group live again.
    #[error("group {group_id} already has active session {session_id}")]
    AlreadyActiveSession {
        group_id: GroupId,
        session_id: SessionId,
    },
}
