//! In-memory session store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use spyglass_protocol::{GroupId, SessionId};
use spyglass_session::Session;

use crate::{SessionStore, StoreError};

/// One stored session. The group id is duplicated outside the mutex so
/// group-wide operations don't have to lock every session.
struct Slot {
    group_id: GroupId,
    session: Arc<tokio::sync::Mutex<Session>>,
}

/// Keeps sessions in process memory.
///
/// Lock order is always session mutex, then `active`; create takes
/// `active`, then `sessions`. Neither std lock is held across an await.
pub struct InMemorySessionStore {
    /// Every session ever created, finished ones included.
    sessions: RwLock<HashMap<SessionId, Slot>>,

    /// The live (Registration or InProgress) session of each group.
    active: Mutex<HashMap<GroupId, SessionId>>,

    next_id: AtomicU64,
}

impl InMemorySessionStore {
    /// Creates an empty store. The first session gets id 1.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            active: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every session of `group_id`, live or not. Used when the
    /// group itself is deleted. Returns how many sessions were removed.
    pub fn purge_group(&self, group_id: GroupId) -> usize {
        let mut active = self.active();
        active.remove(&group_id);

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, slot| slot.group_id != group_id);
        let removed = before - sessions.len();

        tracing::info!(%group_id, removed, "group sessions purged");
        removed
    }

    fn active(&self) -> MutexGuard<'_, HashMap<GroupId, SessionId>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, session_id: SessionId) -> Result<Arc<tokio::sync::Mutex<Session>>, StoreError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .map(|slot| Arc::clone(&slot.session))
            .ok_or(StoreError::SessionNotFound(session_id))
    }

    /// Brings the group index in line with a status change from `before`
    /// to `after`. Fails without touching the index if `after` would be a
    /// second live session in its group.
    fn reindex(&self, before: &Session, after: &Session) -> Result<(), StoreError> {
        let was_live = before.status().is_active();
        let is_live = after.status().is_active();
        if was_live == is_live {
            return Ok(());
        }

        let mut active = self.active();
        let group_id = after.group_id();
        let session_id = after.id();

        if is_live {
            if let Some(&other) = active.get(&group_id) {
                if other != session_id {
                    return Err(StoreError::AlreadyActiveSession {
                        group_id,
                        session_id: other,
                    });
                }
            }
            active.insert(group_id, session_id);
        } else if active.get(&group_id) == Some(&session_id) {
            active.remove(&group_id);
        }
        Ok(())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create_session(
        &self,
        group_id: GroupId,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut active = self.active();
        if let Some(&session_id) = active.get(&group_id) {
            return Err(StoreError::AlreadyActiveSession {
                group_id,
                session_id,
            });
        }

        let session_id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session::new(session_id, group_id, now);

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                session_id,
                Slot {
                    group_id,
                    session: Arc::new(tokio::sync::Mutex::new(session.clone())),
                },
            );
        active.insert(group_id, session_id);

        tracing::debug!(%session_id, %group_id, "session stored");
        Ok(session)
    }

    async fn load(&self, session_id: SessionId) -> Result<Session, StoreError> {
        let slot = self.slot(session_id)?;
        let session = slot.lock().await;
        Ok(session.clone())
    }

    async fn active_for_group(&self, group_id: GroupId) -> Result<Option<Session>, StoreError> {
        let Some(session_id) = self.active().get(&group_id).copied() else {
            return Ok(None);
        };
        let slot = match self.slot(session_id) {
            Ok(slot) => slot,
            Err(StoreError::SessionNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let session = slot.lock().await;
        Ok(session.status().is_active().then(|| session.clone()))
    }

    async fn update<T, E, F>(&self, session_id: SessionId, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut Session) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send,
    {
        let slot = self.slot(session_id)?;
        let mut current = slot.lock().await;

        let mut draft = current.clone();
        let out = mutate(&mut draft)?;
        self.reindex(&current, &draft)?;

        if current.status() != draft.status() {
            tracing::debug!(
                %session_id,
                from = %current.status(),
                to = %draft.status(),
                "session status committed"
            );
        }
        *current = draft;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use spyglass_protocol::{LocationCandidate, LocationId, LocationScope, SessionStatus, UserId};
    use spyglass_session::{GameSettings, SessionError};

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn gid(id: i64) -> GroupId {
        GroupId(id)
    }

    #[derive(Debug, PartialEq)]
    enum TestError {
        Store(StoreError),
        Session(SessionError),
    }

    impl From<StoreError> for TestError {
        fn from(e: StoreError) -> Self {
            Self::Store(e)
        }
    }

    impl From<SessionError> for TestError {
        fn from(e: SessionError) -> Self {
            Self::Session(e)
        }
    }

    // =====================================================================
    // create_session()
    // =====================================================================

    #[tokio::test]
    async fn test_create_session_assigns_increasing_ids() {
        let store = InMemorySessionStore::new();
        let a = store.create_session(gid(1), now()).await.unwrap();
        let b = store.create_session(gid(2), now()).await.unwrap();

        assert_eq!(a.id(), SessionId(1));
        assert_eq!(b.id(), SessionId(2));
        assert_eq!(a.status(), SessionStatus::Registration);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_create_session_twice_same_group_fails() {
        let store = InMemorySessionStore::new();
        let first = store.create_session(gid(1), now()).await.unwrap();

        let err = store.create_session(gid(1), now()).await.unwrap_err();

        assert_eq!(
            err,
            StoreError::AlreadyActiveSession {
                group_id: gid(1),
                session_id: first.id(),
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_session_after_finish_succeeds() {
        let store = InMemorySessionStore::new();
        let first = store.create_session(gid(1), now()).await.unwrap();
        store
            .update(first.id(), |s| s.finish(now()).map_err(TestError::from))
            .await
            .unwrap();

        let second = store.create_session(gid(1), now()).await.unwrap();
        assert_ne!(first.id(), second.id());
    }

    // =====================================================================
    // load() / active_for_group()
    // =====================================================================

    #[tokio::test]
    async fn test_load_unknown_session_not_found() {
        let store = InMemorySessionStore::new();
        assert_eq!(
            store.load(SessionId(42)).await,
            Err(StoreError::SessionNotFound(SessionId(42)))
        );
    }

    #[tokio::test]
    async fn test_active_for_group_tracks_lifecycle() {
        let store = InMemorySessionStore::new();
        assert!(store.active_for_group(gid(1)).await.unwrap().is_none());

        let s = store.create_session(gid(1), now()).await.unwrap();
        let found = store.active_for_group(gid(1)).await.unwrap().unwrap();
        assert_eq!(found.id(), s.id());

        store
            .update(s.id(), |s| s.finish(now()).map_err(TestError::from))
            .await
            .unwrap();
        assert!(store.active_for_group(gid(1)).await.unwrap().is_none());
        // Finished sessions can still be loaded by id.
        assert_eq!(
            store.load(s.id()).await.unwrap().status(),
            SessionStatus::Finished
        );
    }

    // =====================================================================
    // update()
    // =====================================================================

    #[tokio::test]
    async fn test_update_failed_mutation_is_not_committed() {
        let store = InMemorySessionStore::new();
        let s = store.create_session(gid(1), now()).await.unwrap();
        store
            .update(s.id(), |s| {
                s.join(UserId(1), 10, now()).map(|_| ()).map_err(TestError::from)
            })
            .await
            .unwrap();

        // Join a second player, then fail: the join must not stick.
        let result: Result<(), TestError> = store
            .update(s.id(), |s| {
                s.join(UserId(2), 10, now())?;
                s.join(UserId(1), 10, now())?;
                Ok(())
            })
            .await;

        assert_eq!(
            result,
            Err(TestError::Session(SessionError::AlreadyJoined(UserId(1))))
        );
        assert_eq!(store.load(s.id()).await.unwrap().roster().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_session_not_found() {
        let store = InMemorySessionStore::new();
        let result: Result<(), TestError> = store.update(SessionId(7), |_| Ok(())).await;
        assert_eq!(
            result,
            Err(TestError::Store(StoreError::SessionNotFound(SessionId(7))))
        );
    }

    /// Plays a 4-player round in `group` to completion and returns its id.
    async fn finished_round(store: &InMemorySessionStore, group: GroupId) -> SessionId {
        let s = store.create_session(group, now()).await.unwrap();
        store
            .update(s.id(), |s| {
                for id in 1..=4 {
                    s.join(UserId(id), 10, now())?;
                }
                let pool = [LocationCandidate::new(
                    LocationId(1),
                    LocationScope::Global,
                    [("en", "Bank")],
                )];
                let mut rng = StdRng::seed_from_u64(3);
                s.close_registration(&pool, &GameSettings::default(), &mut rng, now())?;
                s.finish(now())?;
                Ok::<_, TestError>(())
            })
            .await
            .unwrap();
        s.id()
    }

    #[tokio::test]
    async fn test_update_resume_reclaims_group_slot() {
        let store = InMemorySessionStore::new();
        let old = finished_round(&store, gid(1)).await;

        store
            .update(old, |s| s.resume().map_err(TestError::from))
            .await
            .unwrap();

        let live = store.active_for_group(gid(1)).await.unwrap().unwrap();
        assert_eq!(live.id(), old);
        assert!(store.create_session(gid(1), now()).await.is_err());
    }

    #[tokio::test]
    async fn test_update_resume_blocked_by_other_live_session() {
        let store = InMemorySessionStore::new();
        let old = finished_round(&store, gid(1)).await;
        let newer = store.create_session(gid(1), now()).await.unwrap();

        let result = store
            .update(old, |s| s.resume().map_err(TestError::from))
            .await;

        assert_eq!(
            result,
            Err(TestError::Store(StoreError::AlreadyActiveSession {
                group_id: gid(1),
                session_id: newer.id(),
            }))
        );
        assert_eq!(
            store.load(old).await.unwrap().status(),
            SessionStatus::Finished,
            "rejected resume is not committed"
        );
    }

    // =====================================================================
    // purge_group()
    // =====================================================================

    #[tokio::test]
    async fn test_purge_group_removes_only_that_group() {
        let store = InMemorySessionStore::new();
        finished_round(&store, gid(1)).await;
        store.create_session(gid(1), now()).await.unwrap();
        let other = store.create_session(gid(2), now()).await.unwrap();

        assert_eq!(store.purge_group(gid(1)), 2);

        assert_eq!(store.len(), 1);
        assert!(store.active_for_group(gid(1)).await.unwrap().is_none());
        assert!(store.load(other.id()).await.is_ok());
        // The group can start over.
        assert!(store.create_session(gid(1), now()).await.is_ok());
    }
}
