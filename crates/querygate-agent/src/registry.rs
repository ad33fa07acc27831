// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner of all live conversation sessions.
//!
//! Sessions live behind a per-session `tokio::sync::Mutex` inside a
//! `DashMap`. An exchange checks one out as an owned guard, so different
//! sessions never wait on each other and the map's shard lock is held only
//! for the lookup. Ids of expired or destroyed sessions are remembered for
//! one idle window so a stale client cannot silently resurrect them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use querygate_config::QuerygateConfig;
use querygate_core::{QuerygateError, SessionId};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::session::{idle_window, ChatSession, SessionSnapshot};

/// A session checked out for the duration of one exchange.
pub type SessionHandle = OwnedMutexGuard<ChatSession>;

/// Creates, looks up, expires, and destroys sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Mutex<ChatSession>>>,
    /// Retired ids and when they were retired.
    retired: DashMap<SessionId, DateTime<Utc>>,
    capacity: usize,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(capacity: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            retired: DashMap::new(),
            capacity,
            idle_timeout,
        }
    }

    pub fn from_config(config: &QuerygateConfig) -> Self {
        Self::new(
            config.session.max_conversation_history,
            config.session_idle_timeout(),
        )
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn is_retired(&self, id: &SessionId) -> bool {
        self.retired.contains_key(id)
    }

    /// Checks out the session `id`, creating it if unseen.
    pub async fn get_or_create(&self, id: &SessionId) -> Result<SessionHandle, QuerygateError> {
        self.get_or_create_at(id, Utc::now()).await
    }

    /// [`get_or_create`](Self::get_or_create) with an explicit clock.
    ///
    /// Fails with `SessionExpired` if `id` was retired, or if the session has
    /// been idle past the timeout (it is retired on the spot).
    pub async fn get_or_create_at(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionHandle, QuerygateError> {
        if self.is_retired(id) {
            return Err(expired(id));
        }

        let slot = match self.sessions.entry(id.clone()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(vacant) => {
                debug!(session_id = %id, "session created");
                let session = ChatSession::new(id.clone(), self.capacity, now);
                vacant.insert(Arc::new(Mutex::new(session))).clone()
            }
        };

        let mut session = slot.clone().lock_owned().await;

        // Swept or destroyed while this caller waited for the lock. A slot this
        // caller inserted after the id was retired must not stay live.
        if self.is_retired(id) {
            drop(session);
            self.sessions
                .remove_if(id, |_, current| Arc::ptr_eq(current, &slot));
            return Err(expired(id));
        }

        if session.is_expired(now, self.idle_timeout) {
            session.mark_expired();
            drop(session);
            self.sessions
                .remove_if(id, |_, current| Arc::ptr_eq(current, &slot));
            self.retired.insert(id.clone(), now);
            info!(session_id = %id, "session expired on access");
            return Err(expired(id));
        }

        Ok(session)
    }

    /// Copies the history of a live session without creating one or
    /// refreshing its activity.
    ///
    /// Waits for an in-flight exchange on the session to finish. Returns
    /// `Ok(None)` for an id never seen and `SessionExpired` for one that has
    /// expired or was destroyed.
    pub async fn snapshot(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, QuerygateError> {
        self.snapshot_at(id, Utc::now()).await
    }

    pub async fn snapshot_at(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionSnapshot>, QuerygateError> {
        if self.is_retired(id) {
            return Err(expired(id));
        }
        let Some(slot) = self.sessions.get(id).map(|s| Arc::clone(s.value())) else {
            return Ok(None);
        };
        let session = slot.lock().await;
        if self.is_retired(id) || session.is_expired(now, self.idle_timeout) {
            return Err(expired(id));
        }
        Ok(Some(session.snapshot()))
    }

    /// Removes every expired session not currently checked out.
    ///
    /// Also forgets retired ids older than one idle window. Returns the number
    /// of sessions removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.sessions.retain(|id, slot| match slot.try_lock() {
            Ok(mut session) if session.is_expired(now, self.idle_timeout) => {
                session.mark_expired();
                self.retired.insert(id.clone(), now);
                removed += 1;
                false
            }
            _ => true,
        });

        let window = idle_window(self.idle_timeout);
        self.retired
            .retain(|_, retired_at| now.signed_duration_since(*retired_at) <= window);

        if removed > 0 {
            info!(removed, live = self.sessions.len(), "swept expired sessions");
        }
        removed
    }

    /// Explicitly removes a session (logout). Returns whether it existed.
    pub fn destroy(&self, id: &SessionId) -> bool {
        self.destroy_at(id, Utc::now())
    }

    pub fn destroy_at(&self, id: &SessionId, now: DateTime<Utc>) -> bool {
        let Some((_, slot)) = self.sessions.remove(id) else {
            return false;
        };
        if let Ok(mut session) = slot.try_lock() {
            session.mark_destroyed();
        }
        self.retired.insert(id.clone(), now);
        info!(session_id = %id, "session destroyed");
        true
    }
}

fn expired(id: &SessionId) -> QuerygateError {
    QuerygateError::SessionExpired {
        session_id: id.to_string(),
    }
}
