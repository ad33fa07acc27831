// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state with a bounded history.
//!
//! A session goes through states: Active -> Expired -> Destroyed, with no
//! transition back. The history holds at most `capacity` entries; appending
//! past the cap evicts the oldest entry first.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use querygate_core::{ConversationEntry, SessionId};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a [`ChatSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting exchanges.
    Active,
    /// Idle past the timeout. Will not accept exchanges again.
    Expired,
    /// Removed explicitly (logout) or by the sweeper.
    Destroyed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Active => write!(f, "active"),
            SessionState::Expired => write!(f, "expired"),
            SessionState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Converts an idle window to a chrono duration, saturating on overflow.
pub(crate) fn idle_window(idle: Duration) -> chrono::Duration {
    chrono::Duration::from_std(idle).unwrap_or(chrono::Duration::MAX)
}

/// Serializable copy of a session's identity, timing, and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    #[serde(default)]
    pub total_exchanges: u64,
    /// Oldest first.
    pub history: Vec<ConversationEntry>,
}

/// One user's conversation: ordered, size-bounded, expiring.
#[derive(Debug, Clone)]
pub struct ChatSession {
    session_id: SessionId,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    history: VecDeque<ConversationEntry>,
    capacity: usize,
    total_exchanges: u64,
    state: SessionState,
}

impl ChatSession {
    /// Creates an empty session. A zero capacity is raised to one.
    pub fn new(session_id: SessionId, capacity: usize, now: DateTime<Utc>) -> Self {
        let capacity = capacity.max(1);
        Self {
            session_id,
            created_at: now,
            last_activity_at: now,
            history: VecDeque::new(),
            capacity,
            total_exchanges: 0,
            state: SessionState::Active,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// History entries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.history.iter()
    }

    /// Count of all entries ever appended, including evicted ones.
    pub fn total_exchanges(&self) -> u64 {
        self.total_exchanges
    }

    /// Appends `entry`, evicting the oldest entries beyond capacity.
    ///
    /// The entry's timestamp becomes the session's last activity.
    pub fn append_entry(&mut self, entry: ConversationEntry) {
        self.last_activity_at = entry.timestamp;
        self.history.push_back(entry);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        self.total_exchanges += 1;
    }

    /// True iff more than `idle_timeout` has passed since the last activity.
    pub fn is_expired(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now.signed_duration_since(self.last_activity_at) > idle_window(idle_timeout)
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ConversationEntry> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Empties the history. Activity time and the exchange count are kept.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
            total_exchanges: self.total_exchanges,
            history: self.history.iter().cloned().collect(),
        }
    }

    /// Rebuilds an active session from `snapshot`, keeping only the newest
    /// `capacity` entries.
    pub fn from_snapshot(snapshot: SessionSnapshot, capacity: usize) -> Self {
        let mut session = Self::new(snapshot.session_id, capacity, snapshot.created_at);
        let skip = snapshot.history.len().saturating_sub(session.capacity);
        session.history = snapshot.history.into_iter().skip(skip).collect();
        session.last_activity_at = snapshot.last_activity_at;
        session.total_exchanges = snapshot
            .total_exchanges
            .max(session.history.len() as u64);
        session
    }

    pub(crate) fn mark_expired(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Expired;
        }
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.state = SessionState::Destroyed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn entry(secs: i64, question: &str) -> ConversationEntry {
        ConversationEntry::new(at(secs), question)
    }

    #[test]
    fn append_at_capacity_evicts_exactly_the_oldest() {
        let mut session = ChatSession::new("s".into(), 3, at(0));
        for i in 0..3 {
            session.append_entry(entry(i, &format!("q{i}")));
        }
        session.append_entry(entry(3, "q3"));

        let questions: Vec<&str> = session.history().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q2", "q3"]);
        assert_eq!(session.len(), 3);
        assert_eq!(session.total_exchanges(), 4);
    }

    #[test]
    fn append_refreshes_last_activity() {
        let mut session = ChatSession::new("s".into(), 5, at(0));
        session.append_entry(entry(42, "q"));
        assert_eq!(session.last_activity_at(), at(42));
        assert_eq!(session.created_at(), at(0));
    }

    #[test]
    fn expiry_is_strictly_after_the_idle_window() {
        let session = ChatSession::new("s".into(), 5, at(0));
        let idle = Duration::from_secs(60);
        assert!(!session.is_expired(at(59), idle));
        assert!(!session.is_expired(at(60), idle));
        assert!(session.is_expired(at(61), idle));
    }

    #[test]
    fn huge_idle_window_never_expires() {
        let session = ChatSession::new("s".into(), 5, at(0));
        assert!(!session.is_expired(at(10_000_000), Duration::MAX));
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut session = ChatSession::new("s".into(), 10, at(0));
        for i in 0..4 {
            session.append_entry(entry(i, &format!("q{i}")));
        }
        let recent: Vec<String> = session.recent(2).into_iter().map(|e| e.question).collect();
        assert_eq!(recent, vec!["q2", "q3"]);
        assert_eq!(session.recent(10).len(), 4);
        assert!(session.recent(0).is_empty());
    }

    #[test]
    fn clear_keeps_counters() {
        let mut session = ChatSession::new("s".into(), 10, at(0));
        session.append_entry(entry(5, "q"));
        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.total_exchanges(), 1);
        assert_eq!(session.last_activity_at(), at(5));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut session = ChatSession::new("s".into(), 0, at(0));
        session.append_entry(entry(1, "a"));
        session.append_entry(entry(2, "b"));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut session = ChatSession::new("s".into(), 1_000_000_000_000, at(0));
        session.append_entry(entry(1, "q"));
        assert_eq!(session.len(), 1);
        assert_eq!(session.capacity(), 1_000_000_000_000);
    }

    #[test]
    fn snapshot_survives_json_round_trip() {
        let mut session = ChatSession::new("s-json".into(), 5, at(0));
        let mut answered = entry(10, "how many products?");
        answered.generated_sql = Some("SELECT COUNT(*) FROM products".into());
        answered.answer_text = "There are 50 products.".into();
        answered.execution_time_ms = 120;
        session.append_entry(answered);
        session.append_entry(entry(20, "and customers?"));

        let json = serde_json::to_string(&session.snapshot()).unwrap();
        let restored = ChatSession::from_snapshot(serde_json::from_str(&json).unwrap(), 5);

        assert_eq!(restored.session_id().as_str(), "s-json");
        assert_eq!(restored.created_at(), at(0));
        assert_eq!(restored.last_activity_at(), at(20));
        assert_eq!(restored.total_exchanges(), 2);
        assert_eq!(restored.state(), SessionState::Active);
        assert_eq!(restored.snapshot(), session.snapshot());
        assert_eq!(restored.history().next().unwrap().execution_time_ms, 120);
    }

    #[test]
    fn restoring_into_a_smaller_session_keeps_the_newest() {
        let mut session = ChatSession::new("s".into(), 10, at(0));
        for i in 0..4 {
            session.append_entry(entry(i, &format!("q{i}")));
        }
        let restored = ChatSession::from_snapshot(session.snapshot(), 2);
        let questions: Vec<&str> = restored.history().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["q2", "q3"]);
        assert_eq!(restored.total_exchanges(), 4);
    }

    #[test]
    fn snapshot_json_uses_plain_field_names() {
        let session = ChatSession::new("abc".into(), 3, at(0));
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["session_id"], "abc");
        assert!(json["history"].as_array().unwrap().is_empty());
        assert!(json.get("created_at").is_some());
    }

    #[test]
    fn states_only_move_forward() {
        let mut session = ChatSession::new("s".into(), 1, at(0));
        assert_eq!(session.state(), SessionState::Active);
        session.mark_destroyed();
        session.mark_expired();
        assert_eq!(session.state(), SessionState::Destroyed);
        assert_eq!(session.state().to_string(), "destroyed");
    }
}
