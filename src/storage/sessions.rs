use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::{ConversationTurn, Session};

/// In-memory session store with idle expiry.
///
/// Reads hand out clones and writes replace whole sessions, so two
/// interleaved turns for the same conversant resolve last-write-wins.
/// WhatsApp traffic is effectively serial per number, which keeps that
/// window harmless in practice.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    max_history_turns: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_history_turns: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_history_turns,
        }
    }

    /// Returns a copy of the live session for `conversant_id`, or a fresh
    /// empty one if none exists or the stored one has been idle past the TTL.
    /// Expired sessions are not removed here; the reaper handles that.
    pub async fn get_or_create(&self, conversant_id: &str, now: DateTime<Utc>) -> Session {
        let sessions = self.sessions.read().await;
        match sessions.get(conversant_id) {
            Some(session) if now - session.last_activity_at <= self.ttl => session.clone(),
            _ => Session::fresh(conversant_id, now),
        }
    }

    /// Appends a turn and trims the history to the most recent
    /// `2 * max_history_turns` entries. The trim is a flat suffix cut; it
    /// does not try to keep user/assistant turns paired.
    pub fn append_and_trim(&self, session: &mut Session, turn: ConversationTurn) {
        session.messages.push(turn);
        let cap = self.max_history_turns * 2;
        if session.messages.len() > cap {
            let excess = session.messages.len() - cap;
            session.messages.drain(..excess);
        }
    }

    /// Writes the session back, stamping it as active now.
    pub async fn save(&self, mut session: Session, now: DateTime<Utc>) {
        session.last_activity_at = now;
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.conversant_id.clone(), session);
    }

    /// Removes every session idle past the TTL. Returns how many went.
    pub async fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_activity_at <= self.ttl);
        before - sessions.len()
    }

    pub async fn get(&self, conversant_id: &str) -> Option<Session> {
        self.sessions.read().await.get(conversant_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
