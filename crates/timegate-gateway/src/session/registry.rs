//! Process-wide session registry.
//!
//! The one shared mutable structure in the system: `session_id -> SessionEntry`.
//! Inserted by the stream handler on open, removed by its teardown guard,
//! read by the intake endpoint. All synchronization lives here.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

use timegate_core::error::{Result, TimeGateError};

/// Reference to one live session held by the registry.
#[derive(Clone)]
pub struct SessionEntry {
    /// Sender half of the session's inbound channel.
    pub inbound: mpsc::Sender<Value>,
    pub client_id: String,
    pub created_at: Instant,
}

impl SessionEntry {
    pub fn new(inbound: mpsc::Sender<Value>, client_id: impl Into<String>) -> Self {
        Self {
            inbound,
            client_id: client_id.into(),
            created_at: Instant::now(),
        }
    }
}

/// Session registry: `session_id -> SessionEntry`.
///
/// At most one live entry per identifier; an identifier is reusable only after
/// explicit removal.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a session. A colliding identifier is an internal fault and
    /// must never silently overwrite the live entry.
    pub fn insert(&self, session_id: &str, entry: SessionEntry) -> Result<()> {
        match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(_) => Err(TimeGateError::DuplicateSession(session_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Remove a session. Idempotent: an absent identifier is a no-op, which is
    /// what lets two racing teardown paths both call this safely.
    pub fn remove(&self, session_id: &str) -> Option<SessionEntry> {
        self.sessions.remove(session_id).map(|(_, entry)| entry)
    }

    pub fn lookup(&self, session_id: &str) -> Option<SessionEntry> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
