//! Which flat each chat participant registered for.

use dashmap::DashMap;

use crate::types::{SessionId, UnitId};

/// Maps a session to the unit it is registered for.
///
/// Entries are partitioned by session; writes to one session never wait on
/// another beyond the shard lock.
#[derive(Debug, Default)]
pub struct UnitRegistry {
    sessions: DashMap<SessionId, UnitId>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `unit` with `session`, returning the unit it replaced.
    pub fn register_unit(&self, session: &SessionId, unit: UnitId) -> Option<UnitId> {
        self.sessions.insert(session.clone(), unit)
    }

    pub fn lookup_unit(&self, session: &SessionId) -> Option<UnitId> {
        self.sessions.get(session).map(|entry| entry.value().clone())
    }
}
