//! In-process connection registry: table id -> user id -> live actor
//! address. Two-level so `attach` is idempotent on user id (a
//! reconnecting client replaces its own stale channel without touching
//! anyone else's) and `lookup` is O(1).

use actix::Recipient;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::state::UserId;
use crate::ws::session::Push;

pub type ConnHandle = Recipient<Push>;

#[derive(Default)]
pub struct ConnectionRegistry {
    tables: DashMap<i64, DashMap<UserId, ConnHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, table_id: i64, user_id: UserId, handle: ConnHandle) {
        self.tables.entry(table_id).or_default().insert(user_id, handle);
    }

    pub fn detach(&self, table_id: i64, user_id: UserId) {
        if let Some(conns) = self.tables.get(&table_id) {
            conns.remove(&user_id);
        }
    }

    /// Drops every connection entry for a table at once. Used when a
    /// table is torn down (game over, or a fatal store failure) so no
    /// further sends are attempted against it.
    pub fn detach_all(&self, table_id: i64) {
        self.tables.remove(&table_id);
    }

    pub fn lookup(&self, table_id: i64, user_id: UserId) -> Option<ConnHandle> {
        self.tables.get(&table_id)?.get(&user_id).map(|e| e.clone())
    }

    pub fn connected_users(&self, table_id: i64) -> Vec<UserId> {
        self.tables.get(&table_id).map(|c| c.iter().map(|e| *e.key()).collect()).unwrap_or_default()
    }

    pub fn connected_count(&self, table_id: i64) -> usize {
        self.tables.get(&table_id).map(|c| c.len()).unwrap_or(0)
    }

    /// Best-effort fan-out: a failed send detaches the offending
    /// channel silently and continues with the rest.
    pub fn broadcast(&self, table_id: i64, msg: Push) {
        let Some(conns) = self.tables.get(&table_id) else {
            return;
        };
        let stale: Vec<UserId> = conns
            .iter()
            .filter_map(|entry| {
                if entry.value().do_send(msg.clone()).is_err() {
                    Some(*entry.key())
                } else {
                    None
                }
            })
            .collect();
        drop(conns);
        for user_id in stale {
            debug!(table_id, user_id, "dropping stale connection after failed send");
            self.detach(table_id, user_id);
        }
    }

    pub fn send(&self, table_id: i64, user_id: UserId, msg: Push) {
        if let Some(handle) = self.lookup(table_id, user_id) {
            if handle.do_send(msg).is_err() {
                self.detach(table_id, user_id);
            }
        }
    }
}
