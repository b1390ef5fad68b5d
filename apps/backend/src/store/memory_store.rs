//! In-process session store for tests and the narrow single-process dev
//! path. No persistence beyond the lifetime of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::state::SessionState;
use crate::error::AppError;
use crate::store::SessionStore;

#[derive(Default)]
pub struct InMemorySessionStore {
    tables: Mutex<HashMap<i64, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, table_id: i64) -> Result<Option<SessionState>, AppError> {
        Ok(self.tables.lock().get(&table_id).cloned())
    }

    async fn save(&self, table_id: i64, state: &SessionState) -> Result<(), AppError> {
        self.tables.lock().insert(table_id, state.clone());
        Ok(())
    }

    async fn delete(&self, table_id: i64) -> Result<(), AppError> {
        self.tables.lock().remove(&table_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scoring::start_round;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn round_trips_state() {
        let store = InMemorySessionStore::new();
        let seats = BTreeMap::from([(1, 10), (2, 20), (3, 30), (4, 40)]);
        let state = start_round(1, seats);

        assert!(store.load(1).await.unwrap().is_none());
        store.save(1, &state).await.unwrap();
        let loaded = store.load(1).await.unwrap().unwrap();
        assert_eq!(loaded.round_number, state.round_number);

        store.delete(1).await.unwrap();
        assert!(store.load(1).await.unwrap().is_none());
    }
}
