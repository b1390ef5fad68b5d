//! Shared application state handed to every route handler and every WS
//! session actor. `db` is optional so unit/integration tests can build
//! an `AppState` without a live Postgres connection.

use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::AppError;
use crate::state::security_config::SecurityConfig;
use crate::store::SessionStore;
use crate::ws::hub::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    db: Option<DatabaseConnection>,
    pub security: SecurityConfig,
    pub store: Arc<dyn SessionStore>,
    pub registry: Arc<ConnectionRegistry>,
    table_locks: Arc<DashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl AppState {
    pub fn new(db: Option<DatabaseConnection>, security: SecurityConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            db,
            security,
            store,
            registry: Arc::new(ConnectionRegistry::new()),
            table_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn require_db(&self) -> Result<&DatabaseConnection, AppError> {
        self.db.as_ref().ok_or(AppError::DbUnavailable)
    }

    /// The per-table mutex held across a table's full
    /// load -> validate -> mutate -> save -> broadcast cycle.
    pub fn table_lock(&self, table_id: i64) -> Arc<AsyncMutex<()>> {
        self.table_locks.entry(table_id).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    pub fn forget_table(&self, table_id: i64) {
        self.table_locks.remove(&table_id);
    }
}
