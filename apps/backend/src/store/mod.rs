//! Session State persistence: the store holds the volatile, in-progress
//! record of a table between WebSocket messages. Atomicity across a
//! load/mutate/save cycle is the coordinator's job (its per-table lock),
//! not the store's — a store implementation only promises per-call
//! atomicity.

pub mod memory_store;
pub mod redis_store;

use async_trait::async_trait;

use crate::domain::state::SessionState;
use crate::error::AppError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, table_id: i64) -> Result<Option<SessionState>, AppError>;
    async fn save(&self, table_id: i64, state: &SessionState) -> Result<(), AppError>;
    async fn delete(&self, table_id: i64) -> Result<(), AppError>;
}
