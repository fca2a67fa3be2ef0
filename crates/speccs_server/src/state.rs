//! Shared application state.
//!
//! One SQLite connection is shared behind a mutex; every store call runs on
//! the blocking pool so the async workers never wait on disk I/O.

use crate::error::ApiError;
use rusqlite::Connection;
use speccs_core::{InventoryStore, StoreResult};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `op` against a store acting as `actor` (or the default actor).
    pub async fn with_store<T, F>(&self, actor: Option<String>, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&InventoryStore<'_>) -> StoreResult<T> + Send + 'static,
    {
        self.with_connection(move |conn| {
            let store = InventoryStore::try_new(conn)?;
            let store = match actor {
                Some(actor) => store.with_actor(actor)?,
                None => store,
            };
            op(&store).map_err(ApiError::from)
        })
        .await
    }

    /// Runs `op` with exclusive access to the raw connection.
    pub async fn with_connection<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::internal("database mutex poisoned"))?;
            op(&conn)
        })
        .await
        .map_err(|err| ApiError::internal(format!("blocking task failed: {err}")))?
    }
}
