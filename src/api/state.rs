use super::ApiError;
use crate::store::NoteStore;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

// Shared state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<NoteStore>>,
}

impl AppState {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Locks the store for the rest of the request. Handlers must not hold
    /// the guard across an `.await`.
    pub fn store(&self) -> Result<MutexGuard<'_, NoteStore>, ApiError> {
        self.store.lock().map_err(|e| {
            error!("Note store lock poisoned: {}", e);
            ApiError::InternalServerError
        })
    }
}
