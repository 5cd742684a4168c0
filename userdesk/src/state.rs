use std::sync::Arc;

use sqlx::{Any, AnyPool, Pool};
use userdesk_data::HasPool;

use crate::storage::UploadStore;

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub pool: AnyPool,
    pub store: UploadStore,
    /// Base URL relative picture paths are resolved against.
    pub public_url: Arc<str>,
}

impl AppState {
    pub fn new(pool: AnyPool, store: UploadStore, public_url: &str) -> Self {
        Self {
            pool,
            store,
            public_url: Arc::from(public_url),
        }
    }
}

impl HasPool<Any> for AppState {
    fn pool(&self) -> &Pool<Any> {
        &self.pool
    }
}
