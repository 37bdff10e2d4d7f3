use std::sync::Arc;

use tracing::error;

use super::error::AppError;
use crate::{database::store::Store, media::MediaStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: Arc<MediaStore>,
    pub page_size: i64,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, media: MediaStore, page_size: i64) -> Self {
        Self {
            store,
            media: Arc::new(media),
            page_size,
        }
    }

    /// Runs blocking store and filesystem work on the blocking thread pool.
    pub async fn run<T, F>(&self, task: F) -> Result<T, AppError>
    where
        F: FnOnce(&AppState) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || task(&state))
            .await
            .map_err(|e| {
                error!("Blocking task failed: {e}");
                AppError::Internal(e.to_string())
            })?
    }
}
