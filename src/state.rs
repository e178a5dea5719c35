use crate::collection::HabitCollection;
use crate::errors::AppError;
use crate::storage::persist_data;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<HabitCollection>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: HabitCollection) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn update<T>(
        &self,
        change: impl FnOnce(&mut HabitCollection) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut data = self.data.lock().await;
        let snapshot = data.clone();
        let outcome = change(&mut *data)?;
        if let Err(err) = persist_data(&self.data_path, &data).await {
            error!("failed to persist data, rolling back: {}", err.message);
            *data = snapshot;
            return Err(err);
        }
        Ok(outcome)
    }
}
