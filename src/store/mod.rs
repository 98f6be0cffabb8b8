//! Photo record storage.
//!
//! Handlers only ever see a [`SharedStore`]; which variant sits behind it is
//! decided once in [`from_config`].

mod memory;
mod postgres;

use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::database;
use crate::error::StoreError;
use crate::models::photos::{NewPhoto, Photo};

pub use memory::MemPhotoStore;
pub use postgres::PgPhotoStore;

/// Append-only store of photo records.
///
/// Calls may block (the durable variant performs network I/O), so async
/// callers should run them through `web::block`.
pub trait PhotoStore: Send + Sync {
    /// Persists `new`, assigning a fresh `id` and `uploaded_at`.
    fn create(&self, new: NewPhoto) -> Result<Photo, StoreError>;

    /// Every stored record, newest `uploaded_at` first. Ties are broken by
    /// descending `id`.
    fn list_all(&self) -> Result<Vec<Photo>, StoreError>;
}

pub type SharedStore = Arc<dyn PhotoStore>;

/// Picks the store variant for this process: PostgreSQL when a database URL is
/// configured, otherwise the in-memory store.
pub fn from_config(config: &Config) -> Result<SharedStore, StoreError> {
    match &config.database_url {
        Some(url) => {
            let pool = database::create_pool(url, config.db_pool_size)?;
            database::ensure_schema(&pool)?;
            info!("Using PostgreSQL photo store");
            Ok(Arc::new(PgPhotoStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory photo store (lost on restart)");
            Ok(Arc::new(MemPhotoStore::new()))
        }
    }
}

/// Sort order shared by both variants.
pub(crate) fn sort_newest_first(photos: &mut [Photo]) {
    photos.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
