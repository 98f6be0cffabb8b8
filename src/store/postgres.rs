use crate::database::DbPool;
use crate::error::StoreError;
use crate::models::photos::{NewPhoto, Photo};
use crate::repositories::photos::{insert_photo, load_all_photos};

use super::PhotoStore;

/// Durable store backed by the `photos` table. Concurrency control is left to
/// PostgreSQL.
#[derive(Clone)]
pub struct PgPhotoStore {
    pool: DbPool,
}

impl PgPhotoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PhotoStore for PgPhotoStore {
    fn create(&self, new: NewPhoto) -> Result<Photo, StoreError> {
        insert_photo(&self.pool, &new)
    }

    fn list_all(&self) -> Result<Vec<Photo>, StoreError> {
        load_all_photos(&self.pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_pool, ensure_schema};

    // Needs a scratch database:
    // TEST_DATABASE_URL=postgres://... cargo test -- --ignored
    #[test]
    #[ignore]
    fn create_then_list_against_postgres() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let pool = create_pool(&url, 2).unwrap();
        ensure_schema(&pool).unwrap();
        let store = PgPhotoStore::new(pool);

        let filename = format!("{}-pgtest.jpg", uuid::Uuid::new_v4().simple());
        let created = store
            .create(NewPhoto {
                filename: filename.clone(),
                original_name: "beach.jpg".into(),
                mime_type: "image/jpeg".into(),
                size: "1234".into(),
            })
            .unwrap();
        assert_eq!(created.filename, filename);
        assert_eq!(created.size, "1234");

        let listed = store.list_all().unwrap();
        assert!(listed.iter().any(|p| p.id == created.id));
        assert!(
            listed
                .windows(2)
                .all(|w| w[0].uploaded_at >= w[1].uploaded_at)
        );
    }
}
