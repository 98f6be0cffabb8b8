use std::sync::Mutex;

use chrono::Utc;

use crate::error::StoreError;
use crate::models::photos::{NewPhoto, Photo};

use super::{PhotoStore, sort_newest_first};

/// Process-local store. Contents are lost on restart and are not shared
/// between processes.
pub struct MemPhotoStore {
    inner: Mutex<MemState>,
}

struct MemState {
    next_id: i32,
    photos: Vec<Photo>,
}

impl MemPhotoStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemState {
                next_id: 1,
                photos: Vec::new(),
            }),
        }
    }
}

impl Default for MemPhotoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoStore for MemPhotoStore {
    fn create(&self, new: NewPhoto) -> Result<Photo, StoreError> {
        let mut state = self.inner.lock().map_err(|_| StoreError::Poisoned)?;

        let id = state.next_id;
        state.next_id += 1;

        let photo = new.into_photo(id, Utc::now());
        state.photos.push(photo.clone());
        Ok(photo)
    }

    fn list_all(&self) -> Result<Vec<Photo>, StoreError> {
        let mut photos = self
            .inner
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .photos
            .clone();
        sort_newest_first(&mut photos);
        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn new_photo(n: usize) -> NewPhoto {
        NewPhoto {
            filename: format!("1700000000000-{n:032x}.jpg"),
            original_name: format!("holiday {n}.JPG"),
            mime_type: "image/jpeg".to_string(),
            size: (1000 + n).to_string(),
        }
    }

    #[test]
    fn create_keeps_input_fields_and_assigns_id() {
        let store = MemPhotoStore::new();
        let input = new_photo(7);

        let before = Utc::now();
        let photo = store.create(input.clone()).unwrap();
        let after = Utc::now();

        assert_eq!(photo.id, 1);
        assert_eq!(photo.filename, input.filename);
        assert_eq!(photo.original_name, input.original_name);
        assert_eq!(photo.mime_type, input.mime_type);
        assert_eq!(photo.size, input.size);
        assert!(before <= photo.uploaded_at && photo.uploaded_at <= after);
    }

    #[test]
    fn ids_are_monotonic_and_unique() {
        let store = MemPhotoStore::new();
        let ids: Vec<i32> = (0..5)
            .map(|n| store.create(new_photo(n)).unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn list_all_is_empty_initially() {
        assert!(MemPhotoStore::new().list_all().unwrap().is_empty());
    }

    #[test]
    fn list_all_returns_every_record_newest_first() {
        let store = MemPhotoStore::new();
        for n in 0..10 {
            store.create(new_photo(n)).unwrap();
        }

        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 10);
        assert!(
            listed
                .windows(2)
                .all(|w| w[0].uploaded_at >= w[1].uploaded_at)
        );
        assert_eq!(listed.first().map(|p| p.id), Some(10));
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let at = Utc::now();
        let mut photos = vec![
            new_photo(1).into_photo(1, at),
            new_photo(2).into_photo(2, at),
            new_photo(3).into_photo(3, at - Duration::seconds(5)),
            new_photo(4).into_photo(4, at + Duration::seconds(5)),
        ];
        sort_newest_first(&mut photos);

        let ids: Vec<i32> = photos.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let store = std::sync::Arc::new(MemPhotoStore::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || store.create(new_photo(n)).unwrap().id)
            })
            .collect();

        let mut ids: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
        assert_eq!(store.list_all().unwrap().len(), 8);
    }
}
