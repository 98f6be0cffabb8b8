use crate::database::{DbPool, get_db_conn};
use crate::error::StoreError;
use crate::models::photos::{NewPhoto, Photo};
use crate::schema::photos::dsl::*;
use diesel::prelude::*;

/// Inserts a new photo record and returns the stored row, including the
/// database-assigned `id` and `uploaded_at`.
pub fn insert_photo(pool: &DbPool, new: &NewPhoto) -> Result<Photo, StoreError> {
    let mut conn = get_db_conn(pool)?;

    let photo = diesel::insert_into(photos)
        .values(new)
        .returning(Photo::as_returning())
        .get_result(&mut conn)?;
    Ok(photo)
}

/// Loads all photo records, newest first. Equal timestamps fall back to the
/// higher id first.
pub fn load_all_photos(pool: &DbPool) -> Result<Vec<Photo>, StoreError> {
    let mut conn = get_db_conn(pool)?;

    let rows = photos
        .order((uploaded_at.desc(), id.desc()))
        .select(Photo::as_select())
        .load(&mut conn)?;
    Ok(rows)
}
