use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

/// A stored photo. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::photos)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    /// Byte count of the stored file, kept as text.
    pub size: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A photo record before the store assigns `id` and `uploaded_at`.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::photos)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: String,
}

impl NewPhoto {
    pub fn into_photo(self, id: i32, uploaded_at: DateTime<Utc>) -> Photo {
        Photo {
            id,
            filename: self.filename,
            original_name: self.original_name,
            mime_type: self.mime_type,
            size: self.size,
            uploaded_at,
        }
    }
}
