use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use log::info;

use crate::error::StoreError;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Same DDL as `migrations/*_create_photos/up.sql`, so a fresh database works
/// without running the diesel CLI.
const CREATE_PHOTOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id SERIAL PRIMARY KEY,
    filename TEXT NOT NULL UNIQUE,
    original_name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size TEXT NOT NULL,
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Builds the connection pool. Fails if no connection can be established.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

pub fn get_db_conn(pool: &DbPool) -> Result<DbConn, StoreError> {
    Ok(pool.get()?)
}

/// Creates the `photos` table if it does not exist yet.
pub fn ensure_schema(pool: &DbPool) -> Result<(), StoreError> {
    let mut conn = get_db_conn(pool)?;

    diesel::sql_query(CREATE_PHOTOS_TABLE).execute(&mut conn)?;
    info!("photos table is ready");
    Ok(())
}
