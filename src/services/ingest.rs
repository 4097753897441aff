use crate::db::models::Property;
use crate::schema;
use diesel::SqliteConnection;
use diesel::prelude::*;

// SQLite caps bind parameters per statement; chunking keeps each insert
// comfortably below that limit at ~15 columns per row.
const INSERT_CHUNK_SIZE: usize = 500;

/// Replace the stored listing set wholesale with `rows`, atomically.
pub fn replace_properties(conn: &mut SqliteConnection, rows: &[Property]) -> Result<usize, String> {
    use schema::properties::dsl as P;

    conn.transaction::<usize, diesel::result::Error, _>(|conn| {
        diesel::delete(P::properties).execute(conn)?;
        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            inserted += diesel::insert_into(P::properties).values(chunk).execute(conn)?;
        }
        Ok(inserted)
    })
    .map_err(|e| format!("replace properties failed: {}", e))
}

pub fn load_properties(conn: &mut SqliteConnection) -> Result<Vec<Property>, String> {
    use schema::properties::dsl as P;

    P::properties
        .order(P::property_id.asc())
        .load(conn)
        .map_err(|e| format!("load properties failed: {}", e))
}
