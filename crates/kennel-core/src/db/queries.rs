use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};

use crate::db::schema::{self, Migration, MigrationStatus};
use crate::error::Result;
use crate::models::Dog;

/// Database wrapper with the dog queries and migration entry points.
pub struct Database {
    conn: Connection,
}

// Columns are unconstrained, so rows written outside this crate may hold any
// storage class. Unreadable values decode to `None` rather than failing the row.

fn loose_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

/// REAL is truncated and TEXT is parsed.
fn loose_integer(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) if f.is_finite() => Some(f.trunc() as i64),
        ValueRef::Text(t) => std::str::from_utf8(t).ok()?.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts integers (non-zero is true) and the `t`/`f`, `true`/`false`
/// spellings older Rails SQLite adapters wrote for boolean columns.
fn loose_bool(value: ValueRef<'_>) -> Option<bool> {
    match value {
        ValueRef::Integer(i) => Some(i != 0),
        ValueRef::Real(f) => Some(f != 0.0),
        ValueRef::Text(t) => match std::str::from_utf8(t).ok()?.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "1" | "yes" => Some(true),
            "f" | "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn dog_from_row(row: &Row<'_>) -> rusqlite::Result<Dog> {
    Ok(Dog {
        id: Some(row.get(0)?),
        name: loose_text(row.get_ref(1)?),
        breed: loose_text(row.get_ref(2)?),
        age: loose_integer(row.get_ref(3)?),
        is_good_boy: loose_bool(row.get_ref(4)?),
    })
}

impl Database {
    /// Open (or create) a SQLite database at the given path.
    /// Migrations are not applied; call [`Database::migrate`] for that.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database with all migrations applied (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // === Migrations ===

    pub fn migrate(&self) -> Result<Vec<&'static Migration>> {
        schema::migrate(&self.conn)
    }

    pub fn rollback(&self) -> Result<Option<&'static Migration>> {
        schema::rollback(&self.conn)
    }

    pub fn pending_migrations(&self) -> Result<Vec<&'static Migration>> {
        schema::pending(&self.conn)
    }

    pub fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        schema::status(&self.conn)
    }

    // === Dogs ===

    /// List every dog, in insertion order.
    pub fn list_dogs(&self) -> Result<Vec<Dog>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, breed, age, is_good_boy FROM dogs ORDER BY id")?;
        let dogs = stmt
            .query_map([], dog_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(dogs)
    }

    /// Get a dog by ID.
    pub fn get_dog(&self, id: i64) -> Result<Option<Dog>> {
        let result = self.conn.query_row(
            "SELECT id, name, breed, age, is_good_boy FROM dogs WHERE id = ?1",
            params![id],
            dog_from_row,
        );

        match result {
            Ok(d) => Ok(Some(d)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a dog and return its new ID. Any `id` already set on `dog` is ignored.
    pub fn insert_dog(&self, dog: &Dog) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO dogs (name, breed, age, is_good_boy) VALUES (?1, ?2, ?3, ?4)",
            params![dog.name, dog.breed, dog.age, dog.is_good_boy],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete a dog. Returns false if no row had that ID.
    pub fn delete_dog(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM dogs WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn count_dogs(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dogs", [], |row| row.get(0))?;
        Ok(count)
    }
}
