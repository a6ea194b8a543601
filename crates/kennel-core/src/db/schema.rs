use rusqlite::{params, Connection};

use crate::error::{KennelError, Result};

/// A versioned schema change with its reversal.
#[derive(Debug, PartialEq, Eq)]
pub struct Migration {
    pub version: &'static str,
    pub name: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

/// A known migration and whether it has been applied to a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: &'static str,
    pub name: &'static str,
    pub applied: bool,
}

/// All migrations, oldest first.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: "20170612173622",
    name: "add_dogs_table",
    up: "
        CREATE TABLE dogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            breed TEXT,
            age INTEGER,
            is_good_boy BOOLEAN
        );
        ",
    down: "DROP TABLE dogs;",
}];

fn ensure_bookkeeping(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY NOT NULL
        );",
    )?;
    Ok(())
}

fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    ensure_bookkeeping(conn)?;
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(versions)
}

/// Migrations that have not been applied yet, oldest first.
pub fn pending(conn: &Connection) -> Result<Vec<&'static Migration>> {
    let applied = applied_versions(conn)?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|v| v == m.version))
        .collect())
}

/// Apply every pending migration. Each one runs in its own transaction together
/// with its `schema_migrations` row, so a failure leaves earlier ones in place.
pub fn migrate(conn: &Connection) -> Result<Vec<&'static Migration>> {
    let todo = pending(conn)?;
    for migration in &todo {
        log::info!("Applying migration {}_{}", migration.version, migration.name);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.up)?;
        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            params![migration.version],
        )?;
        tx.commit()?;
    }
    if todo.is_empty() {
        log::debug!("Schema is up to date");
    }
    Ok(todo)
}

/// Revert the most recently applied migration.
pub fn rollback(conn: &Connection) -> Result<Option<&'static Migration>> {
    let applied = applied_versions(conn)?;
    let Some(last) = applied.last() else {
        return Ok(None);
    };

    let migration = MIGRATIONS
        .iter()
        .find(|m| m.version == last.as_str())
        .ok_or_else(|| KennelError::Migration(format!("Unknown applied version '{}'", last)))?;

    log::info!("Reverting migration {}_{}", migration.version, migration.name);
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.down)?;
    tx.execute(
        "DELETE FROM schema_migrations WHERE version = ?1",
        params![migration.version],
    )?;
    tx.commit()?;
    Ok(Some(migration))
}

/// Every known migration with its applied state.
pub fn status(conn: &Connection) -> Result<Vec<MigrationStatus>> {
    let applied = applied_versions(conn)?;
    Ok(MIGRATIONS
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            name: m.name,
            applied: applied.iter().any(|v| v == m.version),
        })
        .collect())
}
