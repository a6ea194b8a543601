pub mod queries;
pub mod schema;

pub use queries::Database;
pub use schema::{Migration, MigrationStatus, MIGRATIONS};
