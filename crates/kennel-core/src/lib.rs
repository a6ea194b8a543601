pub mod db;
pub mod error;
pub mod models;

pub use db::{Database, Migration, MigrationStatus, MIGRATIONS};
pub use error::{KennelError, Result};
pub use models::Dog;
