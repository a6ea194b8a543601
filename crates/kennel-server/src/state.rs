use std::sync::{Arc, Mutex};

use kennel_core::Database;

use crate::views::Views;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub views: Views,
}

impl AppState {
    pub fn new(db: Database, views: Views) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            views,
        }
    }
}
