//! Status HTTP surface
//!
//! Liveness and counters only; the dialogue itself runs over the bot
//! transport.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::db::UserDatabase;
use crate::runtime::ProductionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ProductionManager>,
    pub db: UserDatabase,
}

impl AppState {
    pub fn new(manager: Arc<ProductionManager>, db: UserDatabase) -> Self {
        Self { manager, db }
    }
}
