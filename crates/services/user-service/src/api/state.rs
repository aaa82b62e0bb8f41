//! Application state shared by all handlers.

use std::sync::Arc;

use crate::infra::Database;
use crate::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    /// Present when backed by PostgreSQL, used by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserService>) -> Self {
        Self {
            user_service,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }
}
