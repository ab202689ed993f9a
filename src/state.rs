use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::database::Database;
use crate::services::{CompanyService, JobService, UserService};

/// Shared application state handed to every handler and middleware
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        let tokens = TokenCodec::from_config(&config.security);
        Self {
            config: Arc::new(config),
            db,
            tokens: Arc::new(tokens),
        }
    }

    pub fn companies(&self) -> CompanyService {
        CompanyService::new(self.db.pool().clone())
    }

    pub fn jobs(&self) -> JobService {
        JobService::new(self.db.pool().clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.pool().clone())
    }
}
