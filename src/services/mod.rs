//! Business logic services

pub mod auth;
pub mod catalog;
pub mod ledger;
pub mod repair;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub ledger: ledger::LedgerService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        let repair = repair::RepairEngine::new(repository.clone());
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone(), repair),
            ledger: ledger::LedgerService::new(repository),
        }
    }
}
