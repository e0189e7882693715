//! Business logic services

pub mod auth;
pub mod books;
pub mod dataset;
pub mod requisitions;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub dataset: dataset::DatasetService,
    pub books: books::BooksService,
    pub requisitions: requisitions::RequisitionsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(auth_config),
            dataset: dataset::DatasetService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            requisitions: requisitions::RequisitionsService::new(repository),
        }
    }
}
