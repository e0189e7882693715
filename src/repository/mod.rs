//! Repository layer for database operations

pub mod books;
pub mod dataset;
pub mod lookups;
pub mod requisitions;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub dataset: dataset::DatasetRepository,
    pub lookups: lookups::LookupsRepository,
    pub books: books::BooksRepository,
    pub requisitions: requisitions::RequisitionsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            dataset: dataset::DatasetRepository::new(pool.clone()),
            lookups: lookups::LookupsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            requisitions: requisitions::RequisitionsRepository::new(pool.clone()),
            pool,
        }
    }
}
