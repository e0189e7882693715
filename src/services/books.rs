//! Book registration service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDetails, RegisterBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new book. Validation runs before any write: an invalid
    /// request (blank ISBN/title, zero authors) never reaches the database.
    pub async fn register(&self, book: RegisterBook) -> AppResult<i64> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.create(&book).await
    }

    /// Update an existing book and its author links.
    pub async fn update(&self, li_cod: i64, book: RegisterBook) -> AppResult<()> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.update(li_cod, &book).await
    }

    /// Fetch a book with authors and copy count for edit hydration.
    pub async fn get(&self, li_cod: i64) -> AppResult<BookDetails> {
        self.repository.books.get(li_cod).await
    }
}
