//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    store::Store,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Store,
}

impl CatalogService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// All books in the catalog
    pub async fn list_books(&self) -> Vec<Book> {
        self.store.books_all().await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.store.books_get(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.store.books_create(&book).await
    }

    /// Update an existing book. The store enforces the availability bounds
    /// against the merged state.
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.store.books_update(id, &book).await
    }

    /// Delete a book. Loans referencing the book are left in place; the
    /// surviving references are logged.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let open_loans = self
            .store
            .loans_by_book(id)
            .await
            .iter()
            .filter(|l| l.returned_date.is_none())
            .count();

        if !self.store.books_delete(id).await {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        if open_loans > 0 {
            tracing::warn!(book_id = id, open_loans, "deleted book still has open loans");
        }
        Ok(())
    }
}
