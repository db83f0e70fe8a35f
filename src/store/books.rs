//! Book table operations

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::Store;

fn check_availability_bounds(available: i32, total: i32) -> AppResult<()> {
    if available < 0 || available > total {
        return Err(AppError::Validation(format!(
            "available_copies must be between 0 and total_copies ({} given, {} total)",
            available, total
        )));
    }
    Ok(())
}

impl Store {
    /// Insert a new book, assigning its identity. When available_copies is
    /// omitted it defaults to total_copies.
    pub async fn books_create(&self, book: &CreateBook) -> AppResult<Book> {
        let available = book.available_copies.unwrap_or(book.total_copies);
        check_availability_bounds(available, book.total_copies)?;

        let mut tables = self.tables.write().await;
        let id = tables.next_book_id();
        let book = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            description: book.description.clone(),
            publication_year: book.publication_year,
            total_copies: book.total_copies,
            available_copies: available,
            cover: book.cover.clone(),
        };
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    /// Get book by ID
    pub async fn books_get(&self, id: i32) -> AppResult<Book> {
        self.tables
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by title
    pub async fn books_get_by_title(&self, title: &str) -> Option<Book> {
        self.tables
            .read()
            .await
            .books
            .values()
            .find(|book| book.title == title)
            .cloned()
    }

    /// All books, ordered by identity
    pub async fn books_all(&self) -> Vec<Book> {
        let tables = self.tables.read().await;
        let mut books: Vec<Book> = tables.books.values().cloned().collect();
        books.sort_by_key(|b| b.id);
        books
    }

    /// Apply a partial update and return the merged book. The availability
    /// bounds are checked against the merged state.
    pub async fn books_update(&self, id: i32, changes: &UpdateBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        let book = tables
            .books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let mut merged = book.clone();
        if let Some(ref title) = changes.title {
            merged.title = title.clone();
        }
        if let Some(ref author) = changes.author {
            merged.author = author.clone();
        }
        if let Some(ref category) = changes.category {
            merged.category = category.clone();
        }
        if let Some(ref description) = changes.description {
            merged.description = Some(description.clone());
        }
        if let Some(year) = changes.publication_year {
            merged.publication_year = Some(year);
        }
        if let Some(total) = changes.total_copies {
            merged.total_copies = total;
        }
        if let Some(available) = changes.available_copies {
            merged.available_copies = available;
        }
        check_availability_bounds(merged.available_copies, merged.total_copies)?;

        *book = merged.clone();
        Ok(merged)
    }

    /// Remove a book, returning whether it existed. Loans referencing the
    /// book are left in place.
    pub async fn books_delete(&self, id: i32) -> bool {
        self.tables.write().await.books.remove(&id).is_some()
    }
}
