//! Loan table operations
//!
//! Loan creation and return each pair a loan mutation with a book
//! availability mutation. Both run under one write lock acquisition so the
//! pair is observed as a single logical unit.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanStatus},
};

use super::Store;

impl Store {
    /// Create a loan against an available book, decrementing the book's
    /// available count in the same critical section.
    pub async fn loans_create(
        &self,
        user_id: i32,
        book_id: i32,
        status: LoanStatus,
        loan_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let mut tables = self.tables.write().await;

        let book = tables
            .books
            .get_mut(&book_id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;
        if book.available_copies <= 0 {
            return Err(AppError::Unavailable(format!(
                "No copies of \"{}\" available for loan",
                book.title
            )));
        }
        book.available_copies -= 1;

        let id = tables.next_loan_id();
        let loan = Loan {
            id,
            user_id,
            book_id,
            loan_date,
            due_date,
            returned_date: None,
            status,
        };
        tables.loans.insert(id, loan.clone());
        Ok(loan)
    }

    /// Get loan by ID
    pub async fn loans_get(&self, id: i32) -> AppResult<Loan> {
        self.tables
            .read()
            .await
            .loans
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// All loans, ordered by identity
    pub async fn loans_all(&self) -> Vec<Loan> {
        let tables = self.tables.read().await;
        let mut loans: Vec<Loan> = tables.loans.values().cloned().collect();
        loans.sort_by_key(|l| l.id);
        loans
    }

    /// Loans belonging to a user
    pub async fn loans_by_user(&self, user_id: i32) -> Vec<Loan> {
        let tables = self.tables.read().await;
        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.id);
        loans
    }

    /// Loans against a book
    pub async fn loans_by_book(&self, book_id: i32) -> Vec<Loan> {
        let tables = self.tables.read().await;
        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|loan| loan.book_id == book_id)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.id);
        loans
    }

    /// Loans not yet returned (pending or approved)
    pub async fn loans_active(&self) -> Vec<Loan> {
        let tables = self.tables.read().await;
        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|loan| loan.status != LoanStatus::Returned)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.id);
        loans
    }

    /// Transition a pending loan to approved. The availability count was
    /// already decremented at creation, so there is no counter side effect.
    pub async fn loans_approve(&self, id: i32) -> AppResult<Loan> {
        let mut tables = self.tables.write().await;
        let loan = tables
            .loans
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.status != LoanStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Loan {} is {}, only pending loans can be approved",
                id, loan.status
            )));
        }

        loan.status = LoanStatus::Approved;
        Ok(loan.clone())
    }

    /// Mark a loan returned and hand the copy back to the book, in the same
    /// critical section. Returned is terminal.
    pub async fn loans_return(&self, id: i32, now: DateTime<Utc>) -> AppResult<Loan> {
        let mut tables = self.tables.write().await;
        let loan = tables
            .loans
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.status == LoanStatus::Returned {
            return Err(AppError::InvalidState(format!(
                "Loan {} has already been returned",
                id
            )));
        }

        loan.status = LoanStatus::Returned;
        loan.returned_date = Some(now);
        let loan = loan.clone();

        match tables.books.get_mut(&loan.book_id) {
            Some(book) => {
                book.available_copies = (book.available_copies + 1).min(book.total_copies);
            }
            None => {
                // Book deletion does not cascade, the reference can dangle
                tracing::warn!(
                    loan_id = loan.id,
                    book_id = loan.book_id,
                    "returned loan references a deleted book"
                );
            }
        }

        Ok(loan)
    }
}
