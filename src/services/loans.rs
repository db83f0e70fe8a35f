//! Loan lifecycle service
//!
//! Enforces the loan state machine:
//!
//! ```text
//! pending --approve--> approved --return--> returned
//! approved --return--> returned
//! ```
//!
//! Librarian-created loans start in approved, bypassing pending. Returned
//! is terminal.

use chrono::{Duration, Utc};

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, LoanStatus},
    models::user::UserClaims,
    store::Store,
};

#[derive(Clone)]
pub struct LoansService {
    store: Store,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(store: Store, config: LoansConfig) -> Self {
        Self { store, config }
    }

    /// Create a loan on behalf of the authenticated caller. Students may
    /// only request loans for themselves and start in pending; librarians
    /// may create loans for anyone, starting in approved.
    pub async fn create_loan(&self, claims: &UserClaims, request: CreateLoan) -> AppResult<Loan> {
        if !claims.is_librarian() && request.user_id != claims.user_id {
            return Err(AppError::Authorization(
                "Loans can only be requested for your own account".to_string(),
            ));
        }

        // Referential check on the user; the book is checked inside the
        // store's critical section together with availability.
        self.store.users_get(request.user_id).await?;

        let status = if claims.is_librarian() {
            LoanStatus::Approved
        } else {
            LoanStatus::Pending
        };

        let now = Utc::now();
        let due_date = now + Duration::days(self.config.period_days);

        self.store
            .loans_create(request.user_id, request.book_id, status, now, due_date)
            .await
    }

    /// Approve a pending loan
    pub async fn approve_loan(&self, id: i32) -> AppResult<Loan> {
        self.store.loans_approve(id).await
    }

    /// Return a loan, handing the copy back to the book
    pub async fn return_loan(&self, id: i32) -> AppResult<Loan> {
        self.store.loans_return(id, Utc::now()).await
    }

    /// All loans, with the derived overdue flag
    pub async fn list_all(&self) -> Vec<LoanDetails> {
        let now = Utc::now();
        self.store
            .loans_all()
            .await
            .into_iter()
            .map(|loan| LoanDetails::from_loan(loan, now))
            .collect()
    }

    /// Loans for one user, with the derived overdue flag
    pub async fn list_for_user(&self, user_id: i32) -> Vec<LoanDetails> {
        let now = Utc::now();
        self.store
            .loans_by_user(user_id)
            .await
            .into_iter()
            .map(|loan| LoanDetails::from_loan(loan, now))
            .collect()
    }

    /// Loans not yet returned, with the derived overdue flag
    pub async fn list_active(&self) -> Vec<LoanDetails> {
        let now = Utc::now();
        self.store
            .loans_active()
            .await
            .into_iter()
            .map(|loan| LoanDetails::from_loan(loan, now))
            .collect()
    }
}
