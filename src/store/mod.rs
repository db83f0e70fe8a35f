//! In-memory entity store
//!
//! Authoritative holder of users, books, and loans. All collections live
//! behind a single lock so operations that touch more than one collection
//! (loan creation and return) are applied as one logical unit: no caller
//! can observe the availability counter and the loan record out of step.

pub mod books;
pub mod loans;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{Book, Loan, User};

/// Backing tables and identity counters
pub(crate) struct Tables {
    pub(crate) users: HashMap<i32, User>,
    pub(crate) books: HashMap<i32, Book>,
    pub(crate) loans: HashMap<i32, Loan>,
    next_user_id: i32,
    next_book_id: i32,
    next_loan_id: i32,
}

impl Tables {
    fn new() -> Self {
        Self {
            users: HashMap::new(),
            books: HashMap::new(),
            loans: HashMap::new(),
            next_user_id: 1,
            next_book_id: 1,
            next_loan_id: 1,
        }
    }

    // Identities are monotonically increasing and never reused within the
    // process lifetime, deletion does not recycle them.
    pub(crate) fn next_user_id(&mut self) -> i32 {
        let id = self.next_user_id;
        self.next_user_id += 1;
        id
    }

    pub(crate) fn next_book_id(&mut self) -> i32 {
        let id = self.next_book_id;
        self.next_book_id += 1;
        id
    }

    pub(crate) fn next_loan_id(&mut self) -> i32 {
        let id = self.next_loan_id;
        self.next_loan_id += 1;
        id
    }
}

/// Handle to the shared in-memory store
#[derive(Clone)]
pub struct Store {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::new())),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
