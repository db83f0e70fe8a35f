//! Data models for Biblioteca

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanDetails, LoanStatus};
pub use user::{User, UserClaims, UserRole};
