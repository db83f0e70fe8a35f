//! Book model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Book catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    /// Number of physical copies owned by the library
    pub total_copies: i32,
    /// Number of copies currently not on loan
    pub available_copies: i32,
    /// Cover image path, as returned by the upload endpoint
    pub cover: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    #[validate(range(min = 1, message = "total_copies must be at least 1"))]
    pub total_copies: i32,
    /// Defaults to total_copies when omitted
    pub available_copies: Option<i32>,
    pub cover: Option<String>,
}

/// Update book request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    #[validate(range(min = 1, message = "total_copies must be at least 1"))]
    pub total_copies: Option<i32>,
    pub available_copies: Option<i32>,
    pub cover: Option<String>,
}
