//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::Utc;

use biblioteca_server::{
    config::{AuthConfig, LoansConfig, UploadsConfig},
    models::book::{Book, CreateBook},
    models::user::{CreateUser, User, UserClaims, UserRole},
    services::Services,
    store::Store,
};

/// Services wired to a fresh, empty in-memory store
pub fn test_services() -> Services {
    let auth = AuthConfig {
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        admin_username: "admin".to_string(),
        admin_password: "admin123".to_string(),
    };
    Services::new(
        Store::new(),
        auth,
        LoansConfig { period_days: 30 },
        UploadsConfig {
            dir: "target/test-uploads".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
        },
    )
}

pub fn claims_for(user: &User) -> UserClaims {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: user.username.clone(),
        user_id: user.id,
        role: user.role,
        exp: now + 3600,
        iat: now,
    }
}

pub async fn create_librarian(services: &Services, username: &str) -> User {
    services
        .users
        .create_user(CreateUser {
            username: username.to_string(),
            password: "password".to_string(),
            name: "Test Librarian".to_string(),
            email: format!("{}@library.test", username),
            role: UserRole::Librarian,
        })
        .await
        .expect("failed to create librarian")
}

pub async fn create_student(services: &Services, username: &str) -> User {
    services
        .users
        .create_user(CreateUser {
            username: username.to_string(),
            password: "password".to_string(),
            name: "Test Student".to_string(),
            email: format!("{}@students.test", username),
            role: UserRole::Student,
        })
        .await
        .expect("failed to create student")
}

pub async fn create_book(services: &Services, title: &str, total: i32, available: i32) -> Book {
    services
        .catalog
        .create_book(CreateBook {
            title: title.to_string(),
            author: "Test Author".to_string(),
            category: "Fiction".to_string(),
            description: None,
            publication_year: Some(1984),
            total_copies: total,
            available_copies: Some(available),
            cover: None,
        })
        .await
        .expect("failed to create book")
}
