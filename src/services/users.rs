//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserClaims, UserRole},
    store::Store,
};

#[derive(Clone)]
pub struct UsersService {
    store: Store,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(store: Store, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Authenticate by username and password, returning a JWT token and the
    /// user. Unknown usernames and wrong passwords produce the same message.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .store
            .users_get_by_username(username)
            .await
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password) {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Create JWT token for a user
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a plaintext password against the stored hash. Argon2
    /// verification is constant-time and fails closed.
    fn verify_password(&self, user: &User, password: &str) -> bool {
        match PasswordHash::new(&user.password) {
            Ok(parsed_hash) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Hash a password using Argon2 with a fresh random salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.store.users_get(id).await
    }

    /// All users
    pub async fn list_users(&self) -> Vec<User> {
        self.store.users_all().await
    }

    /// Users with the student role
    pub async fn list_students(&self) -> Vec<User> {
        self.store.users_students().await
    }

    /// Create a new user account
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.store.users_get_by_username(&user.username).await.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password = self.hash_password(&user.password)?;
        Ok(self
            .store
            .users_create(user.username, password, user.name, user.email, user.role)
            .await)
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Ensure the user exists before the uniqueness check
        self.store.users_get(id).await?;

        if let Some(ref username) = user.username {
            if let Some(existing) = self.store.users_get_by_username(username).await {
                if existing.id != id {
                    return Err(AppError::Conflict("Username already exists".to_string()));
                }
            }
        }

        let password = match user.password {
            Some(ref plaintext) => Some(self.hash_password(plaintext)?),
            None => None,
        };

        self.store.users_update(id, &user, password).await
    }

    /// Delete a user. Loans referencing the user are left in place; the
    /// surviving references are logged.
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        let open_loans = self
            .store
            .loans_by_user(id)
            .await
            .iter()
            .filter(|l| l.returned_date.is_none())
            .count();

        if !self.store.users_delete(id).await {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        if open_loans > 0 {
            tracing::warn!(user_id = id, open_loans, "deleted user still has open loans");
        }
        Ok(())
    }

    /// Ensure the bootstrap librarian account from configuration exists.
    /// Idempotent, called once at startup.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<User> {
        if let Some(existing) = self
            .store
            .users_get_by_username(&self.config.admin_username)
            .await
        {
            return Ok(existing);
        }

        let password = self.hash_password(&self.config.admin_password)?;
        let admin = self
            .store
            .users_create(
                self.config.admin_username.clone(),
                password,
                "Administrator".to_string(),
                format!("{}@biblioteca.local", self.config.admin_username),
                UserRole::Librarian,
            )
            .await;

        tracing::info!(username = %admin.username, "created bootstrap librarian account");
        Ok(admin)
    }
}
