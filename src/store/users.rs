//! User table operations

use crate::{
    error::{AppError, AppResult},
    models::user::{UpdateUser, User, UserRole},
};

use super::Store;

impl Store {
    /// Insert a new user, assigning its identity. The password is expected
    /// to be hashed already.
    pub async fn users_create(
        &self,
        username: String,
        password: String,
        name: String,
        email: String,
        role: UserRole,
    ) -> User {
        let mut tables = self.tables.write().await;
        let id = tables.next_user_id();
        let user = User {
            id,
            username,
            password,
            name,
            email,
            role,
        };
        tables.users.insert(id, user.clone());
        user
    }

    /// Get user by ID
    pub async fn users_get(&self, id: i32) -> AppResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username
    pub async fn users_get_by_username(&self, username: &str) -> Option<User> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned()
    }

    /// All users, ordered by identity
    pub async fn users_all(&self) -> Vec<User> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        users
    }

    /// All users with the student role
    pub async fn users_students(&self) -> Vec<User> {
        let tables = self.tables.read().await;
        let mut students: Vec<User> = tables
            .users
            .values()
            .filter(|user| user.role == UserRole::Student)
            .cloned()
            .collect();
        students.sort_by_key(|u| u.id);
        students
    }

    /// Apply a partial update and return the merged user. The password, when
    /// present, is expected to be hashed already.
    pub async fn users_update(
        &self,
        id: i32,
        changes: &UpdateUser,
        password: Option<String>,
    ) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        if let Some(ref username) = changes.username {
            user.username = username.clone();
        }
        if let Some(hashed) = password {
            user.password = hashed;
        }
        if let Some(ref name) = changes.name {
            user.name = name.clone();
        }
        if let Some(ref email) = changes.email {
            user.email = email.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }

        Ok(user.clone())
    }

    /// Remove a user, returning whether it existed. Loans referencing the
    /// user are left in place.
    pub async fn users_delete(&self, id: i32) -> bool {
        self.tables.write().await.users.remove(&id).is_some()
    }
}
