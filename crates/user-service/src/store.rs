//! User Store
//!
//! Storage trait for registered users with an in-memory implementation.
//! The email column is unique; attempting to register a taken address is a
//! conflict error surfaced to the caller.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Result, UserError};
use crate::user::{NewUser, User, UserId};

/// User store trait for persistence
pub trait UserStore: Send + Sync {
    /// Validate and persist a registration, returning the stored record
    fn create(&self, new_user: NewUser) -> Result<User>;

    /// Fetch a user by ID
    fn get(&self, id: &UserId) -> Result<Option<User>>;

    /// Fetch a user by email
    fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users, newest first
    fn list(&self, limit: usize) -> Result<Vec<User>>;
}

/// In-memory user store (for development/testing)
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl UserStore for MemoryUserStore {
    fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        let mut users = self.users.write().unwrap();

        if users.values().any(|u| u.email == new_user.email) {
            return Err(UserError::EmailTaken(new_user.email));
        }

        let user = new_user.into_user();
        tracing::info!(user_id = %user.id, "User registered");
        users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    fn get(&self, id: &UserId) -> Result<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users.get(id).cloned())
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<User>> {
        let users = self.users.read().unwrap();
        let mut result: Vec<_> = users.values().cloned().collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);

        Ok(result)
    }
}
