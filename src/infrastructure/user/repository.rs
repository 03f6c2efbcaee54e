//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository
///
/// Both maps sit behind one lock so the uniqueness check and the write
/// happen under the same guard.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    ///
    /// Later entries win when two users share an email; the earlier one is
    /// dropped so the email stays unique.
    pub fn with_users(users: Vec<User>) -> Self {
        let mut table = UserTable::default();

        for user in users {
            if let Some(previous) = table.email_index.insert(user.email().to_string(), *user.id()) {
                if previous != *user.id() {
                    table.users.remove(&previous);
                }
            }
            table.users.insert(*user.id(), user);
        }

        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.users.contains_key(user.id()) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if table.email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                user.email()
            )));
        }

        table.email_index.insert(user.email().to_string(), *user.id());
        table.users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let old_email = match table.users.get(user.id()) {
            Some(existing) => existing.email().to_string(),
            None => {
                return Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    user.id()
                )));
            }
        };

        // If email changed, check uniqueness and update index
        if old_email != user.email() {
            if table.email_index.contains_key(user.email()) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already exists",
                    user.email()
                )));
            }

            table.email_index.remove(&old_email);
            table.email_index.insert(user.email().to_string(), *user.id());
        }

        table.users.insert(*user.id(), user.clone());

        Ok(user.clone())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.len())
    }
}
