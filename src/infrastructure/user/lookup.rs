//! User lookup helpers shared by the user service

use std::sync::Arc;

use tracing::debug;

use crate::domain::user::{normalize_email, CallerContext, User, UserId, UserRepository};
use crate::domain::DomainError;

/// Identifier accepted by [`UserLookup::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(UserId),
    Email(String),
}

impl From<UserId> for UserKey {
    fn from(id: UserId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for UserKey {
    /// Parses as an ID when possible, otherwise treats the value as an email
    fn from(value: &str) -> Self {
        match value.parse::<UserId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Email(value.to_string()),
        }
    }
}

/// Resolves users by ID, email or caller identity
#[derive(Debug)]
pub struct UserLookup<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserLookup<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserLookup<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a user by ID, failing with NotFound when absent
    pub async fn get(&self, id: &UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    /// Get a user by email, failing with NotFound when absent
    pub async fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let email = normalize_email(email);

        self.repository
            .get_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", email)))
    }

    /// Get a user by either kind of identifier
    pub async fn resolve(&self, key: &UserKey) -> Result<User, DomainError> {
        match key {
            UserKey::Id(id) => self.get(id).await,
            UserKey::Email(email) => self.get_by_email(email).await,
        }
    }

    /// Whether any user other than `excluding` already holds this email
    pub async fn email_in_use(
        &self,
        email: &str,
        excluding: Option<&UserId>,
    ) -> Result<bool, DomainError> {
        let email = normalize_email(email);

        match self.repository.get_by_email(&email).await? {
            Some(holder) => Ok(excluding != Some(holder.id())),
            None => Ok(false),
        }
    }

    /// Resolve the user behind the caller context
    ///
    /// Fails with Unauthenticated when the caller is anonymous or its
    /// principal no longer matches a stored user.
    pub async fn find_current(&self, caller: &CallerContext) -> Result<User, DomainError> {
        let principal = caller
            .principal()
            .ok_or_else(|| DomainError::unauthenticated("No authenticated caller"))?;

        match self.repository.get_by_email(principal).await? {
            Some(user) => Ok(user),
            None => {
                debug!(email = %principal, "Caller principal does not match a user");
                Err(DomainError::unauthenticated(format!(
                    "Caller '{}' is not a known user",
                    principal
                )))
            }
        }
    }
}
