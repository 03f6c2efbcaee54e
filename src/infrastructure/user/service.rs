//! User service for registration, profile management and administration

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::UsersConfig;
use crate::domain::user::{
    normalize_email, validate_email, validate_password_with, CallerContext, Role, User, UserId,
    UserRepository, UserValidationError, UserView, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
use crate::domain::DomainError;

use super::lookup::UserLookup;
use super::password::PasswordHasher;

/// Rules applied when accounts are created
#[derive(Debug, Clone, PartialEq)]
pub struct UserPolicy {
    /// Roles granted to newly registered users
    pub default_roles: BTreeSet<Role>,
    pub min_password_length: usize,
    pub max_password_length: usize,
}

impl Default for UserPolicy {
    fn default() -> Self {
        Self {
            default_roles: [Role::User].into_iter().collect(),
            min_password_length: MIN_PASSWORD_LENGTH,
            max_password_length: MAX_PASSWORD_LENGTH,
        }
    }
}

impl From<&UsersConfig> for UserPolicy {
    fn from(config: &UsersConfig) -> Self {
        Self {
            default_roles: config.default_roles.iter().copied().collect(),
            min_password_length: config.min_password_length,
            max_password_length: config.max_password_length,
        }
    }
}

/// Request for registering a new user
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
}

impl RegisterUserRequest {
    /// Check the email format and the password policy
    pub fn validate(&self, policy: &UserPolicy) -> Result<(), UserValidationError> {
        validate_email(&self.email)?;
        validate_password_with(
            &self.password,
            policy.min_password_length,
            policy.max_password_length,
        )
    }
}

/// Request for an administrator updating any user
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUpdateRequest {
    pub email: String,
    pub roles: BTreeSet<Role>,
    pub enabled: bool,
}

/// User service for account lifecycle and administration
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    lookup: UserLookup<R>,
    policy: UserPolicy,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service with the default policy
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self::with_policy(repository, hasher, UserPolicy::default())
    }

    pub fn with_policy(repository: Arc<R>, hasher: Arc<H>, policy: UserPolicy) -> Self {
        let lookup = UserLookup::new(Arc::clone(&repository));

        Self {
            repository,
            hasher,
            lookup,
            policy,
        }
    }

    pub fn lookup(&self) -> &UserLookup<R> {
        &self.lookup
    }

    pub fn policy(&self) -> &UserPolicy {
        &self.policy
    }

    /// Validate a registration request and create the account
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        request
            .validate(&self.policy)
            .map_err(|e| DomainError::invalid_parameter(e.to_string()))?;

        self.create(&request.email, &request.password).await
    }

    /// Create a new enabled user with the default roles
    pub async fn create(&self, email: &str, raw_password: &str) -> Result<User, DomainError> {
        let email = normalize_email(email);

        if raw_password.is_empty() {
            return Err(DomainError::invalid_parameter("Password cannot be empty"));
        }

        if self.lookup.email_in_use(&email, None).await? {
            return Err(email_taken(&email));
        }

        let password_hash = self.hasher.hash(raw_password)?;
        let user = User::new(&email, password_hash, self.policy.default_roles.iter().copied());

        let user = self
            .repository
            .create(user)
            .await
            .map_err(|e| conflict_to_already_exists(e, &email))?;

        info!(user_id = %user.id(), email = %user.email(), "User created");

        Ok(user)
    }

    /// Change the caller's own email
    ///
    /// Submitting the current email is a successful no-op.
    pub async fn update_self(
        &self,
        caller: &CallerContext,
        new_email: &str,
    ) -> Result<User, DomainError> {
        let mut user = self.lookup.find_current(caller).await?;
        let new_email = normalize_email(new_email);

        if user.email() == new_email {
            debug!(user_id = %user.id(), "Email unchanged, skipping update");
            return Ok(user);
        }

        if self.lookup.email_in_use(&new_email, Some(user.id())).await? {
            return Err(email_taken(&new_email));
        }

        user.set_email(&new_email);

        let user = self
            .repository
            .update(&user)
            .await
            .map_err(|e| conflict_to_already_exists(e, &new_email))?;

        info!(user_id = %user.id(), email = %user.email(), "User updated own email");

        Ok(user)
    }

    /// Update any user as an administrator
    ///
    /// Roles and the enabled flag are always overwritten; the email is only
    /// checked for uniqueness when it changes.
    pub async fn update_admin(
        &self,
        id: &UserId,
        request: AdminUpdateRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.lookup.get(id).await?;
        let new_email = normalize_email(&request.email);

        if user.email() != new_email {
            if self.lookup.email_in_use(&new_email, Some(user.id())).await? {
                return Err(email_taken(&new_email));
            }

            user.set_email(&new_email);
        }

        user.set_roles(request.roles);
        user.set_enabled(request.enabled);

        let user = self
            .repository
            .update(&user)
            .await
            .map_err(|e| conflict_to_already_exists(e, &new_email))?;

        info!(
            user_id = %user.id(),
            email = %user.email(),
            enabled = user.is_enabled(),
            roles = ?user.roles(),
            "User updated by administrator"
        );

        Ok(user)
    }

    /// Change the caller's own password
    ///
    /// The new password must differ from the old one and satisfy the policy;
    /// both are checked before the caller is resolved.
    pub async fn change_password_self(
        &self,
        caller: &CallerContext,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        if old_password == new_password {
            return Err(DomainError::invalid_parameter(
                "New password must differ from the current password",
            ));
        }

        self.check_new_password(new_password)?;

        let mut user = self.lookup.find_current(caller).await?;

        if !self.hasher.verify(old_password, user.password_hash()) {
            warn!(user_id = %user.id(), "Password change rejected: incorrect current password");
            return Err(DomainError::invalid_parameter("Current password is incorrect"));
        }

        let new_hash = self.hasher.hash(new_password)?;
        user.set_password_hash(new_hash);

        self.repository.update(&user).await?;

        info!(user_id = %user.id(), "User changed own password");

        Ok(())
    }

    /// Set any user's password as an administrator, without verifying the old one
    pub async fn change_password_admin(
        &self,
        id: &UserId,
        new_password: &str,
    ) -> Result<(), DomainError> {
        self.check_new_password(new_password)?;

        let mut user = self.lookup.get(id).await?;

        let new_hash = self.hasher.hash(new_password)?;
        user.set_password_hash(new_hash);

        self.repository.update(&user).await?;

        info!(user_id = %user.id(), "Password reset by administrator");

        Ok(())
    }

    fn check_new_password(&self, password: &str) -> Result<(), DomainError> {
        validate_password_with(
            password,
            self.policy.min_password_length,
            self.policy.max_password_length,
        )
        .map_err(|e| DomainError::invalid_parameter(e.to_string()))
    }

    /// List all users
    pub async fn get_all(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// List all users without credential material
    pub async fn get_all_views(&self) -> Result<Vec<UserView>, DomainError> {
        Ok(self
            .repository
            .list()
            .await?
            .into_iter()
            .map(UserView::from)
            .collect())
    }

    /// The user behind the caller context
    pub async fn get_current(&self, caller: &CallerContext) -> Result<User, DomainError> {
        self.lookup.find_current(caller).await
    }

    /// Get a user by ID
    pub async fn get(&self, id: &UserId) -> Result<User, DomainError> {
        self.lookup.get(id).await
    }
}

fn email_taken(email: &str) -> DomainError {
    DomainError::already_exists(format!("Email '{}' is already in use", email))
}

/// The store reports a lost uniqueness race as Conflict
fn conflict_to_already_exists(error: DomainError, email: &str) -> DomainError {
    match error {
        DomainError::Conflict { .. } => email_taken(email),
        other => other,
    }
}
