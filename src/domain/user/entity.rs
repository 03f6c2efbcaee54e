//! User entity and related types

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{normalize_email, UserValidationError};

/// User identifier - a random UUID assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId(s.to_string()))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Self::User),
            "ROLE_ADMIN" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    id: UserId,
    /// Login principal, stored normalised
    email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    /// Granted roles
    roles: BTreeSet<Role>,
    /// Whether the account may be used
    enabled: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, enabled user with a fresh identifier
    pub fn new(
        email: impl AsRef<str>,
        password_hash: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::generate(),
            email: normalize_email(email.as_ref()),
            password_hash: password_hash.into(),
            roles: roles.into_iter().collect(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from persisted fields
    ///
    /// The email is normalised like on every other entry point.
    pub fn restore(
        id: UserId,
        email: String,
        password_hash: String,
        roles: BTreeSet<Role>,
        enabled: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: normalize_email(&email),
            password_hash,
            roles,
            enabled,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    pub fn set_email(&mut self, email: impl AsRef<str>) {
        self.email = normalize_email(email.as_ref());
        self.touch();
    }

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    /// Replace the granted roles wholesale
    pub fn set_roles(&mut self, roles: impl IntoIterator<Item = Role>) {
        self.roles = roles.into_iter().collect();
        self.touch();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Listing projection of a user, without credential material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub roles: BTreeSet<Role>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
            enabled: user.enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            roles: user.roles,
            enabled: user.enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(email: &str) -> User {
        User::new(email, "hashed_password", [Role::User])
    }

    #[test]
    fn test_user_id_parse() {
        let id = UserId::generate();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_user_id_invalid() {
        assert!("".parse::<UserId>().is_err());
        assert!("befa7c20".parse::<UserId>().is_err());
        assert!("befa7c20-20ae-42dd-ad1f-b061cce7ad85".parse::<UserId>().is_ok());
    }

    #[test]
    fn test_role_strings() {
        assert_eq!(Role::User.as_str(), "ROLE_USER");
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(
            "ROLE_ROOT".parse::<Role>(),
            Err(UserValidationError::UnknownRole("ROLE_ROOT".to_string()))
        );
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user("Someone@Example.com ");

        assert_eq!(user.email(), "someone@example.com");
        assert_eq!(user.password_hash(), "hashed_password");
        assert!(user.is_enabled());
        assert!(user.has_role(Role::User));
        assert!(!user.has_role(Role::Admin));
    }

    #[test]
    fn test_restore_normalises_email() {
        let now = Utc::now();
        let id = UserId::generate();
        let user = User::restore(
            id,
            " Mixed@Example.COM".to_string(),
            "hashed_password".to_string(),
            [Role::Admin].into_iter().collect(),
            false,
            now,
            now,
        );

        assert_eq!(*user.id(), id);
        assert_eq!(user.email(), "mixed@example.com");
        assert!(!user.is_enabled());
        assert_eq!(user.updated_at(), now);
    }

    #[test]
    fn test_fresh_ids_differ() {
        let a = create_test_user("a@example.com");
        let b = create_test_user("a@example.com");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_user_mutators_touch() {
        let mut user = create_test_user("a@example.com");
        let original_updated = user.updated_at();

        // Small delay to ensure timestamp differs
        std::thread::sleep(std::time::Duration::from_millis(10));

        user.set_enabled(false);
        assert!(!user.is_enabled());
        assert!(user.updated_at() > original_updated);
    }

    #[test]
    fn test_set_roles_replaces() {
        let mut user = create_test_user("a@example.com");

        user.set_roles([Role::Admin]);
        assert_eq!(user.roles().len(), 1);
        assert!(user.has_role(Role::Admin));

        user.set_roles([]);
        assert!(user.roles().is_empty());
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = create_test_user("a@example.com");

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("ROLE_USER"));
    }

    #[test]
    fn test_view_projection() {
        let user = create_test_user("a@example.com");
        let view = UserView::from(&user);

        assert_eq!(view.id, *user.id());
        assert_eq!(view.email, "a@example.com");
        assert!(view.enabled);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("hashed_password"));
    }
}
