//! PostgreSQL user repository implementation
//!
//! Expects a `users` table with columns `id UUID PRIMARY KEY`,
//! `email TEXT NOT NULL UNIQUE`, `password_hash TEXT NOT NULL`,
//! `roles TEXT[] NOT NULL`, `enabled BOOLEAN NOT NULL`,
//! `created_at TIMESTAMPTZ NOT NULL` and `updated_at TIMESTAMPTZ NOT NULL`.
//! Email uniqueness is enforced by the UNIQUE constraint.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::user::{Role, User, UserId, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str =
    "id, email, password_hash, roles, enabled, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and wrap it in a repository
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, roles, enabled, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(roles_to_strings(user.roles()))
        .bind(user.is_enabled())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Email '{}' already exists", user.email()))
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, roles = $4, enabled = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(roles_to_strings(user.roles()))
        .bind(user.is_enabled())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Email '{}' already exists", user.email()))
            } else {
                DomainError::storage(format!("Failed to update user: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            )));
        }

        Ok(user.clone())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;
    let roles: Vec<String> = row
        .try_get("roles")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;
    let enabled: bool = row
        .try_get("enabled")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;

    Ok(User::restore(
        UserId::from_uuid(id),
        email,
        password_hash,
        strings_to_roles(&roles),
        enabled,
        created_at,
        updated_at,
    ))
}

fn roles_to_strings(roles: &BTreeSet<Role>) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

fn strings_to_roles(values: &[String]) -> BTreeSet<Role> {
    values
        .iter()
        .filter_map(|v| match v.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!(error = %e, "Ignoring unknown role stored in database");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        let roles: BTreeSet<Role> = [Role::Admin, Role::User].into_iter().collect();
        let strings = roles_to_strings(&roles);

        assert_eq!(strings, vec!["ROLE_USER".to_string(), "ROLE_ADMIN".to_string()]);
        assert_eq!(strings_to_roles(&strings), roles);
    }

    #[test]
    fn test_unknown_roles_are_dropped() {
        let stored = vec!["ROLE_ADMIN".to_string(), "ROLE_USERS".to_string()];
        let roles = strings_to_roles(&stored);

        assert_eq!(roles.len(), 1);
        assert!(roles.contains(&Role::Admin));
    }
}
