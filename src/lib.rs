//! User account module
//!
//! Account lifecycle for an enclosing web application:
//! - Registration with email uniqueness and Argon2 password hashing
//! - Self-service email and password changes for the calling user
//! - Administrator updates of email, roles, enabled flag and password
//! - In-memory and PostgreSQL user stores

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;
pub use domain::{CallerContext, DomainError, Role, User, UserId, UserRepository, UserView};
pub use infrastructure::{
    AdminUpdateRequest, Argon2Hasher, InMemoryUserRepository, PasswordHasher,
    PostgresUserRepository, RegisterUserRequest, UserPolicy, UserService,
};
