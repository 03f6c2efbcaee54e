//! User infrastructure module
//!
//! This module provides implementations for user account management,
//! including password hashing with Argon2, in-memory and PostgreSQL
//! repositories, lookup helpers, and the user service.

mod lookup;
mod password;
mod postgres_repository;
mod repository;
mod service;

pub use lookup::{UserKey, UserLookup};
pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{AdminUpdateRequest, RegisterUserRequest, UserPolicy, UserService};
