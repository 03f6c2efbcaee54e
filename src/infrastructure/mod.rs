//! Infrastructure layer - storage, hashing, logging and the user service

pub mod logging;
pub mod user;

pub use logging::init_logging;
pub use user::{
    AdminUpdateRequest, Argon2Hasher, InMemoryUserRepository, PasswordHasher,
    PostgresUserRepository, RegisterUserRequest, UserKey, UserLookup, UserPolicy, UserService,
};
