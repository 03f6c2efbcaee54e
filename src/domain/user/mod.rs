//! User domain
//!
//! This module provides domain types and traits for user accounts,
//! including the user entity, caller identity, validation, and the
//! repository trait.

mod caller;
mod entity;
mod repository;
mod validation;

pub use caller::CallerContext;
pub use entity::{Role, User, UserId, UserView};
pub use repository::UserRepository;
pub use validation::{
    normalize_email, validate_email, validate_password, validate_password_with,
    UserValidationError, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};

#[cfg(test)]
pub use repository::MockUserRepository;
