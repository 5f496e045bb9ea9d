//! User infrastructure module
//!
//! Password hashing with Argon2, the in-memory and PostgreSQL repositories,
//! and the user lifecycle service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, UpdateUserRequest, UserResponse, UserService};

#[cfg(test)]
pub use password::MockPasswordHasher;
