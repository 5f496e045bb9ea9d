//! Domain layer - Core business entities and contracts

pub mod error;
pub mod user;

pub use error::{DomainError, OptionalExt};
pub use user::{DeletionState, NewUser, User, UserId, UserRepository};
