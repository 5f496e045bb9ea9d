//! User domain
//!
//! Domain types and the repository trait for user records, including the
//! soft-delete state carried by every stored row.

mod entity;
mod repository;

pub use entity::{DeletionState, NewUser, User, UserId};
pub use repository::UserRepository;

#[cfg(test)]
pub use repository::MockUserRepository;
