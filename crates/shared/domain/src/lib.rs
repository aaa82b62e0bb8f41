//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user entity, its request/view shapes, the credential record, and the
//! password encoder capability.

pub mod constants;
pub mod error;
pub mod pagination;
pub mod password;
pub mod user;
pub mod user_details;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use pagination::PaginationParams;
pub use password::{Argon2PasswordEncoder, PasswordEncoder};
pub use user::{
    join_authorities, parse_authorities, split_authorities, CreateUserRequest,
    SearchUsersRequest, UpdateUserRequest, User, UserRole, UserView,
};
pub use user_details::UserDetails;
