//! Service layer - business logic.

mod authenticator;
mod user_details;
mod user_service;

pub use authenticator::Authenticator;
pub use user_details::UserDetailsService;
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use user_details::MockUserDetailsService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
