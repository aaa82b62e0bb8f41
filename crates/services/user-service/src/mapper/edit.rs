//! Request to entity mapping for create and update.

use uuid::Uuid;

use domain::{parse_authorities, CreateUserRequest, UpdateUserRequest, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Builds and mutates user entities from edit requests.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait UserEditMapper: Send + Sync {
    /// New enabled entity with a fresh id and an empty password hash
    fn create(&self, request: &CreateUserRequest) -> User;

    /// Apply every `Some` field of the request in place. The entity is
    /// marked modified even when the request carries no fields.
    fn update(&self, request: &UpdateUserRequest, user: &mut User);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserEditor;

impl UserEditMapper for UserEditor {
    fn create(&self, request: &CreateUserRequest) -> User {
        User::new(
            Uuid::new_v4(),
            request.username.clone(),
            request.full_name.clone(),
            parse_authorities(&request.authorities),
        )
    }

    fn update(&self, request: &UpdateUserRequest, user: &mut User) {
        if let Some(full_name) = &request.full_name {
            user.update_full_name(full_name.clone());
        }
        if let Some(authorities) = &request.authorities {
            user.update_authorities(parse_authorities(authorities));
        }
        // An empty update still counts as a write
        user.touch();
    }
}
