//! Conversions between request/view shapes and the user entity.

mod edit;
mod view;

pub use edit::{UserEditMapper, UserEditor};
pub use view::{UserProjector, UserViewMapper};

#[cfg(any(test, feature = "test-utils"))]
pub use edit::MockUserEditMapper;
#[cfg(any(test, feature = "test-utils"))]
pub use view::MockUserViewMapper;
