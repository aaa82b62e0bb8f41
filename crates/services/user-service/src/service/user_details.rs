//! Credential lookup for the authentication layer.

use async_trait::async_trait;

use super::user_service::UserManager;
use crate::infra::UnitOfWork;
use common::{AppError, AppResult};
use domain::UserDetails;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Loads the credential record for a username.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDetailsService: Send + Sync {
    /// Disabled accounts are returned as-is; callers check `enabled`.
    async fn load_user_by_username(&self, username: &str) -> AppResult<UserDetails>;
}

#[async_trait]
impl<U: UnitOfWork> UserDetailsService for UserManager<U> {
    async fn load_user_by_username(&self, username: &str) -> AppResult<UserDetails> {
        self.uow
            .users()
            .find_by_username(username)
            .await?
            .map(UserDetails::from)
            .ok_or_else(|| AppError::username_not_found(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryPersistence;
    use crate::mapper::{UserEditor, UserProjector};
    use crate::repository::InMemoryUserStore;
    use domain::{parse_authorities, Argon2PasswordEncoder, User};
    use std::sync::Arc;
    use uuid::Uuid;

    fn service_with(users: Vec<User>) -> UserManager<InMemoryPersistence> {
        let store = Arc::new(InMemoryUserStore::with_users(users));
        UserManager::new(
            Arc::new(InMemoryPersistence::with_store(store)),
            Arc::new(UserEditor),
            Arc::new(UserProjector),
            Arc::new(Argon2PasswordEncoder::new()),
        )
    }

    #[tokio::test]
    async fn test_unknown_username() {
        let service = service_with(vec![]);
        let err = service.load_user_by_username("ghost").await.unwrap_err();

        assert!(matches!(err, AppError::UsernameNotFound(ref name) if name == "ghost"));
        assert_eq!(err.to_string(), "User with username - ghost, not found");
    }

    #[tokio::test]
    async fn test_disabled_user_is_returned() {
        let mut user = User::new(
            Uuid::new_v4(),
            "bob".to_string(),
            "Bob".to_string(),
            parse_authorities(&["admin"]),
        );
        user.set_password_hash("hash".to_string());
        user.disable();
        let service = service_with(vec![user]);

        let details = service.load_user_by_username("bob").await.unwrap();
        assert_eq!(details.username, "bob");
        assert_eq!(details.password_hash, "hash");
        assert!(!details.is_enabled());
        assert!(details.has_authority("admin"));
    }
}
