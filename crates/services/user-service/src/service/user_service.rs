//! User service - account management use cases.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::infra::UnitOfWork;
use crate::mapper::{UserEditMapper, UserViewMapper};
use crate::with_transaction;
use common::AppResult;
use domain::{CreateUserRequest, PasswordEncoder, SearchUsersRequest, UpdateUserRequest, UserView};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
///
/// Deleted users stay visible to every read; `enabled` tells them apart.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create an account. The password confirmation must match exactly.
    async fn create(&self, request: CreateUserRequest) -> AppResult<UserView>;

    /// Update profile fields. Username and password are untouched.
    async fn update(&self, id: Uuid, request: UpdateUserRequest) -> AppResult<UserView>;

    /// Soft delete: the account is disabled and kept
    async fn delete(&self, id: Uuid) -> AppResult<UserView>;

    /// Whether any account, disabled ones included, owns the username
    async fn username_exists(&self, username: &str) -> AppResult<bool>;

    async fn get_user(&self, id: Uuid) -> AppResult<UserView>;

    async fn search_users(&self, request: SearchUsersRequest) -> AppResult<Vec<UserView>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    pub(crate) uow: Arc<U>,
    edit_mapper: Arc<dyn UserEditMapper>,
    view_mapper: Arc<dyn UserViewMapper>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(
        uow: Arc<U>,
        edit_mapper: Arc<dyn UserEditMapper>,
        view_mapper: Arc<dyn UserViewMapper>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> Self {
        Self {
            uow,
            edit_mapper,
            view_mapper,
            encoder,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn create(&self, request: CreateUserRequest) -> AppResult<UserView> {
        request.check_passwords()?;

        let edit_mapper = self.edit_mapper.clone();
        let encoder = self.encoder.clone();

        let user = with_transaction!(self.uow, |ctx| {
            let mut user = edit_mapper.create(&request);
            user.set_password_hash(encoder.encode(&request.password)?);
            ctx.users().save(user).await
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(self.view_mapper.to_user_view(&user))
    }

    async fn update(&self, id: Uuid, request: UpdateUserRequest) -> AppResult<UserView> {
        let edit_mapper = self.edit_mapper.clone();

        let user = with_transaction!(self.uow, |ctx| {
            let users = ctx.users();
            let mut user = users.get_by_id(id).await?;
            edit_mapper.update(&request, &mut user);
            users.save(user).await
        })?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(self.view_mapper.to_user_view(&user))
    }

    async fn delete(&self, id: Uuid) -> AppResult<UserView> {
        let user = with_transaction!(self.uow, |ctx| {
            let users = ctx.users();
            let mut user = users.get_by_id(id).await?;
            user.disable();
            users.save(user).await
        })?;

        tracing::info!(user_id = %user.id, "User disabled");
        Ok(self.view_mapper.to_user_view(&user))
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let found = self.uow.users().find_by_username(username).await?;
        Ok(found.is_some())
    }

    async fn get_user(&self, id: Uuid) -> AppResult<UserView> {
        let user = self.uow.users().get_by_id(id).await?;
        Ok(self.view_mapper.to_user_view(&user))
    }

    async fn search_users(&self, request: SearchUsersRequest) -> AppResult<Vec<UserView>> {
        let users = self.uow.users().search_users(&request).await?;
        tracing::debug!(count = users.len(), "User search");
        Ok(self.view_mapper.to_user_views(&users))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;
    use crate::infra::InMemoryPersistence;
    use crate::mapper::{MockUserEditMapper, MockUserViewMapper, UserEditor, UserProjector};
    use domain::Argon2PasswordEncoder;
    use tokio_test::assert_ok;

    fn create_request(password: &str, re_password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: "alice".to_string(),
            full_name: "Alice Liddell".to_string(),
            authorities: vec!["user".to_string()],
            password: password.to_string(),
            re_password: re_password.to_string(),
        }
    }

    fn service() -> UserManager<InMemoryPersistence> {
        UserManager::new(
            Arc::new(InMemoryPersistence::new()),
            Arc::new(UserEditor),
            Arc::new(UserProjector),
            Arc::new(Argon2PasswordEncoder::new()),
        )
    }

    #[tokio::test]
    async fn test_mismatch_never_touches_mappers() {
        let mut edit_mapper = MockUserEditMapper::new();
        edit_mapper.expect_create().times(0);
        let mut view_mapper = MockUserViewMapper::new();
        view_mapper.expect_to_user_view().times(0);

        let service = UserManager::new(
            Arc::new(InMemoryPersistence::new()),
            Arc::new(edit_mapper),
            Arc::new(view_mapper),
            Arc::new(Argon2PasswordEncoder::new()),
        );

        let result = service.create(create_request("p1", "p2")).await;

        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Passwords don't match!"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(service.uow.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_create_stores_hash_not_plaintext() {
        let service = service();
        let view = assert_ok!(service.create(create_request("p1", "p1")).await);

        let stored = service.uow.users().get_by_id(view.id).await.unwrap();
        assert_ne!(stored.password_hash, "p1");
        assert!(Argon2PasswordEncoder::new().matches("p1", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_delete_keeps_user_disabled() {
        let service = service();
        let created = service.create(create_request("p1", "p1")).await.unwrap();

        let deleted = assert_ok!(service.delete(created.id).await);
        assert!(!deleted.enabled);

        let fetched = service.get_user(created.id).await.unwrap();
        assert!(!fetched.enabled);

        // Deleting twice is fine
        let again = assert_ok!(service.delete(created.id).await);
        assert!(!again.enabled);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let service = service();
        let result = service
            .update(Uuid::new_v4(), UpdateUserRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
