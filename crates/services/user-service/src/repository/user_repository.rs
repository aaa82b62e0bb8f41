//! User repository contract and its SeaORM implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func, OnConflict},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use super::entities::{user, UserActiveModel, UserEntity};
use super::text_filter;
use common::{AppError, AppResult, OptionExt};
use domain::{SearchUsersRequest, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Username uniqueness is enforced here, not by callers.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user by id. Stamps `updated_at`.
    ///
    /// Fails with `Conflict` when another user already owns the username.
    async fn save(&self, user: User) -> AppResult<User>;

    /// Load a user by id, failing with `NotFound` when absent
    async fn get_by_id(&self, id: Uuid) -> AppResult<User>;

    /// Find a user by exact username, disabled users included
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Filter, order by username, and paginate
    async fn search_users(&self, request: &SearchUsersRequest) -> AppResult<Vec<User>>;
}

/// Repository over the shared connection pool
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn save(&self, user: User) -> AppResult<User> {
        save_user(&self.db, user).await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        get_user_by_id(&self.db, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_user_by_username(&self.db, username).await
    }

    async fn search_users(&self, request: &SearchUsersRequest) -> AppResult<Vec<User>> {
        search(&self.db, request).await
    }
}

/// Transaction-bound repository.
///
/// Borrows the transaction so it cannot outlive commit or rollback.
pub struct TxUserStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserStore<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl<'a> UserRepository for TxUserStore<'a> {
    async fn save(&self, user: User) -> AppResult<User> {
        save_user(self.txn, user).await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        get_user_by_id(self.txn, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_user_by_username(self.txn, username).await
    }

    async fn search_users(&self, request: &SearchUsersRequest) -> AppResult<Vec<User>> {
        search(self.txn, request).await
    }
}

async fn save_user<C: ConnectionTrait>(conn: &C, mut record: User) -> AppResult<User> {
    record.updated_at = Utc::now();

    // Username is immutable, so it is not part of the update set
    let model = UserEntity::insert(UserActiveModel::from(&record))
        .on_conflict(
            OnConflict::column(user::Column::Id)
                .update_columns([
                    user::Column::PasswordHash,
                    user::Column::FullName,
                    user::Column::Authorities,
                    user::Column::Enabled,
                    user::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(conn)
        .await
        .map_err(map_write_error)?;

    Ok(User::from(model))
}

async fn get_user_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<User> {
    UserEntity::find_by_id(id)
        .one(conn)
        .await?
        .map(User::from)
        .ok_or_not_found()
}

async fn find_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> AppResult<Option<User>> {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await?;

    Ok(result.map(User::from))
}

async fn search<C: ConnectionTrait>(conn: &C, request: &SearchUsersRequest) -> AppResult<Vec<User>> {
    let mut query = UserEntity::find();

    if let Some(id) = request.id {
        query = query.filter(user::Column::Id.eq(id));
    }
    if let Some(username) = text_filter(&request.username) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                .like(contains_pattern(&username)),
        );
    }
    if let Some(full_name) = text_filter(&request.full_name) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(user::Column::FullName)))
                .like(contains_pattern(&full_name)),
        );
    }

    let models = query
        .order_by_asc(user::Column::Username)
        .order_by_asc(user::Column::Id)
        .offset(request.pagination.offset())
        .limit(request.pagination.limit())
        .all(conn)
        .await?;

    Ok(models.into_iter().map(User::from).collect())
}

/// `%needle%` with LIKE wildcards in the needle escaped
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn map_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Username"),
        _ => AppError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("ali"), "%ali%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
