//! Unit of Work pattern implementation.
//!
//! The unit of work hands out the shared repository for reads and runs a
//! closure inside one transaction. `Ok` commits, `Err` rolls back and the
//! original error is returned.

use async_trait::async_trait;
use futures::future::BoxFuture;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::repository::{InMemoryUserStore, TxUserStore, UserRepository, UserStore};
use common::AppResult;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic `transaction` method.
/// Tests use `InMemoryPersistence` or a hand-written implementation.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Repository for reads outside any transaction
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed on success, rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send;
}

/// Repository access inside a transaction.
///
/// Everything done through the context belongs to the same transaction.
pub struct TransactionContext<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> TransactionContext<'a> {
    pub fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// User repository bound to this transaction
    pub fn users(&self) -> &'a dyn UserRepository {
        self.users
    }
}

/// SeaORM-backed UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        Self { db, user_repo }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        // Concurrent read-modify-write on one row fails instead of losing an update
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadWrite),
            )
            .await?;

        let result = {
            let users = TxUserStore::new(&txn);
            f(TransactionContext::new(&users)).await
        };

        match result {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// In-memory UnitOfWork.
///
/// Transactions are serialized by a mutex. Each one works on a copy of the
/// store and its writes are applied only on commit. Writes must go through
/// `transaction`; the shared repository is for reads.
pub struct InMemoryPersistence {
    store: Arc<InMemoryUserStore>,
    lock: Mutex<()>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryUserStore::new()))
    }

    pub fn with_store(store: Arc<InMemoryUserStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Backing store, for seeding and inspection
    pub fn store(&self) -> Arc<InMemoryUserStore> {
        self.store.clone()
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryPersistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.store.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let staged = self.store.snapshot().await;

        let result = f(TransactionContext::new(&staged)).await;

        match result {
            Ok(value) => {
                self.store.apply(staged.changes().await).await;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!("Transaction rolled back, staged changes discarded");
                Err(e)
            }
        }
    }
}

/// Run a block inside a transaction.
///
/// `with_transaction!(uow, |ctx| { ... })` expands to a `transaction`
/// call with the boxed async block. Captured values are moved in.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(move |$ctx| Box::pin(async move { $body }))
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;
    use domain::{parse_authorities, User};
    use uuid::Uuid;

    fn user(username: &str) -> User {
        User::new(
            Uuid::new_v4(),
            username.to_string(),
            username.to_uppercase(),
            parse_authorities(&["user"]),
        )
    }

    #[tokio::test]
    async fn test_commit_applies_writes() {
        let uow = InMemoryPersistence::new();
        let alice = user("alice");
        let id = alice.id;

        let saved = with_transaction!(uow, |ctx| ctx.users().save(alice).await).unwrap();

        assert_eq!(saved.id, id);
        assert_eq!(uow.users().get_by_id(id).await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_error_discards_writes() {
        let uow = InMemoryPersistence::new();
        let alice = user("alice");
        let id = alice.id;

        let result: AppResult<()> = with_transaction!(uow, |ctx| {
            ctx.users().save(alice).await?;
            Err::<(), _>(AppError::validation("abort"))
        });

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(matches!(
            uow.users().get_by_id(id).await,
            Err(AppError::NotFound)
        ));
        assert!(uow.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_reads_inside_transaction_see_staged_writes() {
        let uow = InMemoryPersistence::new();
        let alice = user("alice");

        let found = with_transaction!(uow, |ctx| {
            let users = ctx.users();
            users.save(alice).await?;
            users.find_by_username("alice").await
        })
        .unwrap();

        assert!(found.is_some());
    }
}
