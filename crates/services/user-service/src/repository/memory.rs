//! In-memory user repository, used for local development and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::text_filter;
use super::UserRepository;
use common::{AppError, AppResult, OptionExt};
use domain::{SearchUsersRequest, User};

#[derive(Debug, Default, Clone)]
struct Table {
    rows: HashMap<Uuid, User>,
    /// Ids written since the store was created, for transaction staging
    dirty: HashSet<Uuid>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<Table>,
}

impl InMemoryUserStore {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let rows = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            table: RwLock::new(Table {
                rows,
                dirty: HashSet::new(),
            }),
        }
    }

    /// Number of stored users, disabled ones included
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copy of the current rows with a clean change set
    pub(crate) async fn snapshot(&self) -> Self {
        let table = self.table.read().await;
        Self {
            table: RwLock::new(Table {
                rows: table.rows.clone(),
                dirty: HashSet::new(),
            }),
        }
    }

    /// Rows written since this store was created
    pub(crate) async fn changes(&self) -> Vec<User> {
        let table = self.table.read().await;
        table
            .dirty
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect()
    }

    /// Overwrite rows with staged copies
    pub(crate) async fn apply(&self, changes: Vec<User>) {
        let mut table = self.table.write().await;
        for user in changes {
            table.rows.insert(user.id, user);
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn save(&self, mut user: User) -> AppResult<User> {
        let mut table = self.table.write().await;

        let taken = table
            .rows
            .values()
            .any(|other| other.id != user.id && other.username == user.username);
        if taken {
            return Err(AppError::conflict("Username"));
        }

        // Username is immutable once stored
        if let Some(existing) = table.rows.get(&user.id) {
            user.username = existing.username.clone();
        }
        user.updated_at = Utc::now();

        table.rows.insert(user.id, user.clone());
        table.dirty.insert(user.id);

        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.table.read().await.rows.get(&id).cloned().ok_or_not_found()
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn search_users(&self, request: &SearchUsersRequest) -> AppResult<Vec<User>> {
        let username = text_filter(&request.username);
        let full_name = text_filter(&request.full_name);

        let table = self.table.read().await;
        let mut users: Vec<User> = table
            .rows
            .values()
            .filter(|u| request.id.map_or(true, |id| u.id == id))
            .filter(|u| {
                username
                    .as_deref()
                    .map_or(true, |needle| u.username.to_lowercase().contains(needle))
            })
            .filter(|u| {
                full_name
                    .as_deref()
                    .map_or(true, |needle| u.full_name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();

        users.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));

        Ok(users
            .into_iter()
            .skip(usize::try_from(request.pagination.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.pagination.limit()).unwrap_or(usize::MAX))
            .collect())
    }
}
