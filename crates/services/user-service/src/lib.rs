//! User Service Library
//!
//! Admin user account management over HTTP: create, update, soft delete,
//! lookup and search, plus credential lookup for authentication.

pub mod api;
pub mod config;
pub mod infra;
pub mod mapper;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::{StorageBackend, UserServiceConfig};
use crate::infra::{Database, InMemoryPersistence, Persistence, UnitOfWork};
use crate::mapper::{UserEditor, UserProjector};
use crate::service::UserManager;
use domain::Argon2PasswordEncoder;

/// Wire a user service with the default mappers and Argon2 encoder.
pub fn build_user_service<U: UnitOfWork + 'static>(uow: Arc<U>) -> Arc<UserManager<U>> {
    Arc::new(UserManager::new(
        uow,
        Arc::new(UserEditor),
        Arc::new(UserProjector),
        Arc::new(Argon2PasswordEncoder::new()),
    ))
}

/// Run the user service with configuration from the environment.
pub async fn run_embedded(
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = UserServiceConfig::from_env();
    if let Some(host) = host {
        config.service.host = host;
    }
    if let Some(port) = port {
        config.service.port = port;
    }
    run_server(config).await
}

/// Run the HTTP server with the given configuration.
pub async fn run_server(config: UserServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            AppState::new(build_user_service(Arc::new(InMemoryPersistence::new())))
        }
        StorageBackend::Postgres => {
            let db = Arc::new(Database::connect(&config.database).await?);
            let uow = Arc::new(Persistence::new(db.get_connection()));
            AppState::new(build_user_service(uow)).with_database(db)
        }
    };

    let app = create_router(state);

    let addr = config.service.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("{} listening on http://{}", config.service.service_name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
