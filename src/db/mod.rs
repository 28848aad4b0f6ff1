//! SQLite-backed storage for the fund application builder.
//!
//! Holds the Fund -> Round -> Section -> Form -> Page -> Component hierarchy
//! plus the reusable template entities and lists, with repository modules
//! for each slice of the schema.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub mod connection;
pub mod migrations;
pub mod models;
pub mod repository;

/// Handle to the application-config database.
pub struct Db {
    pool: sqlx::SqlitePool,
    db_path: PathBuf,
}

impl Db {
    /// Path to the SQLite database file. `FAB_DB_PATH` overrides the default
    /// location under the user config directory.
    pub fn get_db_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("FAB_DB_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("fab");

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            log::info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("fab.db"))
    }

    /// Open the database and bring the schema up to date.
    pub async fn load() -> Result<Self> {
        let db_path = Self::get_db_path()?;
        log::debug!("Loading database from: {:?}", db_path);

        let pool = connection::connect(&db_path).await?;
        connection::run_migrations(&pool).await?;

        Ok(Self { pool, db_path })
    }

    /// In-memory database for tests.
    pub async fn new_test() -> Result<Self> {
        let pool = connection::connect_memory().await?;
        connection::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            db_path: PathBuf::from(":memory:"),
        })
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &std::path::Path {
        &self.db_path
    }
}
