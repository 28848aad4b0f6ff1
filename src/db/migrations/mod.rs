//! Embedded migration framework for the application-config database.
//!
//! Migrations are auto-discovered from `files/NNN_name/{up,down}.sql` at
//! compile time and tracked in a `schema_migrations` table with a checksum,
//! so a modified migration file is detected instead of silently diverging.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

pub mod manager;

pub use manager::MigrationManager;

/// A single migration with up and down SQL.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
    pub down_sql: String,
}

/// A migration recorded as applied in the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Load all available migrations from the embedded files directory.
pub fn load_migrations() -> Result<BTreeMap<i64, Migration>> {
    use include_dir::{include_dir, Dir};

    static MIGRATIONS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/db/migrations/files");

    let mut migrations = BTreeMap::new();

    for entry in MIGRATIONS_DIR.dirs() {
        let dir_name = entry
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .context("Invalid migration directory name")?;

        // Directory format: NNN_name
        let parts: Vec<&str> = dir_name.splitn(2, '_').collect();
        if parts.len() != 2 {
            anyhow::bail!(
                "Invalid migration directory format: {}. Expected format: NNN_name",
                dir_name
            );
        }

        let version: i64 = parts[0]
            .parse()
            .with_context(|| format!("Invalid migration version in directory: {}", dir_name))?;
        let name = parts[1].to_string();

        let up_sql = MIGRATIONS_DIR
            .get_file(format!("{}/up.sql", dir_name))
            .with_context(|| format!("Missing up.sql in migration {}", dir_name))?
            .contents_utf8()
            .with_context(|| format!("up.sql is not valid UTF-8 in migration {}", dir_name))?
            .to_string();

        let down_sql = MIGRATIONS_DIR
            .get_file(format!("{}/down.sql", dir_name))
            .with_context(|| format!("Missing down.sql in migration {}", dir_name))?
            .contents_utf8()
            .with_context(|| format!("down.sql is not valid UTF-8 in migration {}", dir_name))?
            .to_string();

        migrations.insert(
            version,
            Migration {
                version,
                name,
                up_sql,
                down_sql,
            },
        );
    }

    if migrations.is_empty() {
        anyhow::bail!("No migrations found in files directory");
    }

    Ok(migrations)
}

/// Initialize the migration tracking table.
pub async fn init_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            checksum TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

pub async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>> {
    let migrations = sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, applied_at, checksum FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get applied migrations")?;

    Ok(migrations)
}

/// Checksum for migration SQL, with line endings normalized to LF so the
/// same migration hashes identically across platforms.
pub fn calculate_checksum(sql: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let normalized = sql.replace("\r\n", "\n").replace('\r', "\n");

    let mut hasher = DefaultHasher::new();
    normalized.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Validate that applied migrations match the embedded ones.
pub async fn validate_migrations(pool: &SqlitePool) -> Result<()> {
    let available = load_migrations()?;
    let applied = get_applied_migrations(pool).await?;

    for applied_migration in applied {
        match available.get(&applied_migration.version) {
            Some(available_migration) => {
                let expected = calculate_checksum(&available_migration.up_sql);
                if applied_migration.checksum != expected {
                    anyhow::bail!(
                        "Migration {} checksum mismatch! Applied: {}, Expected: {}. \
                        The migration file has been modified after being applied.",
                        applied_migration.version,
                        applied_migration.checksum,
                        expected
                    );
                }
            }
            None => anyhow::bail!(
                "Applied migration {} '{}' not found in available migrations",
                applied_migration.version,
                applied_migration.name
            ),
        }
    }

    Ok(())
}

/// Migrations that are available but not yet applied.
pub async fn get_pending_migrations(pool: &SqlitePool) -> Result<Vec<Migration>> {
    let available = load_migrations()?;
    let applied = get_applied_migrations(pool).await?;

    let applied_versions: std::collections::HashSet<i64> =
        applied.into_iter().map(|m| m.version).collect();

    Ok(available
        .into_values()
        .filter(|m| !applied_versions.contains(&m.version))
        .collect())
}

/// The current schema version (highest applied migration), if any.
pub async fn get_current_version(pool: &SqlitePool) -> Result<Option<i64>> {
    let version: Option<(Option<i64>,)> = sqlx::query_as("SELECT MAX(version) FROM schema_migrations")
        .fetch_optional(pool)
        .await
        .context("Failed to get current schema version")?;

    Ok(version.and_then(|(v,)| v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_migrations() {
        let migrations = load_migrations().unwrap();
        assert!(migrations.contains_key(&1), "001_initial should exist");
        for (version, migration) in &migrations {
            assert!(!migration.up_sql.is_empty(), "migration {} missing up.sql", version);
            assert!(!migration.down_sql.is_empty(), "migration {} missing down.sql", version);
        }
    }

    #[test]
    fn checksum_ignores_line_endings() {
        assert_eq!(
            calculate_checksum("CREATE TABLE t (id INTEGER);\n"),
            calculate_checksum("CREATE TABLE t (id INTEGER);\r\n")
        );
    }
}
