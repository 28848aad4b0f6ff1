use anyhow::Result;
use clap::{Args, Subcommand};

use crate::db::migrations::manager::MigrationManager;
use crate::db::Db;

#[derive(Args)]
pub struct DbCommands {
    #[command(subcommand)]
    pub command: DbSubcommands,
}

#[derive(Subcommand)]
pub enum DbSubcommands {
    /// Run all pending migrations
    Migrate,
    /// Roll the schema back to a version (0 drops everything)
    Rollback {
        /// Target schema version
        version: i64,
    },
    /// Show applied and pending migrations
    Status,
}

pub async fn handle(db: &Db, commands: DbCommands) -> Result<()> {
    let manager = MigrationManager::new(db.pool());
    match commands.command {
        DbSubcommands::Migrate => {
            manager.migrate_up().await?;
            println!("Database is up to date.");
            Ok(())
        }
        DbSubcommands::Rollback { version } => {
            manager.migrate_down(Some(version)).await?;
            println!("Rolled back to version {}.", version);
            Ok(())
        }
        DbSubcommands::Status => {
            let status = manager.status().await?;
            match status.current_version {
                Some(version) => println!("Current schema version: {}", version),
                None => println!("No migrations applied yet."),
            }
            if !status.applied_migrations.is_empty() {
                println!("\nApplied:");
                for migration in &status.applied_migrations {
                    println!(
                        "  {:>4}  {}  ({})",
                        migration.version, migration.name, migration.applied_at
                    );
                }
            }
            if !status.pending_migrations.is_empty() {
                println!("\nPending:");
                for migration in &status.pending_migrations {
                    println!("  {:>4}  {}", migration.version, migration.name);
                }
            }
            Ok(())
        }
    }
}
