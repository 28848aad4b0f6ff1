use anyhow::Result;
use clap::Parser;
use std::path::Path;

use fab::cli::{commands, Cli, Commands};
use fab::db::Db;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("Starting fab");

    let db = Db::load().await?;

    match cli.command {
        Commands::Fund(cmd) => commands::fund::handle(&db, cmd).await,
        Commands::Round(cmd) => commands::round::handle(&db, cmd).await,
        Commands::Section(cmd) => commands::section::handle(&db, cmd).await,
        Commands::Form(cmd) => commands::form::handle(&db, cmd).await,
        Commands::Template(cmd) => commands::template::handle(&db, cmd).await,
        Commands::Export { round_id, output } => {
            commands::export::handle(&db, &round_id, Path::new(&output)).await
        }
        Commands::Preview { form_id } => commands::preview::handle(&db, &form_id).await,
        Commands::Db(cmd) => commands::db::handle(&db, cmd).await,
    }
}
