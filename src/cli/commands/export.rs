use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::api::form_store::FormStoreClient;
use crate::db::Db;
use crate::export::create_export_files;

use super::parse_id;

pub async fn handle(db: &Db, round_id: &str, output: &Path) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    let store = FormStoreClient::from_env()?;

    let zip_path = create_export_files(db.pool(), &store, round_id, output).await?;
    println!("{} round config to {:?}", "Exported".green(), zip_path);
    Ok(())
}
