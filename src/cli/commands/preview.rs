use anyhow::{Context, Result};

use crate::api::form_runner::FormRunnerClient;
use crate::db::repository::{application, funds, pages, rounds};
use crate::db::Db;
use crate::export::helpers::human_to_kebab_case;
use crate::runner::build_form_json;

use super::parse_id;

/// Publish a form's current document to the form runner and print the
/// preview address.
pub async fn handle(db: &Db, form_id: &str) -> Result<()> {
    let form_id = parse_id(form_id, "form")?;
    let tree = pages::load_form_tree(db.pool(), form_id).await?;

    // Templates have no section, so a fund title is not always available.
    let fund_title = match tree.form.section_id {
        Some(section_id) => {
            let section = application::get_section_by_id(db.pool(), section_id).await?;
            match section.round_id {
                Some(round_id) => {
                    let round = rounds::get_round_by_id(db.pool(), round_id).await?;
                    let fund = funds::get_fund_by_id(db.pool(), round.fund_id).await?;
                    Some(fund.title.en)
                }
                None => None,
            }
        }
        None => None,
    };

    let document = build_form_json(&tree, fund_title.as_deref());
    let value = serde_json::to_value(&document).context("Failed to serialize form document")?;

    let publish_name = tree
        .form
        .runner_publish_name
        .clone()
        .unwrap_or_else(|| human_to_kebab_case(&tree.form.name_in_apply_json.en));

    let runner = FormRunnerClient::from_env()?;
    let preview_url = runner.publish(&publish_name, &value).await?;
    println!("Preview available at {}", preview_url);
    Ok(())
}
