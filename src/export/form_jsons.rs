//! Per-form runner JSON files for a round's export bundle.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::repository::{application, funds, pages, rounds};
use crate::export::helpers::{human_to_kebab_case, write_export_file};
use crate::runner::{build_form_json, schema};

/// Build, validate and write the runner document for every form in the
/// round. Invalid documents are logged and skipped so one bad form does not
/// sink the whole export.
pub async fn generate_form_jsons_for_round(
    pool: &SqlitePool,
    round_id: Uuid,
    base_output_dir: &Path,
) -> Result<()> {
    let round = rounds::get_round_by_id(pool, round_id).await?;
    let fund = funds::get_fund_by_id(pool, round.fund_id).await?;
    log::info!("Generating form JSONs for round {}", round_id);

    let output_dir = base_output_dir.join("form_runner");

    for section in application::sections_for_round(pool, round_id).await? {
        for form in application::forms_for_section(pool, section.section_id).await? {
            let tree = pages::load_form_tree(pool, form.form_id).await?;
            let document = build_form_json(&tree, Some(&fund.title.en));
            let value =
                serde_json::to_value(&document).context("Failed to serialize form document")?;

            if !schema::validate_document(&value) {
                log::error!(
                    "Form JSON for {:?} is invalid, skipping",
                    form.runner_publish_name
                );
                continue;
            }

            let publish_name = form
                .runner_publish_name
                .clone()
                .unwrap_or_else(|| human_to_kebab_case(&form.name_in_apply_json.en));
            let filename = if publish_name.ends_with(".json") {
                human_to_kebab_case(&publish_name)
            } else {
                format!("{}.json", human_to_kebab_case(&publish_name))
            };

            write_export_file(&output_dir, &filename, &to_json_indent4(&value)?)?;
        }
    }

    Ok(())
}

/// Pretty-print with four-space indentation, matching the documents the
/// runner repos keep in version control.
pub fn to_json_indent4(value: &serde_json::Value) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to render form document")?;
    String::from_utf8(out).context("Form document was not valid UTF-8")
}
