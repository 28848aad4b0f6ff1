//! Best-effort assessment config for a round. Generated to make local
//! testing of downstream assessment tooling easier: each section becomes a
//! criterion (alternating scored and unscored, scored weighting split
//! evenly), each form a sub-criterion, each non-summary page a theme.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::models::ComponentType;
use crate::db::repository::{application, pages};
use crate::export::helpers::{human_to_kebab_case, python_literal, write_export_file};
use crate::runner::build_form_json;

/// How a component's answer is presented in assessment views.
fn presentation_type(component_type: ComponentType) -> &'static str {
    match component_type {
        ComponentType::FreeTextField | ComponentType::MultilineTextField => "free_text",
        ComponentType::CheckboxesField | ComponentType::List => "list",
        ComponentType::UkAddressField => "address",
        ComponentType::NumberField => "integer",
        ComponentType::DateField
        | ComponentType::DatePartsField
        | ComponentType::DateTimeField
        | ComponentType::DateTimePartsField
        | ComponentType::MonthYearField => "date",
        ComponentType::ClientSideFileUploadField | ComponentType::FileUploadField => "file",
        ComponentType::MultiInputField => "table",
        _ => "text",
    }
}

fn lower_camel(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub async fn generate_assessment_config_for_round(
    pool: &SqlitePool,
    fund_config: &Value,
    round_config: &Value,
    base_output_dir: &Path,
) -> Result<()> {
    let fund_id = fund_config["id"].as_str().context("Fund config has no id")?;
    let round_id_str = round_config["id"].as_str().context("Round config has no id")?;
    let fund_short_name = fund_config["short_name"]
        .as_str()
        .context("Fund config has no short name")?;
    let round_short_name = round_config["short_name"]
        .as_str()
        .context("Round config has no short name")?;
    let round_id = uuid::Uuid::parse_str(round_id_str).context("Invalid round id in config")?;

    let fund_round = format!(
        "{}{}",
        fund_short_name.to_uppercase(),
        round_short_name.to_uppercase()
    );
    let fund_round_ids = format!("{}:{}", fund_id, round_id_str);

    let sections = application::sections_for_round(pool, round_id).await?;

    let mut criteria = Vec::new();
    for section in &sections {
        let mut sub_criteria = Vec::new();

        for form in application::forms_for_section(pool, section.section_id).await? {
            let tree = pages::load_form_tree(pool, form.form_id).await?;
            let document = build_form_json(&tree, None);
            let publish_name = form
                .runner_publish_name
                .clone()
                .unwrap_or_else(|| human_to_kebab_case(&form.name_in_apply_json.en));

            let mut themes = Vec::new();
            for page in &document.pages {
                if page.path.trim_start_matches('/') == "summary" {
                    continue;
                }

                let mut answers = Vec::new();
                for component in &page.components {
                    let Some(type_name) = component.get("type").and_then(Value::as_str) else {
                        continue;
                    };
                    let component_type = ComponentType::parse(type_name)?;
                    if component_type.is_read_only() {
                        continue;
                    }
                    answers.push(json!({
                        "field_id": component.get("name"),
                        "form_name": publish_name,
                        "field_type": lower_camel(type_name),
                        "presentation_type": presentation_type(component_type),
                        "question": component.get("title"),
                    }));
                }

                themes.push(json!({
                    "id": human_to_kebab_case(&page.title),
                    "name": page.title,
                    "answers": answers,
                }));
            }

            sub_criteria.push(json!({
                "id": publish_name,
                "name": form.name_in_apply_json.en,
                "themes": themes,
            }));
        }

        criteria.push(json!({
            "id": human_to_kebab_case(&section.name_in_apply_json.en),
            "name": section.name_in_apply_json.en,
            "sub_criteria": sub_criteria,
        }));
    }

    // Alternate sections between scored and unscored, then split the
    // scored weighting evenly.
    let mut scored: Vec<Value> = Vec::new();
    let mut unscored: Vec<Value> = Vec::new();
    for (i, criterion) in criteria.into_iter().enumerate() {
        if i % 2 == 0 {
            scored.push(criterion);
        } else {
            unscored.push(criterion);
        }
    }
    let weight = if scored.is_empty() {
        0.0
    } else {
        ((1.0 / scored.len() as f64) * 100.0).round() / 100.0
    };
    for criterion in &mut scored {
        if let Some(map) = criterion.as_object_mut() {
            map.insert("weighting".to_string(), json!(weight));
        }
    }

    let assessment_config = json!({
        "fund_round": fund_round,
        "fund_id": fund_id,
        "round_id": round_id_str,
        "fund_round_ids": fund_round_ids,
        "fund_short_name": fund_short_name,
        "scored_criteria": scored,
        "unscored_criteria": unscored,
    });

    let content = format!("ASSESSMENT_CONFIG={}\n", python_literal(&assessment_config));
    write_export_file(
        &base_output_dir.join("assessment_store"),
        "assessment_config.py",
        &content,
    )?;

    Ok(())
}
