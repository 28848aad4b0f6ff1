//! Fund/round loader config: the `LOADER_CONFIG=` Python-literal file
//! consumed by the downstream fund store.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::form_store::FormStoreClient;
use crate::db::models::{Fund, I18nText, Round};
use crate::db::repository::{application, funds, rounds};
use crate::export::helpers::{human_to_kebab_case, human_to_snake_case, python_literal, write_export_file};

#[derive(Debug, Clone, Serialize)]
pub struct FundExport {
    pub id: String,
    pub name_json: I18nText,
    pub title_json: I18nText,
    pub short_name: String,
    pub description_json: I18nText,
    pub welsh_available: bool,
    pub funding_type: String,
    pub ggis_scheme_reference_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundExport {
    pub id: String,
    pub fund_id: String,
    pub title_json: I18nText,
    pub short_name: String,
    pub opens: Option<String>,
    pub deadline: Option<String>,
    pub assessment_start: Option<String>,
    pub assessment_deadline: Option<String>,
    pub reminder_date: Option<String>,
    pub prospectus: String,
    pub privacy_notice: String,
    pub contact_email: Option<String>,
    pub instructions_json: Option<I18nText>,
    pub feedback_link: Option<String>,
    pub project_name_field_id: Option<String>,
    pub application_guidance_json: Option<I18nText>,
    pub guidance_url: Option<String>,
    pub all_uploaded_documents_section_available: bool,
    pub application_fields_download_available: bool,
    pub display_logo_on_pdf_exports: bool,
    pub mark_as_complete_enabled: bool,
    pub is_expression_of_interest: bool,
    pub feedback_survey_config: Option<Value>,
    pub eligibility_config: Option<Value>,
    pub send_deadline_reminder_emails: bool,
    pub send_incomplete_application_emails: bool,
    pub eoi_decision_schema: Option<Value>,
}

fn isoformat(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

pub fn generate_fund_config(fund: &Fund) -> Result<Value> {
    log::info!("Generating fund config for fund {}", fund.fund_id);
    let export = FundExport {
        id: fund.fund_id.to_string(),
        name_json: fund.name.clone(),
        title_json: fund.title.clone(),
        short_name: fund.short_name.clone(),
        description_json: fund.description.clone(),
        welsh_available: fund.welsh_available,
        funding_type: fund.funding_type.as_str().to_string(),
        ggis_scheme_reference_number: fund.ggis_scheme_reference_number.clone(),
    };
    serde_json::to_value(export).context("Failed to serialize fund config")
}

pub fn generate_round_config(round: &Round) -> Result<Value> {
    log::info!("Generating round config for round {}", round.round_id);
    let export = RoundExport {
        id: round.round_id.to_string(),
        fund_id: round.fund_id.to_string(),
        title_json: round.title.clone(),
        short_name: round.short_name.clone(),
        opens: isoformat(round.opens),
        deadline: isoformat(round.deadline),
        assessment_start: isoformat(round.assessment_start),
        assessment_deadline: isoformat(round.assessment_deadline),
        reminder_date: isoformat(round.reminder_date),
        prospectus: round.prospectus_link.clone(),
        privacy_notice: round.privacy_notice_link.clone(),
        contact_email: round.contact_email.clone(),
        instructions_json: round.instructions.clone(),
        feedback_link: round.feedback_link.clone(),
        project_name_field_id: round.project_name_field_id.clone(),
        application_guidance_json: round.application_guidance.clone(),
        guidance_url: round.guidance_url.clone(),
        all_uploaded_documents_section_available: round.all_uploaded_documents_section_available,
        application_fields_download_available: round.application_fields_download_available,
        display_logo_on_pdf_exports: round.display_logo_on_pdf_exports,
        mark_as_complete_enabled: round.mark_as_complete_enabled,
        is_expression_of_interest: round.is_expression_of_interest,
        feedback_survey_config: round.feedback_survey_config.clone(),
        eligibility_config: round.eligibility_config.clone(),
        send_deadline_reminder_emails: round.send_deadline_reminder_emails,
        send_incomplete_application_emails: round.send_incomplete_application_emails,
        eoi_decision_schema: round.eoi_decision_schema.clone(),
    };
    serde_json::to_value(export).context("Failed to serialize round config")
}

/// Per-section and per-form display entries with `tree_path` namespacing
/// under the round's base path. Form display names resolve through the form
/// store, falling back to the locally stored name.
pub async fn generate_application_display_config(
    pool: &SqlitePool,
    store: &FormStoreClient,
    round: &Round,
    base_path: i64,
) -> Result<Vec<Value>> {
    log::info!("Generating application display config for round {}", round.round_id);
    let application_base_path = format!("{}.1", base_path);
    let mut entries = Vec::new();

    for section in application::sections_for_round(pool, round.round_id).await? {
        let index = section.index_in_round;
        let section_name = json!({
            "en": format!("{}. {}", index, section.name_in_apply_json.en),
            "cy": section
                .name_in_apply_json
                .cy
                .as_deref()
                .filter(|cy| !cy.is_empty())
                .map(|cy| format!("{}. {}", index, cy))
                .unwrap_or_default(),
        });
        entries.push(json!({
            "section_name": section_name,
            "tree_path": format!("{}.{}", application_base_path, index),
        }));

        for form in application::forms_for_section(pool, section.section_id).await? {
            let url_path = form
                .runner_publish_name
                .clone()
                .unwrap_or_else(|| human_to_kebab_case(&form.name_in_apply_json.en));
            let display_name = match store.get_display_name(&url_path).await {
                Some(name) => name,
                None => form.name_in_apply_json.en.clone(),
            };

            entries.push(json!({
                "section_name": {
                    "en": format!("{}.{} {}", index, form.section_index, display_name),
                    "cy": "",
                },
                "form_name_json": {"en": url_path, "cy": ""},
                "tree_path": format!("{}.{}.{}", application_base_path, index, form.section_index),
            }));
        }
    }

    Ok(entries)
}

/// Assemble and write the loader config for a round. Returns the fund and
/// round configs for reuse by the assessment generator.
pub async fn generate_config_for_round(
    pool: &SqlitePool,
    store: &FormStoreClient,
    round_id: Uuid,
    base_output_dir: &Path,
) -> Result<(Value, Value)> {
    let base_path = rounds::ensure_section_base_path(pool, round_id).await?;
    let round = rounds::get_round_by_id(pool, round_id).await?;
    let fund = funds::get_fund_by_id(pool, round.fund_id).await?;

    let fund_config = generate_fund_config(&fund)?;
    let round_config = generate_round_config(&round)?;
    let sections_config = generate_application_display_config(pool, store, &round, base_path).await?;

    let fund_round_export = json!({
        "sections_config": sections_config,
        "fund_config": fund_config,
        "round_config": round_config,
        "base_path": base_path,
    });

    let content = format!("LOADER_CONFIG={}\n", python_literal(&fund_round_export));
    write_export_file(
        &base_output_dir.join("fund_store"),
        &format!("{}.py", human_to_snake_case(&fund.short_name)),
        &content,
    )?;

    Ok((fund_config, round_config))
}
