//! Shared builders for integration tests: a fund with one round, plus page
//! and component constructors with sensible defaults.

use anyhow::Result;
use serde_json::json;
use uuid::Uuid;

use fab::db::models::{
    Component, ComponentType, Form, Fund, FundingType, I18nText, Page, Round, RoundStatus, Section,
};
use fab::db::repository::{funds, rounds};
use fab::db::Db;

pub fn sample_fund() -> Fund {
    Fund {
        fund_id: Uuid::new_v4(),
        name: I18nText::new("Community Ownership Fund"),
        title: I18nText::new("funding to save an asset in your community"),
        description: I18nText::new("Supports community groups taking over local assets"),
        short_name: "COF".to_string(),
        welsh_available: false,
        funding_type: FundingType::Competitive,
        ggis_scheme_reference_number: Some("G2-SCH-0000000001".to_string()),
        owner_organisation_id: None,
        is_template: false,
        audit_info: None,
    }
}

pub fn sample_round(fund_id: Uuid, short_name: &str) -> Round {
    Round {
        round_id: Uuid::new_v4(),
        fund_id,
        title: I18nText::new("Round 1"),
        short_name: short_name.to_string(),
        opens: None,
        deadline: None,
        assessment_start: None,
        reminder_date: None,
        assessment_deadline: None,
        prospectus_link: "https://example.com/prospectus".to_string(),
        privacy_notice_link: "https://example.com/privacy".to_string(),
        contact_email: Some("grants@example.com".to_string()),
        feedback_link: None,
        guidance_url: None,
        project_name_field_id: None,
        instructions: None,
        application_guidance: None,
        all_uploaded_documents_section_available: false,
        application_fields_download_available: false,
        display_logo_on_pdf_exports: false,
        mark_as_complete_enabled: true,
        is_expression_of_interest: false,
        send_deadline_reminder_emails: true,
        send_incomplete_application_emails: true,
        feedback_survey_config: None,
        eligibility_config: None,
        eoi_decision_schema: None,
        status: RoundStatus::InProgress,
        section_base_path: None,
        is_template: false,
        template_name: None,
        source_template_id: None,
        audit_info: None,
    }
}

/// Insert a fund and one round, returning both.
pub async fn seed_fund_and_round(db: &Db) -> Result<(Fund, Round)> {
    let fund = sample_fund();
    funds::insert_fund(db.pool(), &fund).await?;
    let round = sample_round(fund.fund_id, "R1");
    rounds::insert_round(db.pool(), &round).await?;
    Ok((fund, round))
}

pub fn sample_section(round_id: Uuid, name: &str) -> Section {
    Section {
        section_id: Uuid::new_v4(),
        round_id: Some(round_id),
        name_in_apply_json: I18nText::new(name),
        index_in_round: 0,
        template_name: None,
        is_template: false,
        source_template_id: None,
        audit_info: None,
    }
}

pub fn sample_form(section_id: Uuid, name: &str, publish_name: &str) -> Form {
    Form {
        form_id: Uuid::new_v4(),
        section_id: Some(section_id),
        name_in_apply_json: I18nText::new(name),
        section_index: 0,
        runner_publish_name: Some(publish_name.to_string()),
        form_json: None,
        template_name: None,
        is_template: false,
        source_template_id: None,
        audit_info: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn sample_page(form_id: Uuid, display_path: &str, title: &str, index: i64) -> Page {
    Page {
        page_id: Uuid::new_v4(),
        form_id: Some(form_id),
        display_path: display_path.to_string(),
        name_in_apply_json: I18nText::new(title),
        form_index: Some(index),
        controller: None,
        options: None,
        form_section_id: None,
        default_next_page_id: None,
        is_template: false,
        template_name: None,
        source_template_id: None,
    }
}

pub fn text_component(page_id: Uuid, name: &str, title: &str, index: i64) -> Component {
    Component {
        component_id: Uuid::new_v4(),
        page_id: Some(page_id),
        parent_component_id: None,
        title: Some(title.to_string()),
        hint_text: None,
        content: None,
        options: None,
        schema: None,
        component_type: ComponentType::TextField,
        page_index: Some(index),
        runner_component_name: name.to_string(),
        list_id: None,
        is_template: false,
        template_name: None,
        source_template_id: None,
    }
}

pub fn radios_component(page_id: Uuid, name: &str, list_id: Uuid, index: i64) -> Component {
    Component {
        component_type: ComponentType::RadiosField,
        list_id: Some(list_id),
        ..text_component(page_id, name, "Pick one", index)
    }
}

pub fn yes_no_items() -> serde_json::Value {
    json!([
        {"text": "Yes", "value": "yes"},
        {"text": "No", "value": "no"}
    ])
}
