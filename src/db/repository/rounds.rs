//! Repository for round operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{DbRound, Round};

pub(crate) const ROUND_COLUMNS: &str = "round_id, fund_id, title_json, short_name, opens, deadline, \
     assessment_start, reminder_date, assessment_deadline, prospectus_link, privacy_notice_link, \
     contact_email, feedback_link, guidance_url, project_name_field_id, instructions_json, \
     application_guidance_json, all_uploaded_documents_section_available, \
     application_fields_download_available, display_logo_on_pdf_exports, mark_as_complete_enabled, \
     is_expression_of_interest, send_deadline_reminder_emails, send_incomplete_application_emails, \
     feedback_survey_config, eligibility_config, eoi_decision_schema, status, section_base_path, \
     is_template, template_name, source_template_id, audit_info";

/// Insert a round. Short names are unique within a fund.
pub async fn insert_round(pool: &SqlitePool, round: &Round) -> Result<()> {
    if get_round_by_short_name_and_fund(pool, round.fund_id, &round.short_name)
        .await?
        .is_some()
    {
        anyhow::bail!(
            "Round short name '{}' is already in use for this fund",
            round.short_name
        );
    }

    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    insert_round_row(&mut conn, round).await?;

    log::info!("Round added with round_id: '{}'", round.round_id);
    Ok(())
}

/// Bare row insert for callers that manage their own transaction and have
/// already checked short-name uniqueness.
pub(crate) async fn insert_round_row(
    conn: &mut sqlx::SqliteConnection,
    round: &Round,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO round (round_id, fund_id, title_json, short_name, opens, deadline, \
         assessment_start, reminder_date, assessment_deadline, prospectus_link, privacy_notice_link, \
         contact_email, feedback_link, guidance_url, project_name_field_id, instructions_json, \
         application_guidance_json, all_uploaded_documents_section_available, \
         application_fields_download_available, display_logo_on_pdf_exports, \
         mark_as_complete_enabled, is_expression_of_interest, send_deadline_reminder_emails, \
         send_incomplete_application_emails, feedback_survey_config, eligibility_config, \
         eoi_decision_schema, status, section_base_path, is_template, template_name, \
         source_template_id, audit_info) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(round.round_id.to_string())
    .bind(round.fund_id.to_string())
    .bind(round.title.to_json_string()?)
    .bind(&round.short_name)
    .bind(round.opens)
    .bind(round.deadline)
    .bind(round.assessment_start)
    .bind(round.reminder_date)
    .bind(round.assessment_deadline)
    .bind(&round.prospectus_link)
    .bind(&round.privacy_notice_link)
    .bind(&round.contact_email)
    .bind(&round.feedback_link)
    .bind(&round.guidance_url)
    .bind(&round.project_name_field_id)
    .bind(round.instructions.as_ref().map(|v| v.to_json_string()).transpose()?)
    .bind(
        round
            .application_guidance
            .as_ref()
            .map(|v| v.to_json_string())
            .transpose()?,
    )
    .bind(round.all_uploaded_documents_section_available)
    .bind(round.application_fields_download_available)
    .bind(round.display_logo_on_pdf_exports)
    .bind(round.mark_as_complete_enabled)
    .bind(round.is_expression_of_interest)
    .bind(round.send_deadline_reminder_emails)
    .bind(round.send_incomplete_application_emails)
    .bind(round.feedback_survey_config.as_ref().map(|v| v.to_string()))
    .bind(round.eligibility_config.as_ref().map(|v| v.to_string()))
    .bind(round.eoi_decision_schema.as_ref().map(|v| v.to_string()))
    .bind(round.status.as_str())
    .bind(round.section_base_path)
    .bind(round.is_template)
    .bind(&round.template_name)
    .bind(round.source_template_id.map(|id| id.to_string()))
    .bind(round.audit_info.as_ref().map(|v| v.to_string()))
    .execute(conn)
    .await
    .with_context(|| format!("Failed to insert round '{}'", round.short_name))?;

    Ok(())
}

pub async fn get_round_by_id(pool: &SqlitePool, round_id: Uuid) -> Result<Round> {
    let row: Option<DbRound> =
        sqlx::query_as(&format!("SELECT {} FROM round WHERE round_id = ?", ROUND_COLUMNS))
            .bind(round_id.to_string())
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get round '{}'", round_id))?;

    row.with_context(|| format!("Round with id {} not found", round_id))?
        .try_into()
}

pub async fn get_round_by_short_name_and_fund(
    pool: &SqlitePool,
    fund_id: Uuid,
    short_name: &str,
) -> Result<Option<Round>> {
    let row: Option<DbRound> = sqlx::query_as(&format!(
        "SELECT {} FROM round WHERE fund_id = ? AND short_name = ?",
        ROUND_COLUMNS
    ))
    .bind(fund_id.to_string())
    .bind(short_name)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get round by short name '{}'", short_name))?;

    row.map(Round::try_from).transpose()
}

/// All rounds, ordered by the owning fund's English title.
pub async fn list_rounds(pool: &SqlitePool) -> Result<Vec<Round>> {
    let columns = ROUND_COLUMNS
        .split(", ")
        .map(|c| format!("round.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let rows: Vec<DbRound> = sqlx::query_as(&format!(
        "SELECT {} FROM round JOIN fund ON fund.fund_id = round.fund_id \
         ORDER BY json_extract(fund.title_json, '$.en')",
        columns
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list rounds")?;

    rows.into_iter().map(Round::try_from).collect()
}

pub async fn rounds_for_fund(pool: &SqlitePool, fund_id: Uuid) -> Result<Vec<Round>> {
    let rows: Vec<DbRound> = sqlx::query_as(&format!(
        "SELECT {} FROM round WHERE fund_id = ? ORDER BY short_name",
        ROUND_COLUMNS
    ))
    .bind(fund_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list rounds for fund '{}'", fund_id))?;

    rows.into_iter().map(Round::try_from).collect()
}

/// Update the mutable fields of a round.
pub async fn update_round(pool: &SqlitePool, round: &Round) -> Result<()> {
    let result = sqlx::query(
        "UPDATE round SET title_json = ?, opens = ?, deadline = ?, assessment_start = ?, \
         reminder_date = ?, assessment_deadline = ?, prospectus_link = ?, privacy_notice_link = ?, \
         contact_email = ?, feedback_link = ?, guidance_url = ?, project_name_field_id = ?, \
         instructions_json = ?, application_guidance_json = ?, \
         all_uploaded_documents_section_available = ?, application_fields_download_available = ?, \
         display_logo_on_pdf_exports = ?, mark_as_complete_enabled = ?, is_expression_of_interest = ?, \
         send_deadline_reminder_emails = ?, send_incomplete_application_emails = ?, \
         feedback_survey_config = ?, eligibility_config = ?, eoi_decision_schema = ?, status = ?, \
         audit_info = ? \
         WHERE round_id = ?",
    )
    .bind(round.title.to_json_string()?)
    .bind(round.opens)
    .bind(round.deadline)
    .bind(round.assessment_start)
    .bind(round.reminder_date)
    .bind(round.assessment_deadline)
    .bind(&round.prospectus_link)
    .bind(&round.privacy_notice_link)
    .bind(&round.contact_email)
    .bind(&round.feedback_link)
    .bind(&round.guidance_url)
    .bind(&round.project_name_field_id)
    .bind(round.instructions.as_ref().map(|v| v.to_json_string()).transpose()?)
    .bind(
        round
            .application_guidance
            .as_ref()
            .map(|v| v.to_json_string())
            .transpose()?,
    )
    .bind(round.all_uploaded_documents_section_available)
    .bind(round.application_fields_download_available)
    .bind(round.display_logo_on_pdf_exports)
    .bind(round.mark_as_complete_enabled)
    .bind(round.is_expression_of_interest)
    .bind(round.send_deadline_reminder_emails)
    .bind(round.send_incomplete_application_emails)
    .bind(round.feedback_survey_config.as_ref().map(|v| v.to_string()))
    .bind(round.eligibility_config.as_ref().map(|v| v.to_string()))
    .bind(round.eoi_decision_schema.as_ref().map(|v| v.to_string()))
    .bind(round.status.as_str())
    .bind(round.audit_info.as_ref().map(|v| v.to_string()))
    .bind(round.round_id.to_string())
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update round '{}'", round.round_id))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Round with id {} not found", round.round_id);
    }

    log::info!("Round updated with round_id: '{}'", round.round_id);
    Ok(())
}

/// Assign the round's `section_base_path` from the global sequence if it is
/// still unset, and return the value. Base paths namespace the tree paths in
/// exported loader configs; rounds sharing a base path share path config.
pub async fn ensure_section_base_path(pool: &SqlitePool, round_id: Uuid) -> Result<i64> {
    let round = get_round_by_id(pool, round_id).await?;
    if let Some(base_path) = round.section_base_path {
        return Ok(base_path);
    }

    let mut tx = pool.begin().await.context("Failed to start base path assignment")?;

    let (max,): (Option<i64>,) = sqlx::query_as("SELECT MAX(section_base_path) FROM round")
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read base path sequence")?;
    let next = max.unwrap_or(0) + 1;

    sqlx::query("UPDATE round SET section_base_path = ? WHERE round_id = ?")
        .bind(next)
        .bind(round_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to assign section base path")?;

    tx.commit().await.context("Failed to commit base path assignment")?;
    log::info!("Assigned section_base_path {} to round {}", next, round_id);
    Ok(next)
}

/// Delete a round and everything under it.
pub async fn delete_round(pool: &SqlitePool, round_id: Uuid) -> Result<()> {
    // Existence check up front so the caller gets a not-found error rather
    // than a silent no-op.
    get_round_by_id(pool, round_id).await?;

    let mut tx = pool.begin().await.context("Failed to start round delete")?;

    super::funds::delete_rounds_subtree(
        &mut tx,
        "SELECT round_id FROM round WHERE round_id = ?",
        &round_id.to_string(),
    )
    .await?;

    tx.commit().await.context("Failed to commit round delete")?;
    log::info!("Deleted round: {}", round_id);
    Ok(())
}
