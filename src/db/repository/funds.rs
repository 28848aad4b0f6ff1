//! Repository for fund operations.

use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::db::models::{DbFund, Fund};

const FUND_COLUMNS: &str = "fund_id, name_json, title_json, description_json, short_name, \
     welsh_available, funding_type, ggis_scheme_reference_number, owner_organisation_id, \
     is_template, audit_info";

/// Insert a fund. Short names are unique across all funds.
pub async fn insert_fund(pool: &SqlitePool, fund: &Fund) -> Result<()> {
    if get_fund_by_short_name(pool, &fund.short_name).await?.is_some() {
        anyhow::bail!("Fund short name '{}' is already in use", fund.short_name);
    }

    sqlx::query(
        "INSERT INTO fund (fund_id, name_json, title_json, description_json, short_name, \
         welsh_available, funding_type, ggis_scheme_reference_number, owner_organisation_id, \
         is_template, audit_info) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(fund.fund_id.to_string())
    .bind(fund.name.to_json_string()?)
    .bind(fund.title.to_json_string()?)
    .bind(fund.description.to_json_string()?)
    .bind(&fund.short_name)
    .bind(fund.welsh_available)
    .bind(fund.funding_type.as_str())
    .bind(&fund.ggis_scheme_reference_number)
    .bind(fund.owner_organisation_id.map(|id| id.to_string()))
    .bind(fund.is_template)
    .bind(fund.audit_info.as_ref().map(|v| v.to_string()))
    .execute(pool)
    .await
    .with_context(|| format!("Failed to insert fund '{}'", fund.short_name))?;

    log::info!("Fund added with fund_id: '{}'", fund.fund_id);
    Ok(())
}

pub async fn get_fund_by_id(pool: &SqlitePool, fund_id: Uuid) -> Result<Fund> {
    let row: Option<DbFund> =
        sqlx::query_as(&format!("SELECT {} FROM fund WHERE fund_id = ?", FUND_COLUMNS))
            .bind(fund_id.to_string())
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get fund '{}'", fund_id))?;

    row.with_context(|| format!("Fund with id {} not found", fund_id))?
        .try_into()
}

pub async fn get_fund_by_short_name(pool: &SqlitePool, short_name: &str) -> Result<Option<Fund>> {
    let row: Option<DbFund> =
        sqlx::query_as(&format!("SELECT {} FROM fund WHERE short_name = ?", FUND_COLUMNS))
            .bind(short_name)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get fund by short name '{}'", short_name))?;

    row.map(Fund::try_from).transpose()
}

/// All funds ordered by English name.
pub async fn list_funds(pool: &SqlitePool) -> Result<Vec<Fund>> {
    let rows: Vec<DbFund> = sqlx::query_as(&format!(
        "SELECT {} FROM fund ORDER BY json_extract(name_json, '$.en')",
        FUND_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list funds")?;

    rows.into_iter().map(Fund::try_from).collect()
}

/// Update the mutable scalar fields of a fund.
pub async fn update_fund(pool: &SqlitePool, fund: &Fund) -> Result<()> {
    let result = sqlx::query(
        "UPDATE fund SET name_json = ?, title_json = ?, description_json = ?, \
         welsh_available = ?, funding_type = ?, ggis_scheme_reference_number = ?, audit_info = ? \
         WHERE fund_id = ?",
    )
    .bind(fund.name.to_json_string()?)
    .bind(fund.title.to_json_string()?)
    .bind(fund.description.to_json_string()?)
    .bind(fund.welsh_available)
    .bind(fund.funding_type.as_str())
    .bind(&fund.ggis_scheme_reference_number)
    .bind(fund.audit_info.as_ref().map(|v| v.to_string()))
    .bind(fund.fund_id.to_string())
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update fund '{}'", fund.fund_id))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Fund with id {} not found", fund.fund_id);
    }

    log::info!("Fund updated with fund_id: '{}'", fund.fund_id);
    Ok(())
}

/// Delete a fund and everything under it, bottom-up so foreign keys hold at
/// every step.
pub async fn delete_fund(pool: &SqlitePool, fund_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to start fund delete")?;

    delete_rounds_subtree(&mut tx, "SELECT round_id FROM round WHERE fund_id = ?", &fund_id.to_string())
        .await?;

    let result = sqlx::query("DELETE FROM fund WHERE fund_id = ?")
        .bind(fund_id.to_string())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to delete fund '{}'", fund_id))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Fund with id {} not found", fund_id);
    }

    tx.commit().await.context("Failed to commit fund delete")?;
    log::info!("Deleted fund: {}", fund_id);
    Ok(())
}

/// Delete the full subtree under a set of rounds selected by `round_select`
/// (a query with one bind parameter), then the rounds themselves.
pub(crate) async fn delete_rounds_subtree(
    tx: &mut Transaction<'_, Sqlite>,
    round_select: &str,
    bind: &str,
) -> Result<()> {
    let sections = format!("SELECT section_id FROM section WHERE round_id IN ({})", round_select);
    let forms = format!("SELECT form_id FROM form WHERE section_id IN ({})", sections);
    let pages = format!("SELECT page_id FROM page WHERE form_id IN ({})", forms);

    for statement in [
        format!("DELETE FROM page_condition WHERE page_id IN ({})", pages),
        format!("DELETE FROM condition WHERE form_id IN ({})", forms),
        format!("DELETE FROM component WHERE page_id IN ({})", pages),
        format!("DELETE FROM page WHERE form_id IN ({})", forms),
        format!("DELETE FROM form WHERE section_id IN ({})", sections),
        format!("DELETE FROM section WHERE round_id IN ({})", round_select),
        format!("DELETE FROM round WHERE round_id IN ({})", round_select),
    ] {
        sqlx::query(&statement)
            .bind(bind)
            .execute(&mut **tx)
            .await
            .context("Failed to delete round subtree")?;
    }

    Ok(())
}
