//! Repository for the application structure of a round: sections and the
//! forms within them. Ordering columns are 1-based and kept contiguous.

use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::db::models::{DbForm, DbSection, Form, Section};
use crate::ordering;

pub(crate) const SECTION_COLUMNS: &str = "section_id, round_id, name_in_apply_json, \
     index_in_round, template_name, is_template, source_template_id, audit_info";

pub(crate) const FORM_COLUMNS: &str = "form_id, section_id, name_in_apply_json, section_index, \
     runner_publish_name, form_json, template_name, is_template, source_template_id, audit_info, \
     created_at, updated_at";

pub async fn get_section_by_id(pool: &SqlitePool, section_id: Uuid) -> Result<Section> {
    let row: Option<DbSection> = sqlx::query_as(&format!(
        "SELECT {} FROM section WHERE section_id = ?",
        SECTION_COLUMNS
    ))
    .bind(section_id.to_string())
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get section '{}'", section_id))?;

    row.with_context(|| format!("Section with id {} not found", section_id))?
        .try_into()
}

pub async fn get_form_by_id(pool: &SqlitePool, form_id: Uuid) -> Result<Form> {
    let row: Option<DbForm> =
        sqlx::query_as(&format!("SELECT {} FROM form WHERE form_id = ?", FORM_COLUMNS))
            .bind(form_id.to_string())
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get form '{}'", form_id))?;

    row.with_context(|| format!("Form with id {} not found", form_id))?
        .try_into()
}

/// Sections of a round in display order.
pub async fn sections_for_round(pool: &SqlitePool, round_id: Uuid) -> Result<Vec<Section>> {
    let rows: Vec<DbSection> = sqlx::query_as(&format!(
        "SELECT {} FROM section WHERE round_id = ? ORDER BY index_in_round",
        SECTION_COLUMNS
    ))
    .bind(round_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list sections for round '{}'", round_id))?;

    rows.into_iter().map(Section::try_from).collect()
}

/// Forms of a section in display order.
pub async fn forms_for_section(pool: &SqlitePool, section_id: Uuid) -> Result<Vec<Form>> {
    let rows: Vec<DbForm> = sqlx::query_as(&format!(
        "SELECT {} FROM form WHERE section_id = ? ORDER BY section_index",
        FORM_COLUMNS
    ))
    .bind(section_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list forms for section '{}'", section_id))?;

    rows.into_iter().map(Form::try_from).collect()
}

/// List every saved form template.
pub async fn list_form_templates(pool: &SqlitePool) -> Result<Vec<Form>> {
    let rows: Vec<DbForm> = sqlx::query_as(&format!(
        "SELECT {} FROM form WHERE is_template = 1 ORDER BY template_name",
        FORM_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list form templates")?;

    rows.into_iter().map(Form::try_from).collect()
}

/// Insert a new section at the end of the round's ordering.
pub async fn insert_new_section(pool: &SqlitePool, section: &Section) -> Result<Section> {
    let round_id = section
        .round_id
        .context("Section must belong to a round")?;

    let existing = sections_for_round(pool, round_id).await?;
    let index = ordering::next_index(existing.len());

    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    insert_section_row(&mut conn, section, Some(index)).await?;

    let mut inserted = section.clone();
    inserted.index_in_round = index;
    log::info!("Section added with section_id: '{}'", inserted.section_id);
    Ok(inserted)
}

pub(crate) async fn insert_section_row(
    conn: &mut sqlx::SqliteConnection,
    section: &Section,
    index_override: Option<i64>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO section (section_id, round_id, name_in_apply_json, index_in_round, \
         template_name, is_template, source_template_id, audit_info) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(section.section_id.to_string())
    .bind(section.round_id.map(|id| id.to_string()))
    .bind(section.name_in_apply_json.to_json_string()?)
    .bind(index_override.unwrap_or(section.index_in_round))
    .bind(&section.template_name)
    .bind(section.is_template)
    .bind(section.source_template_id.map(|id| id.to_string()))
    .bind(section.audit_info.as_ref().map(|v| v.to_string()))
    .execute(conn)
    .await
    .with_context(|| format!("Failed to insert section '{}'", section.section_id))?;

    Ok(())
}

pub async fn update_section(pool: &SqlitePool, section: &Section) -> Result<()> {
    let result = sqlx::query(
        "UPDATE section SET name_in_apply_json = ?, template_name = ?, audit_info = ? \
         WHERE section_id = ?",
    )
    .bind(section.name_in_apply_json.to_json_string()?)
    .bind(&section.template_name)
    .bind(section.audit_info.as_ref().map(|v| v.to_string()))
    .bind(section.section_id.to_string())
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update section '{}'", section.section_id))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Section with id {} not found", section.section_id);
    }

    log::info!("Section updated with section_id: '{}'", section.section_id);
    Ok(())
}

/// Insert a new form at the end of the section's ordering.
pub async fn insert_new_form(pool: &SqlitePool, form: &Form) -> Result<Form> {
    let section_id = form.section_id.context("Form must belong to a section")?;

    let existing = forms_for_section(pool, section_id).await?;
    let index = ordering::next_index(existing.len());

    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    insert_form_row(&mut conn, form, Some(index)).await?;

    let mut inserted = form.clone();
    inserted.section_index = index;
    log::info!("Form added with form_id: '{}'", inserted.form_id);
    Ok(inserted)
}

pub(crate) async fn insert_form_row(
    conn: &mut sqlx::SqliteConnection,
    form: &Form,
    index_override: Option<i64>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO form (form_id, section_id, name_in_apply_json, section_index, \
         runner_publish_name, form_json, template_name, is_template, source_template_id, \
         audit_info, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(form.form_id.to_string())
    .bind(form.section_id.map(|id| id.to_string()))
    .bind(form.name_in_apply_json.to_json_string()?)
    .bind(index_override.unwrap_or(form.section_index))
    .bind(&form.runner_publish_name)
    .bind(form.form_json.as_ref().map(|v| v.to_string()))
    .bind(&form.template_name)
    .bind(form.is_template)
    .bind(form.source_template_id.map(|id| id.to_string()))
    .bind(form.audit_info.as_ref().map(|v| v.to_string()))
    .bind(form.created_at)
    .bind(form.updated_at)
    .execute(conn)
    .await
    .with_context(|| format!("Failed to insert form '{}'", form.form_id))?;

    Ok(())
}

pub async fn update_form(pool: &SqlitePool, form: &Form) -> Result<()> {
    let result = sqlx::query(
        "UPDATE form SET name_in_apply_json = ?, runner_publish_name = ?, form_json = ?, \
         template_name = ?, audit_info = ?, updated_at = CURRENT_TIMESTAMP \
         WHERE form_id = ?",
    )
    .bind(form.name_in_apply_json.to_json_string()?)
    .bind(&form.runner_publish_name)
    .bind(form.form_json.as_ref().map(|v| v.to_string()))
    .bind(&form.template_name)
    .bind(form.audit_info.as_ref().map(|v| v.to_string()))
    .bind(form.form_id.to_string())
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update form '{}'", form.form_id))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Form with id {} not found", form.form_id);
    }

    Ok(())
}

/// Persist the assembled runner document for a form.
pub async fn store_form_json(pool: &SqlitePool, form_id: Uuid, form_json: &serde_json::Value) -> Result<()> {
    let result = sqlx::query(
        "UPDATE form SET form_json = ?, updated_at = CURRENT_TIMESTAMP WHERE form_id = ?",
    )
    .bind(form_json.to_string())
    .bind(form_id.to_string())
    .execute(pool)
    .await
    .with_context(|| format!("Failed to store form json for '{}'", form_id))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Form with id {} not found", form_id);
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Swap a section with its neighbour and rewrite the contiguous 1..N
/// ordering. Moving the first section up (or the last down) is a no-op.
pub async fn move_section(
    pool: &SqlitePool,
    round_id: Uuid,
    section_id: Uuid,
    direction: MoveDirection,
) -> Result<()> {
    let mut sections = sections_for_round(pool, round_id).await?;
    let position = sections
        .iter()
        .position(|s| s.section_id == section_id)
        .with_context(|| format!("Section with id {} not found", section_id))?;

    let neighbour = match direction {
        MoveDirection::Up => position.wrapping_sub(1),
        MoveDirection::Down => position + 1,
    };
    ordering::swap_elements(&mut sections, position, neighbour);

    let mut tx = pool.begin().await.context("Failed to start section move")?;
    for (i, section) in sections.iter().enumerate() {
        sqlx::query("UPDATE section SET index_in_round = ? WHERE section_id = ?")
            .bind(ordering::next_index(i))
            .bind(section.section_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to reindex sections")?;
    }
    tx.commit().await.context("Failed to commit section move")?;

    log::debug!("Moved section {} {:?} in round {}", section_id, direction, round_id);
    Ok(())
}

/// Swap a form with its neighbour within its section, as [`move_section`]
/// does for sections.
pub async fn move_form(
    pool: &SqlitePool,
    section_id: Uuid,
    form_id: Uuid,
    direction: MoveDirection,
) -> Result<()> {
    let mut forms = forms_for_section(pool, section_id).await?;
    let position = forms
        .iter()
        .position(|f| f.form_id == form_id)
        .with_context(|| format!("Form with id {} not found", form_id))?;

    let neighbour = match direction {
        MoveDirection::Up => position.wrapping_sub(1),
        MoveDirection::Down => position + 1,
    };
    ordering::swap_elements(&mut forms, position, neighbour);

    let mut tx = pool.begin().await.context("Failed to start form move")?;
    for (i, form) in forms.iter().enumerate() {
        sqlx::query("UPDATE form SET section_index = ? WHERE form_id = ?")
            .bind(ordering::next_index(i))
            .bind(form.form_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to reindex forms")?;
    }
    tx.commit().await.context("Failed to commit form move")?;

    log::debug!("Moved form {} {:?} in section {}", form_id, direction, section_id);
    Ok(())
}

/// Delete a section from a round. Without `cascade` the section must be
/// empty; with it, every form underneath goes too. Remaining sections are
/// renumbered to stay contiguous.
pub async fn delete_section_from_round(
    pool: &SqlitePool,
    round_id: Uuid,
    section_id: Uuid,
    cascade: bool,
) -> Result<()> {
    let section = get_section_by_id(pool, section_id).await?;
    if section.round_id != Some(round_id) {
        anyhow::bail!("Section {} does not belong to round {}", section_id, round_id);
    }

    let forms = forms_for_section(pool, section_id).await?;
    if !cascade && !forms.is_empty() {
        anyhow::bail!(
            "Section {} still contains {} form(s); delete them first or cascade",
            section_id,
            forms.len()
        );
    }

    let mut tx = pool.begin().await.context("Failed to start section delete")?;

    for form in &forms {
        delete_form_subtree(&mut tx, form.form_id).await?;
    }

    sqlx::query("DELETE FROM section WHERE section_id = ?")
        .bind(section_id.to_string())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to delete section '{}'", section_id))?;

    renumber_sections(&mut tx, round_id).await?;

    tx.commit().await.context("Failed to commit section delete")?;
    log::info!("Deleted section: {}", section_id);
    Ok(())
}

/// Delete a form from a section. Without `cascade` the form must have no
/// pages. Remaining forms are renumbered.
pub async fn delete_form_from_section(
    pool: &SqlitePool,
    section_id: Uuid,
    form_id: Uuid,
    cascade: bool,
) -> Result<()> {
    let form = get_form_by_id(pool, form_id).await?;
    if form.section_id != Some(section_id) {
        anyhow::bail!("Form {} does not belong to section {}", form_id, section_id);
    }

    let (page_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM page WHERE form_id = ?")
        .bind(form_id.to_string())
        .fetch_one(pool)
        .await
        .context("Failed to count pages for form")?;

    if !cascade && page_count > 0 {
        anyhow::bail!(
            "Form {} still contains {} page(s); delete them first or cascade",
            form_id,
            page_count
        );
    }

    let mut tx = pool.begin().await.context("Failed to start form delete")?;

    delete_form_subtree(&mut tx, form_id).await?;
    renumber_forms(&mut tx, section_id).await?;

    tx.commit().await.context("Failed to commit form delete")?;
    log::info!("Deleted form: {}", form_id);
    Ok(())
}

/// Delete a form together with its pages, components, conditions and page
/// conditions, bottom-up.
pub(crate) async fn delete_form_subtree(
    tx: &mut Transaction<'_, Sqlite>,
    form_id: Uuid,
) -> Result<()> {
    let pages = "SELECT page_id FROM page WHERE form_id = ?";

    // Children of multi-input components may carry no page link of their
    // own, so they are deleted through their parent first.
    for statement in [
        format!("DELETE FROM page_condition WHERE page_id IN ({})", pages),
        "DELETE FROM condition WHERE form_id = ?".to_string(),
        format!(
            "DELETE FROM component WHERE parent_component_id IN \
             (SELECT component_id FROM component WHERE page_id IN ({}))",
            pages
        ),
        format!("DELETE FROM component WHERE page_id IN ({})", pages),
        "DELETE FROM page WHERE form_id = ?".to_string(),
        "DELETE FROM form WHERE form_id = ?".to_string(),
    ] {
        sqlx::query(&statement)
            .bind(form_id.to_string())
            .execute(&mut **tx)
            .await
            .with_context(|| format!("Failed to delete form subtree for '{}'", form_id))?;
    }

    Ok(())
}

async fn renumber_sections(tx: &mut Transaction<'_, Sqlite>, round_id: Uuid) -> Result<()> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT section_id FROM section WHERE round_id = ? ORDER BY index_in_round",
    )
    .bind(round_id.to_string())
    .fetch_all(&mut **tx)
    .await
    .context("Failed to load sections for renumbering")?;

    for (i, (section_id,)) in rows.iter().enumerate() {
        sqlx::query("UPDATE section SET index_in_round = ? WHERE section_id = ?")
            .bind(ordering::next_index(i))
            .bind(section_id)
            .execute(&mut **tx)
            .await
            .context("Failed to renumber sections")?;
    }

    Ok(())
}

async fn renumber_forms(tx: &mut Transaction<'_, Sqlite>, section_id: Uuid) -> Result<()> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT form_id FROM form WHERE section_id = ? ORDER BY section_index")
            .bind(section_id.to_string())
            .fetch_all(&mut **tx)
            .await
            .context("Failed to load forms for renumbering")?;

    for (i, (form_id,)) in rows.iter().enumerate() {
        sqlx::query("UPDATE form SET section_index = ? WHERE form_id = ?")
            .bind(ordering::next_index(i))
            .bind(form_id)
            .execute(&mut **tx)
            .await
            .context("Failed to renumber forms")?;
    }

    Ok(())
}
