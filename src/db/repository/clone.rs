//! Cloning of rounds, sections and forms. Source data is snapshotted up
//! front, then every write runs in a single transaction. Cloned entities
//! get fresh ids and record where they came from in `source_template_id`.

use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::db::models::{Component, Condition, Form, ListDef, Page, PageCondition, Round, Section};
use crate::db::repository::{application, pages, rounds};
use crate::ordering;

struct FormSnapshot {
    form: Form,
    pages: Vec<PageSnapshot>,
    conditions: Vec<Condition>,
    page_conditions: Vec<PageCondition>,
    lists: HashMap<Uuid, ListDef>,
}

struct PageSnapshot {
    page: Page,
    components: Vec<(Component, Vec<Component>)>,
}

struct SectionSnapshot {
    section: Section,
    forms: Vec<FormSnapshot>,
}

/// Clone a round into a (possibly different) fund under a new short name.
/// The title gets the "Copy of" / "Copi o" prefix and `section_base_path` is
/// cleared so the copy is assigned its own base path on first export.
pub async fn clone_round(
    pool: &SqlitePool,
    round_id: Uuid,
    target_fund_id: Uuid,
    new_short_name: &str,
) -> Result<Round> {
    let source = rounds::get_round_by_id(pool, round_id).await?;
    crate::db::repository::funds::get_fund_by_id(pool, target_fund_id).await?;

    if rounds::get_round_by_short_name_and_fund(pool, target_fund_id, new_short_name)
        .await?
        .is_some()
    {
        anyhow::bail!(
            "Round short name '{}' is already in use for this fund",
            new_short_name
        );
    }

    let mut section_snapshots = Vec::new();
    for section in application::sections_for_round(pool, round_id).await? {
        section_snapshots.push(snapshot_section(pool, section).await?);
    }

    let mut cloned = source.clone();
    cloned.round_id = Uuid::new_v4();
    cloned.fund_id = target_fund_id;
    cloned.title = source.title.copy_prefixed();
    cloned.short_name = new_short_name.to_string();
    cloned.section_base_path = None;
    cloned.source_template_id = Some(source.round_id);
    cloned.is_template = false;
    cloned.template_name = None;

    let mut tx = pool.begin().await.context("Failed to start round clone")?;

    rounds::insert_round_row(&mut tx, &cloned).await?;
    for snapshot in &section_snapshots {
        let index = snapshot.section.index_in_round;
        write_section_clone(&mut tx, snapshot, cloned.round_id, index).await?;
    }

    tx.commit().await.context("Failed to commit round clone")?;
    log::info!("Cloned round {} as {}", round_id, cloned.round_id);
    Ok(cloned)
}

/// Clone a section (and its forms) onto the end of another round.
pub async fn clone_section(
    pool: &SqlitePool,
    section_id: Uuid,
    target_round_id: Uuid,
) -> Result<Section> {
    let source = application::get_section_by_id(pool, section_id).await?;
    rounds::get_round_by_id(pool, target_round_id).await?;

    let existing = application::sections_for_round(pool, target_round_id).await?;
    let index = ordering::next_index(existing.len());
    let snapshot = snapshot_section(pool, source).await?;

    let mut tx = pool.begin().await.context("Failed to start section clone")?;
    let cloned = write_section_clone(&mut tx, &snapshot, target_round_id, index).await?;
    tx.commit().await.context("Failed to commit section clone")?;

    log::info!("Cloned section {} as {}", section_id, cloned.section_id);
    Ok(cloned)
}

/// Clone a form (pages, components, conditions) onto the end of another
/// section.
pub async fn clone_form(pool: &SqlitePool, form_id: Uuid, target_section_id: Uuid) -> Result<Form> {
    let source = application::get_form_by_id(pool, form_id).await?;
    application::get_section_by_id(pool, target_section_id).await?;

    let existing = application::forms_for_section(pool, target_section_id).await?;
    let index = ordering::next_index(existing.len());
    let snapshot = snapshot_form(pool, source).await?;

    let mut tx = pool.begin().await.context("Failed to start form clone")?;
    let cloned = write_form_clone(&mut tx, &snapshot, target_section_id, index).await?;
    tx.commit().await.context("Failed to commit form clone")?;

    log::info!("Cloned form {} as {}", form_id, cloned.form_id);
    Ok(cloned)
}

async fn snapshot_section(pool: &SqlitePool, section: Section) -> Result<SectionSnapshot> {
    let mut forms = Vec::new();
    for form in application::forms_for_section(pool, section.section_id).await? {
        forms.push(snapshot_form(pool, form).await?);
    }
    Ok(SectionSnapshot { section, forms })
}

async fn snapshot_form(pool: &SqlitePool, form: Form) -> Result<FormSnapshot> {
    let mut page_snapshots = Vec::new();
    let mut lists: HashMap<Uuid, ListDef> = HashMap::new();
    for page in pages::pages_for_form(pool, form.form_id).await? {
        let mut components = Vec::new();
        for component in pages::components_for_page(pool, page.page_id).await? {
            snapshot_list(pool, &component, &mut lists).await?;
            let children = pages::child_components(pool, component.component_id).await?;
            for child in &children {
                snapshot_list(pool, child, &mut lists).await?;
            }
            components.push((component, children));
        }
        page_snapshots.push(PageSnapshot { page, components });
    }

    let conditions = pages::conditions_for_form(pool, form.form_id).await?;
    let page_conditions = pages::page_conditions_for_form(pool, form.form_id).await?;

    Ok(FormSnapshot {
        form,
        pages: page_snapshots,
        conditions,
        page_conditions,
        lists,
    })
}

async fn snapshot_list(
    pool: &SqlitePool,
    component: &Component,
    lists: &mut HashMap<Uuid, ListDef>,
) -> Result<()> {
    if let Some(list_id) = component.list_id {
        if !lists.contains_key(&list_id) {
            lists.insert(list_id, pages::get_list_by_id(pool, list_id).await?);
        }
    }
    Ok(())
}

async fn write_section_clone(
    tx: &mut Transaction<'_, Sqlite>,
    snapshot: &SectionSnapshot,
    target_round_id: Uuid,
    index_in_round: i64,
) -> Result<Section> {
    let source = &snapshot.section;
    let mut cloned = source.clone();
    cloned.section_id = Uuid::new_v4();
    cloned.round_id = Some(target_round_id);
    cloned.index_in_round = index_in_round;
    cloned.source_template_id = Some(source.section_id);
    cloned.is_template = false;
    cloned.template_name = None;

    application::insert_section_row(&mut *tx, &cloned, None).await?;

    for form_snapshot in &snapshot.forms {
        let index = form_snapshot.form.section_index;
        write_form_clone(tx, form_snapshot, cloned.section_id, index).await?;
    }

    Ok(cloned)
}

async fn write_form_clone(
    tx: &mut Transaction<'_, Sqlite>,
    snapshot: &FormSnapshot,
    target_section_id: Uuid,
    section_index: i64,
) -> Result<Form> {
    let source = &snapshot.form;
    let mut cloned = source.clone();
    cloned.form_id = Uuid::new_v4();
    cloned.section_id = Some(target_section_id);
    cloned.section_index = section_index;
    cloned.runner_publish_name = None;
    cloned.source_template_id = Some(source.form_id);
    cloned.is_template = false;
    cloned.template_name = None;

    application::insert_form_row(&mut *tx, &cloned, None).await?;

    // Pages first, keeping a source -> clone id map so default-next pointers
    // can be re-targeted once every page exists. Lists get the same
    // treatment: the copy owns fresh list rows, shared where the source
    // shared them, so editing a cloned list never touches the source form.
    let mut page_id_map: HashMap<Uuid, Uuid> = HashMap::new();
    let mut list_id_map: HashMap<Uuid, Uuid> = HashMap::new();

    for page_snapshot in &snapshot.pages {
        let page = &page_snapshot.page;
        let mut cloned_page = page.clone();
        cloned_page.page_id = Uuid::new_v4();
        cloned_page.form_id = Some(cloned.form_id);
        cloned_page.source_template_id = Some(page.page_id);
        cloned_page.is_template = false;
        cloned_page.template_name = None;

        page_id_map.insert(page.page_id, cloned_page.page_id);
        pages::insert_page(&mut *tx, &cloned_page).await?;

        for (component, children) in &page_snapshot.components {
            let mut cloned_component = component.clone();
            cloned_component.component_id = Uuid::new_v4();
            cloned_component.page_id = Some(cloned_page.page_id);
            cloned_component.source_template_id = Some(component.component_id);
            cloned_component.is_template = false;
            cloned_component.template_name = None;
            if let Some(list_id) = component.list_id {
                cloned_component.list_id =
                    Some(cloned_list_id(tx, &snapshot.lists, &mut list_id_map, list_id).await?);
            }

            pages::insert_component(&mut *tx, &cloned_component).await?;

            for child in children {
                let mut cloned_child = child.clone();
                cloned_child.component_id = Uuid::new_v4();
                cloned_child.page_id = Some(cloned_page.page_id);
                cloned_child.parent_component_id = Some(cloned_component.component_id);
                cloned_child.source_template_id = Some(child.component_id);
                cloned_child.is_template = false;
                cloned_child.template_name = None;
                if let Some(list_id) = child.list_id {
                    cloned_child.list_id =
                        Some(cloned_list_id(tx, &snapshot.lists, &mut list_id_map, list_id).await?);
                }

                pages::insert_component(&mut *tx, &cloned_child).await?;
            }
        }
    }

    // Re-point default-next references at the cloned pages. A pointer whose
    // target was not cloned (cross-form reference) is dropped.
    for page_snapshot in &snapshot.pages {
        let page = &page_snapshot.page;
        let Some(source_next) = page.default_next_page_id else {
            continue;
        };
        let cloned_page_id = page_id_map[&page.page_id];
        let new_next = page_id_map.get(&source_next).copied();

        sqlx::query("UPDATE page SET default_next_page_id = ? WHERE page_id = ?")
            .bind(new_next.map(|id| id.to_string()))
            .bind(cloned_page_id.to_string())
            .execute(&mut **tx)
            .await
            .context("Failed to re-point cloned page navigation")?;
    }

    // Conditions and their branch targets.
    let mut condition_id_map: HashMap<Uuid, Uuid> = HashMap::new();

    for condition in &snapshot.conditions {
        let cloned_condition = Condition {
            condition_id: Uuid::new_v4(),
            form_id: Some(cloned.form_id),
            name: condition.name.clone(),
            display_name: condition.display_name.clone(),
            value: condition.value.clone(),
            is_template: false,
        };
        condition_id_map.insert(condition.condition_id, cloned_condition.condition_id);
        pages::insert_condition(&mut *tx, &cloned_condition).await?;
    }

    for page_condition in &snapshot.page_conditions {
        let (Some(new_condition_id), Some(new_page_id)) = (
            condition_id_map.get(&page_condition.condition_id).copied(),
            page_id_map.get(&page_condition.page_id).copied(),
        ) else {
            continue;
        };

        let cloned_page_condition = PageCondition {
            page_condition_id: Uuid::new_v4(),
            condition_id: new_condition_id,
            page_id: new_page_id,
            destination_page_path: page_condition.destination_page_path.clone(),
        };
        pages::insert_page_condition(&mut *tx, &cloned_page_condition).await?;
    }

    Ok(cloned)
}

/// Look up (or insert) the clone of a source list within this form clone.
async fn cloned_list_id(
    tx: &mut Transaction<'_, Sqlite>,
    lists: &HashMap<Uuid, ListDef>,
    list_id_map: &mut HashMap<Uuid, Uuid>,
    source_list_id: Uuid,
) -> Result<Uuid> {
    if let Some(id) = list_id_map.get(&source_list_id) {
        return Ok(*id);
    }

    let source = lists.get(&source_list_id).with_context(|| {
        format!("List {} referenced by a component was not snapshotted", source_list_id)
    })?;
    let mut cloned = source.clone();
    cloned.list_id = Uuid::new_v4();
    cloned.is_template = false;

    pages::insert_list(&mut *tx, &cloned).await?;
    list_id_map.insert(source_list_id, cloned.list_id);
    Ok(cloned.list_id)
}
