//! Imports runner documents back into relational rows as reusable
//! templates.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{
    Component, ComponentType, Condition, Form, FormSection, I18nText, ListDef, Page, PageCondition,
};
use crate::db::repository::{application, pages};
use crate::export::helpers::human_to_kebab_case;
use crate::runner::document::{FormDocument, PageJson};

const DEFAULT_FORM_SECTION: &str = "FabDefault";

/// Load a runner document as a template form: the form row plus all its
/// sections, lists, conditions, pages and components, in one transaction.
pub async fn load_form_as_template(
    pool: &SqlitePool,
    document: &Value,
    template_name: Option<&str>,
    filename: &str,
) -> Result<Form> {
    let parsed: FormDocument =
        serde_json::from_value(document.clone()).context("Failed to parse form document")?;

    let stem = filename.split('.').next().unwrap_or(filename);
    let form_name = if parsed.name.is_empty() {
        start_page_title(&parsed)?
    } else {
        parsed.name.clone()
    };
    let template_name = template_name.map(str::to_string).unwrap_or_else(|| stem.to_string());

    let form = Form {
        form_id: Uuid::new_v4(),
        section_id: None,
        name_in_apply_json: I18nText::new(form_name),
        section_index: 0,
        runner_publish_name: Some(human_to_kebab_case(stem)),
        form_json: Some(document.clone()),
        template_name: Some(template_name),
        is_template: true,
        source_template_id: None,
        audit_info: None,
        created_at: None,
        updated_at: None,
    };

    let mut tx = pool.begin().await.context("Failed to start template import")?;

    application::insert_form_row(&mut *tx, &form, None).await?;
    insert_form_config(&mut tx, &parsed, form.form_id).await?;

    tx.commit().await.context("Failed to commit template import")?;
    log::info!("Imported form template with form_id: '{}'", form.form_id);
    Ok(form)
}

fn start_page_title(document: &FormDocument) -> Result<String> {
    let start_path = document
        .start_page
        .as_deref()
        .context("Form document has neither a name nor a start page")?;
    document
        .pages
        .iter()
        .find(|p| p.path == start_path)
        .map(|p| p.title.clone())
        .with_context(|| format!("Start page '{}' not found in document", start_path))
}

async fn insert_form_config(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    document: &FormDocument,
    form_id: Uuid,
) -> Result<()> {
    let form_sections = insert_form_sections(tx, document).await?;
    let list_ids = insert_lists(tx, document).await?;
    let condition_ids = insert_conditions(tx, document, form_id).await?;

    let mut inserted_pages: Vec<(Page, &PageJson)> = Vec::new();

    for (page_index, page_json) in document.pages.iter().enumerate() {
        let section_name = page_json.section.as_deref().unwrap_or(DEFAULT_FORM_SECTION);
        let form_section_id = form_sections
            .get(section_name)
            .copied()
            .with_context(|| format!("Form section '{}' not found in document", section_name))?;

        let page = Page {
            page_id: Uuid::new_v4(),
            form_id: Some(form_id),
            display_path: page_json.path.trim_start_matches('/').to_string(),
            name_in_apply_json: I18nText::new(&page_json.title),
            form_index: Some(page_index as i64 + 1),
            controller: page_json.controller.clone(),
            options: page_json.options.clone(),
            form_section_id: Some(form_section_id),
            default_next_page_id: None,
            is_template: true,
            template_name: Some(page_json.title.clone()),
            source_template_id: None,
        };
        pages::insert_page(&mut *tx, &page).await?;

        for (component_index, component_json) in page_json.components.iter().enumerate() {
            let component = component_from_json(
                component_json,
                Some(page.page_id),
                None,
                component_index as i64 + 1,
                &list_ids,
            )?;
            pages::insert_component(&mut *tx, &component).await?;

            if component.component_type.is_multi_input() {
                let children = component_json
                    .get("children")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                for (child_index, child_json) in children.iter().enumerate() {
                    let child = component_from_json(
                        child_json,
                        None,
                        Some(component.component_id),
                        child_index as i64 + 1,
                        &list_ids,
                    )?;
                    pages::insert_component(&mut *tx, &child).await?;
                }
            }
        }

        // Conditional next edges become page conditions.
        for next in &page_json.next {
            let Some(condition_name) = &next.condition else {
                continue;
            };
            let condition_id = condition_ids
                .get(condition_name.as_str())
                .copied()
                .with_context(|| format!("Condition '{}' not found in document", condition_name))?;
            pages::insert_page_condition(
                &mut *tx,
                &PageCondition {
                    page_condition_id: Uuid::new_v4(),
                    condition_id,
                    page_id: page.page_id,
                    destination_page_path: next.path.clone(),
                },
            )
            .await?;
        }

        inserted_pages.push((page, page_json));
    }

    // Default next pointers come from the first unconditional next edge.
    for (page, page_json) in &inserted_pages {
        let Some(default_next) = page_json.next.iter().find(|n| n.condition.is_none()) else {
            continue;
        };
        let target_path = default_next.path.trim_start_matches('/');
        let Some((target, _)) = inserted_pages
            .iter()
            .find(|(p, _)| p.display_path == target_path)
        else {
            continue;
        };

        sqlx::query("UPDATE page SET default_next_page_id = ? WHERE page_id = ?")
            .bind(target.page_id.to_string())
            .bind(page.page_id.to_string())
            .execute(&mut **tx)
            .await
            .context("Failed to set default next page")?;
    }

    Ok(())
}

async fn insert_form_sections(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    document: &FormDocument,
) -> Result<HashMap<String, Uuid>> {
    let mut inserted = HashMap::new();

    for section in &document.sections {
        let form_section = FormSection {
            form_section_id: Uuid::new_v4(),
            name: section.name.clone(),
            title: section.title.clone(),
            hide_title: section.hide_title,
            is_template: true,
        };
        pages::insert_form_section(&mut *tx, &form_section).await?;
        inserted.insert(form_section.name.clone(), form_section.form_section_id);
    }

    // Pages without a section land in a hidden default one.
    let page_without_section = document.pages.iter().any(|p| p.section.is_none());
    if page_without_section && !inserted.contains_key(DEFAULT_FORM_SECTION) {
        let form_section = FormSection {
            form_section_id: Uuid::new_v4(),
            name: DEFAULT_FORM_SECTION.to_string(),
            title: "Default section".to_string(),
            hide_title: true,
            is_template: true,
        };
        pages::insert_form_section(&mut *tx, &form_section).await?;
        inserted.insert(form_section.name.clone(), form_section.form_section_id);
    }

    Ok(inserted)
}

async fn insert_lists(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    document: &FormDocument,
) -> Result<HashMap<String, Uuid>> {
    let mut list_ids = HashMap::new();

    for list_json in &document.lists {
        let list = ListDef {
            list_id: Uuid::new_v4(),
            name: list_json.name.clone(),
            list_type: list_json.list_type.clone(),
            items: list_json.items.clone(),
            title: list_json.title.clone(),
            is_template: true,
        };
        pages::insert_list(&mut *tx, &list).await?;
        list_ids.insert(list.name.clone(), list.list_id);
    }

    Ok(list_ids)
}

async fn insert_conditions(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    document: &FormDocument,
    form_id: Uuid,
) -> Result<HashMap<String, Uuid>> {
    let mut condition_ids = HashMap::new();

    for condition_json in &document.conditions {
        let condition = Condition {
            condition_id: Uuid::new_v4(),
            form_id: Some(form_id),
            name: condition_json.name.clone(),
            display_name: condition_json.display_name.clone(),
            value: condition_json.value.clone(),
            is_template: true,
        };
        pages::insert_condition(&mut *tx, &condition).await?;
        condition_ids.insert(condition.name.clone(), condition.condition_id);
    }

    Ok(condition_ids)
}

fn component_from_json(
    component_json: &Value,
    page_id: Option<Uuid>,
    parent_component_id: Option<Uuid>,
    page_index: i64,
    list_ids: &HashMap<String, Uuid>,
) -> Result<Component> {
    let component_type_name = component_json
        .get("type")
        .and_then(Value::as_str)
        .context("Component has no type")?;
    let component_type = ComponentType::parse(component_type_name)?;

    let as_str = |key: &str| {
        component_json
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let list_id = component_json
        .get("list")
        .and_then(Value::as_str)
        .and_then(|name| list_ids.get(name).copied());

    Ok(Component {
        component_id: Uuid::new_v4(),
        page_id,
        parent_component_id,
        title: as_str("title"),
        hint_text: as_str("hint"),
        content: as_str("content"),
        options: component_json.get("options").filter(|v| !v.is_null()).cloned(),
        schema: component_json.get("schema").filter(|v| !v.is_null()).cloned(),
        component_type,
        page_index: Some(page_index),
        runner_component_name: as_str("name").context("Component has no name")?,
        list_id,
        is_template: true,
        template_name: as_str("title"),
        source_template_id: None,
    })
}
