//! Repository for pages, components, lists, form sections and conditions,
//! plus the aggregate loader used by document assembly.

use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::models::{
    Component, ComponentTree, Condition, DbComponent, DbCondition, DbFormSection, DbListDef,
    DbPage, DbPageCondition, FormSection, FormTree, ListDef, Page, PageCondition, PageTree,
};
use crate::db::repository::application;

pub(crate) const PAGE_COLUMNS: &str = "page_id, form_id, display_path, name_in_apply_json, \
     form_index, controller, options, form_section_id, default_next_page_id, is_template, \
     template_name, source_template_id";

pub(crate) const COMPONENT_COLUMNS: &str = "component_id, page_id, parent_component_id, title, \
     hint_text, content, options, component_schema, component_type, page_index, \
     runner_component_name, list_id, is_template, template_name, source_template_id";

pub async fn insert_page(conn: &mut SqliteConnection, page: &Page) -> Result<()> {
    sqlx::query(
        "INSERT INTO page (page_id, form_id, display_path, name_in_apply_json, form_index, \
         controller, options, form_section_id, default_next_page_id, is_template, template_name, \
         source_template_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(page.page_id.to_string())
    .bind(page.form_id.map(|id| id.to_string()))
    .bind(&page.display_path)
    .bind(page.name_in_apply_json.to_json_string()?)
    .bind(page.form_index)
    .bind(&page.controller)
    .bind(page.options.as_ref().map(|v| v.to_string()))
    .bind(page.form_section_id.map(|id| id.to_string()))
    .bind(page.default_next_page_id.map(|id| id.to_string()))
    .bind(page.is_template)
    .bind(&page.template_name)
    .bind(page.source_template_id.map(|id| id.to_string()))
    .execute(conn)
    .await
    .with_context(|| format!("Failed to insert page '{}'", page.display_path))?;

    Ok(())
}

pub async fn insert_component(conn: &mut SqliteConnection, component: &Component) -> Result<()> {
    sqlx::query(
        "INSERT INTO component (component_id, page_id, parent_component_id, title, hint_text, \
         content, options, component_schema, component_type, page_index, runner_component_name, \
         list_id, is_template, template_name, source_template_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(component.component_id.to_string())
    .bind(component.page_id.map(|id| id.to_string()))
    .bind(component.parent_component_id.map(|id| id.to_string()))
    .bind(&component.title)
    .bind(&component.hint_text)
    .bind(&component.content)
    .bind(component.options.as_ref().map(|v| v.to_string()))
    .bind(component.schema.as_ref().map(|v| v.to_string()))
    .bind(component.component_type.as_str())
    .bind(component.page_index)
    .bind(&component.runner_component_name)
    .bind(component.list_id.map(|id| id.to_string()))
    .bind(component.is_template)
    .bind(&component.template_name)
    .bind(component.source_template_id.map(|id| id.to_string()))
    .execute(conn)
    .await
    .with_context(|| {
        format!("Failed to insert component '{}'", component.runner_component_name)
    })?;

    Ok(())
}

pub async fn insert_list(conn: &mut SqliteConnection, list: &ListDef) -> Result<()> {
    sqlx::query(
        "INSERT INTO list_def (list_id, name, list_type, items, title, is_template) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(list.list_id.to_string())
    .bind(&list.name)
    .bind(&list.list_type)
    .bind(list.items.to_string())
    .bind(&list.title)
    .bind(list.is_template)
    .execute(conn)
    .await
    .with_context(|| format!("Failed to insert list '{}'", list.name))?;

    Ok(())
}

pub async fn insert_form_section(
    conn: &mut SqliteConnection,
    form_section: &FormSection,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO form_section (form_section_id, name, title, hide_title, is_template) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(form_section.form_section_id.to_string())
    .bind(&form_section.name)
    .bind(&form_section.title)
    .bind(form_section.hide_title)
    .bind(form_section.is_template)
    .execute(conn)
    .await
    .with_context(|| format!("Failed to insert form section '{}'", form_section.name))?;

    Ok(())
}

pub async fn insert_condition(conn: &mut SqliteConnection, condition: &Condition) -> Result<()> {
    sqlx::query(
        "INSERT INTO condition (condition_id, form_id, name, display_name, value, is_template) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(condition.condition_id.to_string())
    .bind(condition.form_id.map(|id| id.to_string()))
    .bind(&condition.name)
    .bind(&condition.display_name)
    .bind(serde_json::to_string(&condition.value).context("Failed to serialize condition value")?)
    .bind(condition.is_template)
    .execute(conn)
    .await
    .with_context(|| format!("Failed to insert condition '{}'", condition.name))?;

    Ok(())
}

pub async fn insert_page_condition(
    conn: &mut SqliteConnection,
    page_condition: &PageCondition,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO page_condition (page_condition_id, condition_id, page_id, \
         destination_page_path) VALUES (?, ?, ?, ?)",
    )
    .bind(page_condition.page_condition_id.to_string())
    .bind(page_condition.condition_id.to_string())
    .bind(page_condition.page_id.to_string())
    .bind(&page_condition.destination_page_path)
    .execute(conn)
    .await
    .context("Failed to insert page condition")?;

    Ok(())
}

pub async fn get_page_by_id(pool: &SqlitePool, page_id: Uuid) -> Result<Page> {
    let row: Option<DbPage> =
        sqlx::query_as(&format!("SELECT {} FROM page WHERE page_id = ?", PAGE_COLUMNS))
            .bind(page_id.to_string())
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get page '{}'", page_id))?;

    row.with_context(|| format!("Page with id {} not found", page_id))?
        .try_into()
}

pub async fn get_list_by_id(pool: &SqlitePool, list_id: Uuid) -> Result<ListDef> {
    let row: Option<DbListDef> = sqlx::query_as(
        "SELECT list_id, name, list_type, items, title, is_template FROM list_def WHERE list_id = ?",
    )
    .bind(list_id.to_string())
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get list '{}'", list_id))?;

    row.with_context(|| format!("List with id {} not found", list_id))?
        .try_into()
}

pub async fn get_form_section_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<FormSection>> {
    let row: Option<DbFormSection> = sqlx::query_as(
        "SELECT form_section_id, name, title, hide_title, is_template FROM form_section \
         WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get form section '{}'", name))?;

    row.map(FormSection::try_from).transpose()
}

/// Pages of a form in display order.
pub async fn pages_for_form(pool: &SqlitePool, form_id: Uuid) -> Result<Vec<Page>> {
    let rows: Vec<DbPage> = sqlx::query_as(&format!(
        "SELECT {} FROM page WHERE form_id = ? ORDER BY form_index",
        PAGE_COLUMNS
    ))
    .bind(form_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list pages for form '{}'", form_id))?;

    rows.into_iter().map(Page::try_from).collect()
}

/// Top-level components of a page in display order. Children of
/// multi-input components are fetched separately.
pub async fn components_for_page(pool: &SqlitePool, page_id: Uuid) -> Result<Vec<Component>> {
    let rows: Vec<DbComponent> = sqlx::query_as(&format!(
        "SELECT {} FROM component WHERE page_id = ? AND parent_component_id IS NULL \
         ORDER BY page_index",
        COMPONENT_COLUMNS
    ))
    .bind(page_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list components for page '{}'", page_id))?;

    rows.into_iter().map(Component::try_from).collect()
}

pub async fn child_components(pool: &SqlitePool, parent_id: Uuid) -> Result<Vec<Component>> {
    let rows: Vec<DbComponent> = sqlx::query_as(&format!(
        "SELECT {} FROM component WHERE parent_component_id = ? ORDER BY page_index",
        COMPONENT_COLUMNS
    ))
    .bind(parent_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list child components of '{}'", parent_id))?;

    rows.into_iter().map(Component::try_from).collect()
}

pub async fn conditions_for_form(pool: &SqlitePool, form_id: Uuid) -> Result<Vec<Condition>> {
    let rows: Vec<DbCondition> = sqlx::query_as(
        "SELECT condition_id, form_id, name, display_name, value, is_template FROM condition \
         WHERE form_id = ? ORDER BY name",
    )
    .bind(form_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list conditions for form '{}'", form_id))?;

    rows.into_iter().map(Condition::try_from).collect()
}

pub async fn page_conditions_for_form(
    pool: &SqlitePool,
    form_id: Uuid,
) -> Result<Vec<PageCondition>> {
    let rows: Vec<DbPageCondition> = sqlx::query_as(
        "SELECT pc.page_condition_id, pc.condition_id, pc.page_id, pc.destination_page_path \
         FROM page_condition pc JOIN page p ON p.page_id = pc.page_id \
         WHERE p.form_id = ?",
    )
    .bind(form_id.to_string())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list page conditions for form '{}'", form_id))?;

    rows.into_iter().map(PageCondition::try_from).collect()
}

/// Load everything document assembly needs for one form: pages in order,
/// each with its components (children and lists resolved) and form section,
/// plus the form's conditions and branch targets.
pub async fn load_form_tree(pool: &SqlitePool, form_id: Uuid) -> Result<FormTree> {
    let form = application::get_form_by_id(pool, form_id).await?;
    let pages = pages_for_form(pool, form_id).await?;

    let mut form_section_cache: HashMap<Uuid, FormSection> = HashMap::new();
    let mut page_trees = Vec::with_capacity(pages.len());

    for page in pages {
        let components = components_for_page(pool, page.page_id).await?;
        let mut trees = Vec::with_capacity(components.len());
        for component in components {
            trees.push(load_component_tree(pool, component).await?);
        }

        let form_section = match page.form_section_id {
            Some(id) => Some(match form_section_cache.get(&id) {
                Some(cached) => cached.clone(),
                None => {
                    let loaded = load_form_section(pool, id).await?;
                    form_section_cache.insert(id, loaded.clone());
                    loaded
                }
            }),
            None => None,
        };

        page_trees.push(PageTree {
            page,
            components: trees,
            form_section,
        });
    }

    let conditions = conditions_for_form(pool, form_id).await?;
    let page_conditions = page_conditions_for_form(pool, form_id).await?;

    Ok(FormTree {
        form,
        pages: page_trees,
        conditions,
        page_conditions,
    })
}

async fn load_component_tree(pool: &SqlitePool, component: Component) -> Result<ComponentTree> {
    let list = match component.list_id {
        Some(list_id) => Some(get_list_by_id(pool, list_id).await?),
        None => None,
    };

    let mut children = Vec::new();
    if component.component_type.is_multi_input() {
        for child in child_components(pool, component.component_id).await? {
            let child_list = match child.list_id {
                Some(list_id) => Some(get_list_by_id(pool, list_id).await?),
                None => None,
            };
            children.push(ComponentTree {
                component: child,
                children: Vec::new(),
                list: child_list,
            });
        }
    }

    Ok(ComponentTree {
        component,
        children,
        list,
    })
}

async fn load_form_section(pool: &SqlitePool, form_section_id: Uuid) -> Result<FormSection> {
    let row: Option<DbFormSection> = sqlx::query_as(
        "SELECT form_section_id, name, title, hide_title, is_template FROM form_section \
         WHERE form_section_id = ?",
    )
    .bind(form_section_id.to_string())
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get form section '{}'", form_section_id))?;

    row.with_context(|| format!("Form section with id {} not found", form_section_id))?
        .try_into()
}
