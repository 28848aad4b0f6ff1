//! Assembles runner documents from stored application config.

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::db::models::{ComponentTree, Condition, FormTree, PageTree};
use crate::export::helpers::human_to_kebab_case;
use crate::runner::document::{
    summary_page, ConditionJson, FormDocument, FormSectionJson, ListJson, NextLink, PageJson,
};

const START_CONTROLLER: &str = "./pages/start.js";
const SUMMARY_CONTROLLER: &str = "summary.js";

/// Build the runner document for a form. Inserts a start page when the form
/// has none and a summary page at the end, then wires up navigation,
/// conditions and list definitions.
pub fn build_form_json(tree: &FormTree, fund_title: Option<&str>) -> FormDocument {
    let mut document = FormDocument {
        start_page: None,
        pages: Vec::new(),
        lists: Vec::new(),
        conditions: Vec::new(),
        sections: Vec::new(),
        outputs: Vec::new(),
        skip_summary: false,
        name: match fund_title {
            Some(title) => format!("Apply for {}", title),
            None => "Access Funding".to_string(),
        },
    };

    for page_tree in &tree.pages {
        document.pages.push(build_page(page_tree));
        if let Some(form_section) = &page_tree.form_section {
            let already_there = document.sections.iter().any(|s| s.name == form_section.name);
            if !already_there {
                document.sections.push(FormSectionJson {
                    name: form_section.name.clone(),
                    title: form_section.title.clone(),
                    hide_title: form_section.hide_title,
                });
            }
        }
    }

    // Reuse an existing start page, otherwise synthesize one at the end of
    // the page list.
    let existing_start = tree.pages.iter().find(|p| {
        p.page
            .controller
            .as_deref()
            .is_some_and(|c| c.ends_with(START_CONTROLLER))
    });
    match existing_start {
        Some(page_tree) => {
            document.start_page = Some(format!("/{}", page_tree.page.display_path));
        }
        None => {
            let start = build_start_page(None, tree);
            document.start_page = Some(start.path.clone());
            document.pages.push(start);
        }
    }

    build_navigation(&mut document, tree);
    document.lists = build_lists(&mut document.pages, tree);

    let has_summary = tree.pages.iter().any(|p| {
        p.page
            .controller
            .as_deref()
            .is_some_and(|c| c.ends_with(SUMMARY_CONTROLLER))
    });
    if !has_summary {
        document.pages.push(summary_page());
    }

    document
}

/// Build the runner page object, components included.
pub fn build_page(page_tree: &PageTree) -> PageJson {
    let page = &page_tree.page;
    let mut built = PageJson::new(
        format!("/{}", page.display_path),
        page.name_in_apply_json.en.clone(),
    );
    built.section = page_tree.form_section.as_ref().map(|fs| fs.name.clone());
    built.options = page.options.clone();
    // A null controller element breaks the runner, so it is only present
    // when set.
    built.controller = page.controller.clone();

    for component in &page_tree.components {
        built.components.push(build_component(component));
    }

    built
}

/// Build the runner component object. Read-only types use a reduced shape
/// with null entries stripped; everything else carries hint and metadata.
pub fn build_component(tree: &ComponentTree) -> Value {
    let component = &tree.component;
    let component_type = component.component_type;

    let mut built = if component_type.is_read_only() {
        let mut map = Map::new();
        map.insert("type".into(), json!(component_type.as_str()));
        if let Some(content) = &component.content {
            map.insert("content".into(), json!(content));
        }
        map.insert("options".into(), component.options.clone().unwrap_or_else(|| json!({})));
        map.insert("schema".into(), component.schema.clone().unwrap_or_else(|| json!({})));
        if let Some(title) = &component.title {
            map.insert("title".into(), json!(title));
        }
        map.insert("name".into(), json!(component.runner_component_name));
        map
    } else {
        let mut map = Map::new();
        map.insert("options".into(), component.options.clone().unwrap_or_else(|| json!({})));
        map.insert("type".into(), json!(component_type.as_str()));
        map.insert("title".into(), json!(component.title));
        map.insert("hint".into(), json!(component.hint_text.clone().unwrap_or_default()));
        map.insert("schema".into(), component.schema.clone().unwrap_or_else(|| json!({})));
        map.insert("name".into(), json!(component.runner_component_name));
        map.insert("metadata".into(), json!({}));
        map
    };

    if component_type.is_yes_no() {
        // Implicit list, no stored definition.
        built.insert("values".into(), json!({"type": "listRef"}));
    } else if let Some(list) = &tree.list {
        built.insert("list".into(), json!(list.name));
        if let Some(Value::Object(metadata)) = built.get_mut("metadata") {
            metadata.insert(
                "fund_builder_list_id".into(),
                json!(component.list_id.map(|id| id.to_string())),
            );
        }
        built.insert("values".into(), json!({"type": "listRef"}));
    }

    if component_type.is_multi_input() {
        let children: Vec<Value> = tree.children.iter().map(build_component).collect();
        built.insert("children".into(), Value::Array(children));
    }

    Value::Object(built)
}

/// Translate stored conditions into the runner's condition array.
pub fn build_conditions(conditions: &[Condition]) -> Vec<ConditionJson> {
    conditions
        .iter()
        .map(|condition| ConditionJson {
            display_name: condition.display_name.clone(),
            name: condition.name.clone(),
            value: condition.value.clone(),
        })
        .collect()
}

/// Wire up the `next` edges: the default next page, conditional branches,
/// and the `/summary` fallback for dead ends.
fn build_navigation(document: &mut FormDocument, tree: &FormTree) {
    document.conditions = build_conditions(&tree.conditions);

    for page_tree in &tree.pages {
        let page = &page_tree.page;
        if page
            .controller
            .as_deref()
            .is_some_and(|c| c.ends_with(SUMMARY_CONTROLLER))
        {
            continue;
        }

        let path = format!("/{}", page.display_path);
        let Some(built_page) = document.pages.iter_mut().find(|p| p.path == path) else {
            continue;
        };

        let default_next = page.default_next_page_id.and_then(|next_id| {
            tree.pages
                .iter()
                .find(|p| p.page.page_id == next_id)
                .map(|p| p.page.display_path.clone())
        });
        if let Some(next_path) = &default_next {
            built_page.next.push(NextLink {
                path: format!("/{}", next_path),
                condition: None,
            });
        }

        let mut has_conditions = false;
        for page_condition in tree
            .page_conditions
            .iter()
            .filter(|pc| pc.page_id == page.page_id)
        {
            let Some(condition) = tree
                .conditions
                .iter()
                .find(|c| c.condition_id == page_condition.condition_id)
            else {
                continue;
            };
            has_conditions = true;
            built_page.next.push(NextLink {
                path: page_condition.destination_page_path.clone(),
                condition: Some(condition.name.clone()),
            });
        }

        if !has_conditions && default_next.is_none() {
            built_page.next.push(NextLink {
                path: "/summary".to_string(),
                condition: None,
            });
        }
    }
}

/// Collect the list definitions referenced by the built pages, deduplicated
/// by name (first reference wins), and strip the `metadata` bookkeeping from
/// the component JSON. Children of multi-input components are processed in
/// place of their parent.
fn build_lists(pages: &mut [PageJson], tree: &FormTree) -> Vec<ListJson> {
    let mut lists = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    for page in pages.iter_mut() {
        for component in page.components.iter_mut() {
            let is_multi_input_parent = component.get("type").and_then(Value::as_str)
                == Some("MultiInputField")
                && component
                    .get("children")
                    .and_then(Value::as_array)
                    .is_some_and(|c| !c.is_empty());

            if is_multi_input_parent {
                if let Some(children) = component.get_mut("children").and_then(Value::as_array_mut)
                {
                    for child in children {
                        collect_list(child, tree, &mut seen_names, &mut lists);
                    }
                }
            } else {
                collect_list(component, tree, &mut seen_names, &mut lists);
            }
        }
    }

    lists
}

fn collect_list(
    component: &mut Value,
    tree: &FormTree,
    seen_names: &mut HashSet<String>,
    lists: &mut Vec<ListJson>,
) {
    let list_id = component
        .get("metadata")
        .and_then(|m| m.get("fund_builder_list_id"))
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok());

    if let Some(list_id) = list_id {
        if let Some(list) = find_list(tree, list_id) {
            if seen_names.insert(list.name.clone()) {
                lists.push(ListJson {
                    list_type: list.list_type.clone(),
                    items: list.items.clone(),
                    name: list.name.clone(),
                    title: list.title.clone(),
                });
            }
        }
    }

    if let Some(map) = component.as_object_mut() {
        map.remove("metadata");
    }
}

fn find_list(tree: &FormTree, list_id: Uuid) -> Option<&crate::db::models::ListDef> {
    for page in &tree.pages {
        for component in &page.components {
            if let Some(list) = &component.list {
                if list.list_id == list_id {
                    return Some(list);
                }
            }
            for child in &component.children {
                if let Some(list) = &child.list {
                    if list.list_id == list_id {
                        return Some(list);
                    }
                }
            }
        }
    }
    None
}

/// The generated start page: an Html component with a bullet list of the
/// form's page headings, linked to the first page.
fn build_start_page(content: Option<&str>, tree: &FormTree) -> PageJson {
    let form_name = &tree.form.name_in_apply_json.en;
    let mut start = PageJson::new(
        format!("/intro-{}", human_to_kebab_case(form_name)),
        form_name.clone(),
    );
    start.controller = Some(START_CONTROLLER.to_string());

    let mut ask_about = String::new();
    if !tree.pages.is_empty() {
        ask_about.push_str("<p class=\"govuk-body\">We will ask you about:</p> <ul>");
        for page_tree in &tree.pages {
            if page_tree
                .page
                .controller
                .as_deref()
                .is_some_and(|c| c.ends_with(SUMMARY_CONTROLLER))
            {
                continue;
            }
            ask_about.push_str(&format!("<li>{}</li>", page_tree.page.name_in_apply_json.en));
        }
        ask_about.push_str("</ul>");

        start.next.push(NextLink {
            path: format!("/{}", tree.pages[0].page.display_path),
            condition: None,
        });
    }

    start.components.push(json!({
        "name": "start-page-content",
        "options": {},
        "type": "Html",
        "content": format!("<p class=\"govuk-body\">{}</p>{}", content.unwrap_or(""), ask_about),
        "schema": {},
    }));

    start
}
