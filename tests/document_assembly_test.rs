//! Document assembly: navigation wiring, start and summary page synthesis,
//! condition branches and list collection, built from an in-memory tree.

mod common;

use serde_json::json;
use uuid::Uuid;

use fab::db::models::{
    Component, ComponentTree, ComponentType, Condition, ConditionValue, FormTree, ListDef,
    PageCondition, PageTree, SubCondition,
};
use fab::runner::build_form_json;

use common::{radios_component, sample_form, sample_page, text_component, yes_no_items};

fn page_tree(form_id: Uuid, path: &str, title: &str, index: i64) -> PageTree {
    PageTree {
        page: sample_page(form_id, path, title, index),
        components: Vec::new(),
        form_section: None,
    }
}

fn leaf(component: Component) -> ComponentTree {
    ComponentTree {
        component,
        children: Vec::new(),
        list: None,
    }
}

fn two_page_tree() -> FormTree {
    let form =
        sample_form(Uuid::new_v4(), "About your organisation", "about-your-organisation");
    let form_id = form.form_id;

    let mut first = page_tree(form_id, "organisation-name", "Organisation name", 1);
    let second = page_tree(form_id, "organisation-address", "Organisation address", 2);
    first.page.default_next_page_id = Some(second.page.page_id);
    first
        .components
        .push(leaf(text_component(first.page.page_id, "OrgName", "Name", 1)));

    FormTree {
        form,
        pages: vec![first, second],
        conditions: Vec::new(),
        page_conditions: Vec::new(),
    }
}

#[test]
fn names_the_document_after_the_fund() {
    let tree = two_page_tree();
    let with_fund = build_form_json(&tree, Some("funding to improve your town"));
    assert_eq!(with_fund.name, "Apply for funding to improve your town");

    let without_fund = build_form_json(&tree, None);
    assert_eq!(without_fund.name, "Access Funding");
}

#[test]
fn linear_navigation_follows_default_next() {
    let tree = two_page_tree();
    let document = build_form_json(&tree, None);

    let first = document
        .pages
        .iter()
        .find(|p| p.path == "/organisation-name")
        .unwrap();
    assert_eq!(first.next.len(), 1);
    assert_eq!(first.next[0].path, "/organisation-address");
    assert_eq!(first.next[0].condition, None);

    // Dead ends fall through to the summary.
    let second = document
        .pages
        .iter()
        .find(|p| p.path == "/organisation-address")
        .unwrap();
    assert_eq!(second.next.len(), 1);
    assert_eq!(second.next[0].path, "/summary");
}

#[test]
fn synthesizes_start_and_summary_pages() {
    let tree = two_page_tree();
    let document = build_form_json(&tree, None);

    assert_eq!(
        document.start_page.as_deref(),
        Some("/intro-about-your-organisation")
    );

    // Both synthesized pages are appended after the real ones.
    let start = document.pages.iter().find(|p| p.path == "/intro-about-your-organisation").unwrap();
    assert_eq!(start.controller.as_deref(), Some("./pages/start.js"));
    assert_eq!(start.next[0].path, "/organisation-name");
    let content = start.components[0]["content"].as_str().unwrap();
    assert!(content.contains("We will ask you about:"));
    assert!(content.contains("<li>Organisation name</li>"));

    let summary = document.pages.last().unwrap();
    assert_eq!(summary.path, "/summary");
    assert_eq!(summary.title, "Check your answers");
    assert_eq!(summary.controller.as_deref(), Some("./pages/summary.js"));
}

#[test]
fn reuses_an_existing_start_page() {
    let mut tree = two_page_tree();
    tree.pages[0].page.controller = Some("./pages/start.js".to_string());

    let document = build_form_json(&tree, None);
    assert_eq!(document.start_page.as_deref(), Some("/organisation-name"));
    assert!(!document.pages.iter().any(|p| p.path.starts_with("/intro-")));
}

#[test]
fn conditional_branches_replace_the_summary_fallback() {
    let mut tree = two_page_tree();
    let condition_id = Uuid::new_v4();
    tree.conditions.push(Condition {
        condition_id,
        form_id: Some(tree.form.form_id),
        name: "org_charity".to_string(),
        display_name: "Organisation is a charity".to_string(),
        value: ConditionValue {
            name: "org_charity".to_string(),
            conditions: vec![SubCondition {
                field: json!({"name": "OrgType", "type": "RadiosField", "display": "Type"}),
                operator: "is".to_string(),
                value: json!({"type": "Value", "value": "charity", "display": "charity"}),
                coordinator: None,
            }],
        },
        is_template: false,
    });
    tree.page_conditions.push(PageCondition {
        page_condition_id: Uuid::new_v4(),
        condition_id,
        page_id: tree.pages[1].page.page_id,
        destination_page_path: "/charity-details".to_string(),
    });

    let document = build_form_json(&tree, None);

    assert_eq!(document.conditions.len(), 1);
    assert_eq!(document.conditions[0].name, "org_charity");

    let second = document
        .pages
        .iter()
        .find(|p| p.path == "/organisation-address")
        .unwrap();
    assert_eq!(second.next.len(), 1);
    assert_eq!(second.next[0].path, "/charity-details");
    assert_eq!(second.next[0].condition.as_deref(), Some("org_charity"));
}

#[test]
fn collects_lists_once_and_strips_metadata() {
    let mut tree = two_page_tree();
    let list = ListDef {
        list_id: Uuid::new_v4(),
        name: "yes-no".to_string(),
        list_type: "string".to_string(),
        items: yes_no_items(),
        title: Some("Yes or no".to_string()),
        is_template: false,
    };

    // Two components referencing the same list on different pages.
    let first_page_id = tree.pages[0].page.page_id;
    let second_page_id = tree.pages[1].page.page_id;
    tree.pages[0].components.push(ComponentTree {
        component: radios_component(first_page_id, "HasBankAccount", list.list_id, 2),
        children: Vec::new(),
        list: Some(list.clone()),
    });
    tree.pages[1].components.push(ComponentTree {
        component: radios_component(second_page_id, "HasConstitution", list.list_id, 1),
        children: Vec::new(),
        list: Some(list.clone()),
    });

    let document = build_form_json(&tree, None);

    assert_eq!(document.lists.len(), 1);
    assert_eq!(document.lists[0].name, "yes-no");
    assert_eq!(document.lists[0].list_type, "string");

    for page in &document.pages {
        for component in &page.components {
            assert!(component.get("metadata").is_none());
        }
    }

    let radios = &document.pages[0].components[1];
    assert_eq!(radios["list"], json!("yes-no"));
    assert_eq!(radios["values"], json!({"type": "listRef"}));
}

#[test]
fn yes_no_fields_reference_an_implicit_list() {
    let mut tree = two_page_tree();
    let page_id = tree.pages[0].page.page_id;
    tree.pages[0].components.push(leaf(Component {
        component_type: ComponentType::YesNoField,
        ..text_component(page_id, "HasBankAccount", "Do you have a bank account?", 2)
    }));

    let document = build_form_json(&tree, None);
    let yes_no = &document.pages[0].components[1];
    assert_eq!(yes_no["values"], json!({"type": "listRef"}));
    assert!(yes_no.get("list").is_none());
    assert!(document.lists.is_empty());
}

#[test]
fn read_only_components_use_the_reduced_shape() {
    let mut tree = two_page_tree();
    let page_id = tree.pages[0].page.page_id;
    tree.pages[0].components.push(leaf(Component {
        component_type: ComponentType::Html,
        title: None,
        content: Some("<p>Guidance</p>".to_string()),
        ..text_component(page_id, "guidance-block", "", 2)
    }));

    let document = build_form_json(&tree, None);
    let html = &document.pages[0].components[1];
    assert_eq!(html["type"], json!("Html"));
    assert_eq!(html["content"], json!("<p>Guidance</p>"));
    // Reduced shape: no hint, no title when unset.
    assert!(html.get("hint").is_none());
    assert!(html.get("title").is_none());

    // Interactive components always carry hint and title, even when null.
    let text = &document.pages[0].components[0];
    assert_eq!(text["hint"], json!(""));
    assert_eq!(text["title"], json!("Name"));
}

#[test]
fn multi_input_children_contribute_their_lists() {
    let mut tree = two_page_tree();
    let page_id = tree.pages[0].page.page_id;
    let list = ListDef {
        list_id: Uuid::new_v4(),
        name: "cost-types".to_string(),
        list_type: "string".to_string(),
        items: json!([{"text": "Capital", "value": "capital"}]),
        title: None,
        is_template: false,
    };

    let parent = Component {
        component_type: ComponentType::MultiInputField,
        ..text_component(page_id, "ProjectCosts", "Project costs", 2)
    };
    let child = ComponentTree {
        component: Component {
            component_type: ComponentType::SelectField,
            page_id: None,
            parent_component_id: Some(parent.component_id),
            list_id: Some(list.list_id),
            ..text_component(page_id, "CostType", "Type of cost", 1)
        },
        children: Vec::new(),
        list: Some(list.clone()),
    };
    tree.pages[0].components.push(ComponentTree {
        component: parent,
        children: vec![child],
        list: None,
    });

    let document = build_form_json(&tree, None);
    assert_eq!(document.lists.len(), 1);
    assert_eq!(document.lists[0].name, "cost-types");

    let multi = &document.pages[0].components[1];
    let children = multi["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert!(children[0].get("metadata").is_none());
    assert_eq!(children[0]["list"], json!("cost-types"));
}
