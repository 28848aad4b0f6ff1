//! Importing runner documents as templates, and rebuilding a document from
//! the imported rows.

mod common;

use anyhow::Result;
use serde_json::json;

use fab::db::repository::{application, pages};
use fab::db::Db;
use fab::runner::{build_form_json, import};

fn sample_document() -> serde_json::Value {
    json!({
        "startPage": "/organisation-name",
        "name": "About your organisation",
        "pages": [
            {
                "path": "/organisation-name",
                "title": "Organisation name",
                "components": [
                    {
                        "name": "OrgName",
                        "type": "TextField",
                        "title": "Organisation name",
                        "hint": "The registered name",
                        "options": {},
                        "schema": {}
                    },
                    {
                        "name": "OrgType",
                        "type": "RadiosField",
                        "title": "Organisation type",
                        "hint": "",
                        "options": {},
                        "schema": {},
                        "list": "org-types"
                    }
                ],
                "next": [
                    {"path": "/organisation-address"},
                    {"path": "/charity-details", "condition": "org_charity"}
                ]
            },
            {
                "path": "/organisation-address",
                "title": "Organisation address",
                "components": [],
                "next": [{"path": "/summary"}]
            },
            {
                "path": "/charity-details",
                "title": "Charity details",
                "section": "CharitySection",
                "components": [],
                "next": [{"path": "/summary"}]
            },
            {
                "path": "/summary",
                "title": "Check your answers",
                "controller": "./pages/summary.js",
                "components": [],
                "next": []
            }
        ],
        "lists": [
            {
                "type": "string",
                "name": "org-types",
                "title": "Organisation types",
                "items": [
                    {"text": "Charity", "value": "charity"},
                    {"text": "Company", "value": "company"}
                ]
            }
        ],
        "conditions": [
            {
                "displayName": "Organisation is a charity",
                "name": "org_charity",
                "value": {
                    "name": "org_charity",
                    "conditions": [
                        {
                            "field": {"name": "OrgType", "type": "RadiosField", "display": "Organisation type"},
                            "operator": "is",
                            "value": {"type": "Value", "value": "charity", "display": "charity"}
                        }
                    ]
                }
            }
        ],
        "sections": [
            {"name": "CharitySection", "title": "Charity information", "hideTitle": false}
        ],
        "outputs": [],
        "skipSummary": false
    })
}

#[tokio::test]
async fn imports_a_runner_document_as_a_template() -> Result<()> {
    let db = Db::new_test().await?;
    let document = sample_document();

    let form =
        import::load_form_as_template(db.pool(), &document, None, "about-your-organisation.json")
            .await?;

    assert!(form.is_template);
    assert_eq!(form.template_name.as_deref(), Some("about-your-organisation"));
    assert_eq!(form.runner_publish_name.as_deref(), Some("about-your-organisation"));
    assert_eq!(form.name_in_apply_json.en, "About your organisation");

    let templates = application::list_form_templates(db.pool()).await?;
    assert_eq!(templates.len(), 1);

    let stored_pages = pages::pages_for_form(db.pool(), form.form_id).await?;
    assert_eq!(stored_pages.len(), 4);
    assert_eq!(stored_pages[0].display_path, "organisation-name");
    assert_eq!(stored_pages[0].form_index, Some(1));

    // The unconditional next edge became a default-next pointer.
    let address = stored_pages
        .iter()
        .find(|p| p.display_path == "organisation-address")
        .unwrap();
    assert_eq!(stored_pages[0].default_next_page_id, Some(address.page_id));

    // The conditional edge became a page condition.
    let page_conditions = pages::page_conditions_for_form(db.pool(), form.form_id).await?;
    assert_eq!(page_conditions.len(), 1);
    assert_eq!(page_conditions[0].page_id, stored_pages[0].page_id);
    assert_eq!(page_conditions[0].destination_page_path, "/charity-details");

    let conditions = pages::conditions_for_form(db.pool(), form.form_id).await?;
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].name, "org_charity");

    // List reference resolved by name.
    let components = pages::components_for_page(db.pool(), stored_pages[0].page_id).await?;
    assert_eq!(components.len(), 2);
    assert!(components[1].list_id.is_some());
    Ok(())
}

#[tokio::test]
async fn pages_without_a_section_get_a_hidden_default_one() -> Result<()> {
    let db = Db::new_test().await?;
    let form = import::load_form_as_template(
        db.pool(),
        &sample_document(),
        Some("Org template"),
        "about-your-organisation.json",
    )
    .await?;
    assert_eq!(form.template_name.as_deref(), Some("Org template"));

    let default = pages::get_form_section_by_name(db.pool(), "FabDefault")
        .await?
        .expect("default form section");
    assert_eq!(default.title, "Default section");
    assert!(default.hide_title);

    let stored_pages = pages::pages_for_form(db.pool(), form.form_id).await?;
    let first = &stored_pages[0];
    assert_eq!(first.form_section_id, Some(default.form_section_id));
    Ok(())
}

#[tokio::test]
async fn falls_back_to_the_start_page_title_for_unnamed_documents() -> Result<()> {
    let db = Db::new_test().await?;
    let mut document = sample_document();
    document.as_object_mut().unwrap().remove("name");

    let form =
        import::load_form_as_template(db.pool(), &document, None, "unnamed.json").await?;
    assert_eq!(form.name_in_apply_json.en, "Organisation name");
    Ok(())
}

#[tokio::test]
async fn imported_template_rebuilds_an_equivalent_document() -> Result<()> {
    let db = Db::new_test().await?;
    let form = import::load_form_as_template(
        db.pool(),
        &sample_document(),
        None,
        "about-your-organisation.json",
    )
    .await?;

    let tree = pages::load_form_tree(db.pool(), form.form_id).await?;
    let rebuilt = build_form_json(&tree, None);

    // The source document had no start-page controller, so the rebuild
    // synthesizes an intro page.
    assert_eq!(
        rebuilt.start_page.as_deref(),
        Some("/intro-about-your-organisation")
    );
    assert_eq!(rebuilt.lists.len(), 1);
    assert_eq!(rebuilt.lists[0].name, "org-types");
    assert_eq!(rebuilt.conditions.len(), 1);

    // Every imported path survives the round trip.
    for path in [
        "/organisation-name",
        "/organisation-address",
        "/charity-details",
        "/summary",
    ] {
        assert!(rebuilt.pages.iter().any(|p| p.path == path), "missing {}", path);
    }

    let first = rebuilt
        .pages
        .iter()
        .find(|p| p.path == "/organisation-name")
        .unwrap();
    assert!(first
        .next
        .iter()
        .any(|n| n.path == "/organisation-address" && n.condition.is_none()));
    assert!(first
        .next
        .iter()
        .any(|n| n.path == "/charity-details" && n.condition.as_deref() == Some("org_charity")));
    Ok(())
}
