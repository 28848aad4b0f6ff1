//! Static "all questions" HTML for a round: a table of contents followed by
//! every section, form, page and question title, in application order.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{ComponentTree, PageTree, Round};
use crate::db::repository::{application, funds, pages, rounds};
use crate::export::helpers::{human_to_kebab_case, write_export_file};

const HTML_PREFIX: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>Full list of application questions</title>\n</head>\n<body>\n\
<div class=\"govuk-grid-row\">\n<div class=\"govuk-grid-column-two-thirds\">\n";

const HTML_SUFFIX: &str = "</div>\n</div>\n</body>\n</html>\n";

/// Generate `html/<fund>_<round>_all_questions_en.html` for the round.
pub async fn generate_all_round_html(
    pool: &SqlitePool,
    round_id: Uuid,
    base_output_dir: &Path,
) -> Result<()> {
    let round = rounds::get_round_by_id(pool, round_id).await?;
    let fund = funds::get_fund_by_id(pool, round.fund_id).await?;
    log::info!("Generating all-questions HTML for round {}", round_id);

    let mut body = String::new();
    let _ = write!(
        body,
        "<span class=\"govuk-caption-l\">{} {}</span>\n\
         <h1 class=\"govuk-heading-xl\">Full list of application questions</h1>\n\
         <div class=\"govuk-!-margin-bottom-8\">\n",
        fund.title.en, round.title.en
    );

    let sections = application::sections_for_round(pool, round_id).await?;

    render_table_of_contents(&mut body, &sections);

    for section in &sections {
        let anchor = human_to_kebab_case(&section.name_in_apply_json.en);
        let _ = write!(
            body,
            "<hr class=\"govuk-section-break govuk-section-break--l govuk-section-break--visible\" />\n\
             <h2 class=\"govuk-heading-l\" id=\"{}\">{}. {}</h2>\n",
            anchor, section.index_in_round, section.name_in_apply_json.en
        );

        for form in application::forms_for_section(pool, section.section_id).await? {
            let _ = write!(
                body,
                "<h3 class=\"govuk-heading-m\">{}</h3>\n",
                form.name_in_apply_json.en
            );
            let tree = pages::load_form_tree(pool, form.form_id).await?;
            for page_tree in &tree.pages {
                render_page(&mut body, page_tree);
            }
        }
    }

    body.push_str("</div>\n");

    let content = format!("{}{}{}", HTML_PREFIX, body, HTML_SUFFIX);
    write_export_file(
        &base_output_dir.join("html"),
        &all_questions_filename(&fund.short_name, &round),
        &content,
    )?;

    Ok(())
}

fn all_questions_filename(fund_short_name: &str, round: &Round) -> String {
    format!(
        "{}_{}_all_questions_en.html",
        fund_short_name.to_lowercase(),
        round.short_name.to_lowercase()
    )
}

fn render_table_of_contents(body: &mut String, sections: &[crate::db::models::Section]) {
    body.push_str("<h2 class=\"govuk-heading-m\">Table of contents</h2>\n");
    body.push_str("<ol class=\"govuk-list govuk-list--number\">\n");
    for section in sections {
        let anchor = human_to_kebab_case(&section.name_in_apply_json.en);
        let _ = write!(
            body,
            "<li><a class=\"govuk-link\" href=\"#{}\">{}</a></li>\n",
            anchor, section.name_in_apply_json.en
        );
    }
    body.push_str("</ol>\n");
}

fn render_page(body: &mut String, page_tree: &PageTree) {
    let page = &page_tree.page;
    if page
        .controller
        .as_deref()
        .is_some_and(|c| c.ends_with("summary.js"))
    {
        return;
    }

    let _ = write!(
        body,
        "<hr class=\"govuk-section-break govuk-section-break--l govuk-section-break--visible\" />\n\
         <h4 class=\"govuk-heading-s\">{}</h4>\n",
        page.name_in_apply_json.en
    );

    for component in &page_tree.components {
        render_component(body, component);
    }
}

fn render_component(body: &mut String, tree: &ComponentTree) {
    let component = &tree.component;
    body.push_str("<div class=\"govuk-body all-questions-component\">\n");

    let hide_title = component
        .options
        .as_ref()
        .and_then(|o| o.get("hideTitle"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !hide_title {
        if let Some(title) = &component.title {
            let _ = write!(body, "<p class=\"govuk-body\">{}</p>\n", title);
        }
    }

    if let Some(hint) = &component.hint_text {
        let _ = write!(body, "<p class=\"govuk-body\">{}</p>\n", hint);
    }

    if let Some(list) = &tree.list {
        if let Some(items) = list.items.as_array() {
            body.push_str("<ul class=\"govuk-list govuk-list--bullet\">\n");
            for item in items {
                let text = item
                    .get("text")
                    .and_then(Value::as_str)
                    .or_else(|| item.as_str())
                    .unwrap_or_default();
                let _ = write!(body, "<li>{}</li>\n", text);
            }
            body.push_str("</ul>\n");
        }
    }

    for child in &tree.children {
        render_component(body, child);
    }

    body.push_str("</div>\n");
}
