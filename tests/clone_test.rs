//! Cloning semantics: fresh ids with source back-pointers, "Copy of"
//! titles, cleared base paths and re-targeted page navigation.

mod common;

use anyhow::Result;
use fab::db::repository::{application, clone, pages, rounds};
use fab::db::Db;

use common::{
    radios_component, sample_form, sample_page, sample_section, seed_fund_and_round,
    text_component, yes_no_items,
};

#[tokio::test]
async fn clone_round_copies_the_whole_subtree() -> Result<()> {
    let db = Db::new_test().await?;
    let (fund, round) = seed_fund_and_round(&db).await?;
    rounds::ensure_section_base_path(db.pool(), round.round_id).await?;

    let section = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;
    let form =
        application::insert_new_form(db.pool(), &sample_form(section.section_id, "Names", "names"))
            .await?;
    {
        let mut conn = db.pool().acquire().await?;
        let page = sample_page(form.form_id, "applicant-name", "Applicant name", 1);
        pages::insert_page(&mut conn, &page).await?;
        pages::insert_component(
            &mut conn,
            &text_component(page.page_id, "JzWjXu", "Full name", 1),
        )
        .await?;
    }

    let cloned = clone::clone_round(db.pool(), round.round_id, fund.fund_id, "R2").await?;

    assert_ne!(cloned.round_id, round.round_id);
    assert_eq!(cloned.title.en, "Copy of Round 1");
    assert_eq!(cloned.short_name, "R2");
    assert_eq!(cloned.source_template_id, Some(round.round_id));
    // The copy earns its own base path on first export.
    assert_eq!(cloned.section_base_path, None);

    let cloned_sections = application::sections_for_round(db.pool(), cloned.round_id).await?;
    assert_eq!(cloned_sections.len(), 1);
    assert_eq!(cloned_sections[0].index_in_round, 1);
    assert_eq!(cloned_sections[0].source_template_id, Some(section.section_id));

    let cloned_forms =
        application::forms_for_section(db.pool(), cloned_sections[0].section_id).await?;
    assert_eq!(cloned_forms.len(), 1);
    assert_eq!(cloned_forms[0].source_template_id, Some(form.form_id));
    assert_eq!(cloned_forms[0].runner_publish_name, None);

    let cloned_pages = pages::pages_for_form(db.pool(), cloned_forms[0].form_id).await?;
    assert_eq!(cloned_pages.len(), 1);
    assert_eq!(cloned_pages[0].display_path, "applicant-name");
    let components = pages::components_for_page(db.pool(), cloned_pages[0].page_id).await?;
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].runner_component_name, "JzWjXu");

    // The source round is untouched.
    let source_sections = application::sections_for_round(db.pool(), round.round_id).await?;
    assert_eq!(source_sections.len(), 1);
    Ok(())
}

#[tokio::test]
async fn clone_round_rejects_taken_short_name() -> Result<()> {
    let db = Db::new_test().await?;
    let (fund, round) = seed_fund_and_round(&db).await?;

    let err = clone::clone_round(db.pool(), round.round_id, fund.fund_id, "R1")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already in use"));
    Ok(())
}

#[tokio::test]
async fn clone_round_into_another_fund() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;

    let mut other = common::sample_fund();
    other.fund_id = uuid::Uuid::new_v4();
    other.short_name = "NSF".to_string();
    fab::db::repository::funds::insert_fund(db.pool(), &other).await?;

    let cloned = clone::clone_round(db.pool(), round.round_id, other.fund_id, "R1").await?;
    assert_eq!(cloned.fund_id, other.fund_id);

    // The short name is only taken within the source fund, so reusing it
    // under the target fund is fine.
    let in_target = rounds::rounds_for_fund(db.pool(), other.fund_id).await?;
    assert_eq!(in_target.len(), 1);
    assert_eq!(in_target[0].short_name, "R1");
    Ok(())
}

#[tokio::test]
async fn clone_form_repoints_default_next_pages() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;
    let section = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;
    let form =
        application::insert_new_form(db.pool(), &sample_form(section.section_id, "Names", "names"))
            .await?;

    let mut first = sample_page(form.form_id, "applicant-name", "Applicant name", 1);
    let second = sample_page(form.form_id, "applicant-email", "Applicant email", 2);
    first.default_next_page_id = Some(second.page_id);
    {
        let mut conn = db.pool().acquire().await?;
        pages::insert_page(&mut conn, &first).await?;
        pages::insert_page(&mut conn, &second).await?;
    }

    let cloned = clone::clone_form(db.pool(), form.form_id, section.section_id).await?;
    assert_eq!(cloned.section_index, 2);

    let cloned_pages = pages::pages_for_form(db.pool(), cloned.form_id).await?;
    assert_eq!(cloned_pages.len(), 2);

    // The cloned first page must point at the cloned second page, not the
    // source one.
    let cloned_first = &cloned_pages[0];
    let cloned_second = &cloned_pages[1];
    assert_ne!(cloned_second.page_id, second.page_id);
    assert_eq!(cloned_first.default_next_page_id, Some(cloned_second.page_id));
    Ok(())
}

#[tokio::test]
async fn clone_form_clones_list_definitions() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;
    let section = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;
    let form = application::insert_new_form(
        db.pool(),
        &sample_form(section.section_id, "Eligibility", "eligibility"),
    )
    .await?;

    let list = fab::db::models::ListDef {
        list_id: uuid::Uuid::new_v4(),
        name: "community-asset".to_string(),
        list_type: "string".to_string(),
        items: yes_no_items(),
        title: None,
        is_template: false,
    };
    let page = sample_page(form.form_id, "community-asset", "Community asset", 1);
    {
        let mut conn = db.pool().acquire().await?;
        pages::insert_list(&mut conn, &list).await?;
        pages::insert_page(&mut conn, &page).await?;
        pages::insert_component(
            &mut conn,
            &radios_component(page.page_id, "assetType", list.list_id, 1),
        )
        .await?;
    }

    let cloned = clone::clone_form(db.pool(), form.form_id, section.section_id).await?;

    let cloned_pages = pages::pages_for_form(db.pool(), cloned.form_id).await?;
    let components = pages::components_for_page(db.pool(), cloned_pages[0].page_id).await?;
    let cloned_list_id = components[0].list_id.expect("cloned component keeps a list");

    // The copy owns its own list row, so editing it cannot leak into the
    // source form.
    assert_ne!(cloned_list_id, list.list_id);
    let cloned_list = pages::get_list_by_id(db.pool(), cloned_list_id).await?;
    assert_eq!(cloned_list.name, "community-asset");
    assert_eq!(cloned_list.items, list.items);

    let source_pages = pages::pages_for_form(db.pool(), form.form_id).await?;
    let source_components = pages::components_for_page(db.pool(), source_pages[0].page_id).await?;
    assert_eq!(source_components[0].list_id, Some(list.list_id));
    Ok(())
}

#[tokio::test]
async fn clone_section_appends_to_target_round() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;
    let existing = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "About you"),
    )
    .await?;
    let source = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;
    application::insert_new_form(db.pool(), &sample_form(source.section_id, "Names", "names"))
        .await?;

    let cloned = clone::clone_section(db.pool(), source.section_id, round.round_id).await?;

    assert_ne!(cloned.section_id, existing.section_id);
    assert_eq!(cloned.index_in_round, 3);
    assert_eq!(cloned.source_template_id, Some(source.section_id));

    let forms = application::forms_for_section(db.pool(), cloned.section_id).await?;
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].name_in_apply_json.en, "Names");
    Ok(())
}
