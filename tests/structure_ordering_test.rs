//! Ordering and delete behaviour for sections and forms: contiguous 1-based
//! indices, boundary-safe moves, and cascade semantics.

mod common;

use anyhow::Result;
use fab::db::repository::application::{self, MoveDirection};
use fab::db::repository::pages;
use fab::db::Db;

use common::{sample_form, sample_page, sample_section, seed_fund_and_round, text_component};

#[tokio::test]
async fn sections_append_with_contiguous_indices() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;

    for name in ["About you", "Your project", "Declarations"] {
        application::insert_new_section(db.pool(), &sample_section(round.round_id, name)).await?;
    }

    let sections = application::sections_for_round(db.pool(), round.round_id).await?;
    assert_eq!(sections.len(), 3);
    assert_eq!(
        sections.iter().map(|s| s.index_in_round).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(sections[0].name_in_apply_json.en, "About you");
    Ok(())
}

#[tokio::test]
async fn move_section_swaps_with_neighbour() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;

    for name in ["First", "Second", "Third"] {
        application::insert_new_section(db.pool(), &sample_section(round.round_id, name)).await?;
    }
    let sections = application::sections_for_round(db.pool(), round.round_id).await?;

    application::move_section(
        db.pool(),
        round.round_id,
        sections[1].section_id,
        MoveDirection::Up,
    )
    .await?;

    let reordered = application::sections_for_round(db.pool(), round.round_id).await?;
    assert_eq!(reordered[0].name_in_apply_json.en, "Second");
    assert_eq!(reordered[1].name_in_apply_json.en, "First");
    assert_eq!(reordered[2].name_in_apply_json.en, "Third");
    assert_eq!(
        reordered.iter().map(|s| s.index_in_round).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    Ok(())
}

#[tokio::test]
async fn move_at_boundary_is_a_no_op() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;

    for name in ["First", "Second"] {
        application::insert_new_section(db.pool(), &sample_section(round.round_id, name)).await?;
    }
    let sections = application::sections_for_round(db.pool(), round.round_id).await?;

    application::move_section(
        db.pool(),
        round.round_id,
        sections[0].section_id,
        MoveDirection::Up,
    )
    .await?;
    application::move_section(
        db.pool(),
        round.round_id,
        sections[1].section_id,
        MoveDirection::Down,
    )
    .await?;

    let unchanged = application::sections_for_round(db.pool(), round.round_id).await?;
    assert_eq!(unchanged[0].name_in_apply_json.en, "First");
    assert_eq!(unchanged[1].name_in_apply_json.en, "Second");
    Ok(())
}

#[tokio::test]
async fn move_form_within_section() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;
    let section = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;

    for (name, publish) in [("Names", "names"), ("Addresses", "addresses")] {
        application::insert_new_form(db.pool(), &sample_form(section.section_id, name, publish))
            .await?;
    }
    let forms = application::forms_for_section(db.pool(), section.section_id).await?;

    application::move_form(
        db.pool(),
        section.section_id,
        forms[1].form_id,
        MoveDirection::Up,
    )
    .await?;

    let reordered = application::forms_for_section(db.pool(), section.section_id).await?;
    assert_eq!(reordered[0].name_in_apply_json.en, "Addresses");
    assert_eq!(reordered[1].name_in_apply_json.en, "Names");
    assert_eq!(
        reordered.iter().map(|f| f.section_index).collect::<Vec<_>>(),
        vec![1, 2]
    );
    Ok(())
}

#[tokio::test]
async fn delete_without_cascade_rejects_non_empty_section() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;
    let section = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;
    application::insert_new_form(db.pool(), &sample_form(section.section_id, "Names", "names"))
        .await?;

    let err = application::delete_section_from_round(
        db.pool(),
        round.round_id,
        section.section_id,
        false,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("form(s)"));

    // Nothing was deleted.
    assert!(application::get_section_by_id(db.pool(), section.section_id)
        .await
        .is_ok());
    assert_eq!(
        application::forms_for_section(db.pool(), section.section_id)
            .await?
            .len(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn cascade_delete_renumbers_survivors() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;

    let mut ids = Vec::new();
    for name in ["First", "Second", "Third"] {
        let section =
            application::insert_new_section(db.pool(), &sample_section(round.round_id, name))
                .await?;
        ids.push(section.section_id);
    }
    let form =
        application::insert_new_form(db.pool(), &sample_form(ids[1], "Names", "names")).await?;
    {
        let mut conn = db.pool().acquire().await?;
        pages::insert_page(
            &mut conn,
            &sample_page(form.form_id, "applicant-name", "Applicant name", 1),
        )
        .await?;
    }

    application::delete_section_from_round(db.pool(), round.round_id, ids[1], true).await?;

    let remaining = application::sections_for_round(db.pool(), round.round_id).await?;
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].name_in_apply_json.en, "First");
    assert_eq!(remaining[1].name_in_apply_json.en, "Third");
    assert_eq!(
        remaining.iter().map(|s| s.index_in_round).collect::<Vec<_>>(),
        vec![1, 2]
    );

    // The cascade took the form and its pages with it.
    assert!(application::get_form_by_id(db.pool(), form.form_id).await.is_err());
    assert!(pages::pages_for_form(db.pool(), form.form_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn cascade_delete_removes_nested_component_rows() -> Result<()> {
    let db = Db::new_test().await?;
    let (_, round) = seed_fund_and_round(&db).await?;
    let section = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;
    let form =
        application::insert_new_form(db.pool(), &sample_form(section.section_id, "Costs", "costs"))
            .await?;

    // Multi-input children are stored against their parent only, with no
    // page link of their own.
    let page = sample_page(form.form_id, "project-costs", "Project costs", 1);
    let parent = fab::db::models::Component {
        component_type: fab::db::models::ComponentType::MultiInputField,
        ..text_component(page.page_id, "projectCosts", "Costs", 1)
    };
    let child = fab::db::models::Component {
        page_id: None,
        parent_component_id: Some(parent.component_id),
        ..text_component(page.page_id, "costItem", "Item", 1)
    };
    {
        let mut conn = db.pool().acquire().await?;
        pages::insert_page(&mut conn, &page).await?;
        pages::insert_component(&mut conn, &parent).await?;
        pages::insert_component(&mut conn, &child).await?;
    }

    application::delete_form_from_section(db.pool(), section.section_id, form.form_id, true)
        .await?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM component")
        .fetch_one(db.pool())
        .await?;
    assert_eq!(count, 0, "no component rows survive the cascade");
    Ok(())
}

#[tokio::test]
async fn delete_form_without_cascade_requires_no_pages() -> Result<()> {
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
    {
        let mut conn = db.pool().acquire().await?;
        pages::insert_page(
            &mut conn,
            &sample_page(form.form_id, "applicant-name", "Applicant name", 1),
        )
        .await?;
    }

    let err = application::delete_form_from_section(
        db.pool(),
        section.section_id,
        form.form_id,
        false,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("page(s)"));

    application::delete_form_from_section(db.pool(), section.section_id, form.form_id, true)
        .await?;
    assert!(application::get_form_by_id(db.pool(), form.form_id).await.is_err());
    Ok(())
}
