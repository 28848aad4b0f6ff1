//! End-to-end export: the zip bundle layout and the generated Python config
//! files. The form store is pointed at an unreachable address, which the
//! client degrades to empty lookups.

mod common;

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

use anyhow::Result;
use fab::api::form_store::FormStoreClient;
use fab::db::repository::{application, pages, rounds};
use fab::db::Db;
use fab::export::create_export_files;

use common::{sample_form, sample_page, sample_section, seed_fund_and_round, text_component};

async fn seed_exportable_round(db: &Db) -> Result<uuid::Uuid> {
    let (_, round) = seed_fund_and_round(db).await?;
    let section = application::insert_new_section(
        db.pool(),
        &sample_section(round.round_id, "Your project"),
    )
    .await?;
    let form = application::insert_new_form(
        db.pool(),
        &sample_form(section.section_id, "Project details", "project-details"),
    )
    .await?;
    {
        let mut conn = db.pool().acquire().await?;
        let page = sample_page(form.form_id, "project-name", "Project name", 1);
        pages::insert_page(&mut conn, &page).await?;
        pages::insert_component(
            &mut conn,
            &text_component(page.page_id, "ProjectName", "What is the project called?", 1),
        )
        .await?;
    }
    Ok(round.round_id)
}

#[tokio::test]
async fn export_writes_a_zip_with_every_artefact() -> Result<()> {
    let db = Db::new_test().await?;
    let round_id = seed_exportable_round(&db).await?;

    let store = FormStoreClient::new("http://127.0.0.1:1");
    let dest = tempfile::tempdir()?;

    let zip_path = create_export_files(db.pool(), &store, round_id, dest.path()).await?;
    assert_eq!(zip_path, dest.path().join("R1.zip"));

    let mut archive = zip::ZipArchive::new(File::open(&zip_path)?)?;
    let names: HashSet<String> = (0..archive.len())
        .map(|i| archive.by_index(i).map(|f| f.name().to_string()))
        .collect::<Result<_, _>>()?;

    assert!(names.contains("form_runner/project-details.json"), "{:?}", names);
    assert!(names.contains("html/cof_r1_all_questions_en.html"), "{:?}", names);
    assert!(names.contains("fund_store/cof.py"), "{:?}", names);
    assert!(names.contains("assessment_store/assessment_config.py"), "{:?}", names);

    // The loader config is a Python assignment over the fund and round.
    let mut loader = String::new();
    archive.by_name("fund_store/cof.py")?.read_to_string(&mut loader)?;
    assert!(loader.starts_with("LOADER_CONFIG="));
    assert!(loader.contains("'short_name': 'COF'"));
    assert!(loader.contains("'base_path'"));

    let mut assessment = String::new();
    archive
        .by_name("assessment_store/assessment_config.py")?
        .read_to_string(&mut assessment)?;
    assert!(assessment.starts_with("ASSESSMENT_CONFIG="));
    assert!(assessment.contains("'fund_round': 'COFR1'"));
    Ok(())
}

#[tokio::test]
async fn export_assigns_a_section_base_path_once() -> Result<()> {
    let db = Db::new_test().await?;
    let round_id = seed_exportable_round(&db).await?;

    let store = FormStoreClient::new("http://127.0.0.1:1");
    let dest = tempfile::tempdir()?;

    create_export_files(db.pool(), &store, round_id, dest.path()).await?;
    let after_first = rounds::get_round_by_id(db.pool(), round_id).await?;
    let base_path = after_first.section_base_path.expect("base path assigned");

    create_export_files(db.pool(), &store, round_id, dest.path()).await?;
    let after_second = rounds::get_round_by_id(db.pool(), round_id).await?;
    assert_eq!(after_second.section_base_path, Some(base_path));
    Ok(())
}
