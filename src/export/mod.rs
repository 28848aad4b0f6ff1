//! Export pipeline: assembles every artefact for a round into a randomized
//! temp directory, zips it, and cleans up on all paths.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::api::form_store::FormStoreClient;
use crate::db::repository::rounds;

pub mod all_questions;
pub mod assessment;
pub mod form_jsons;
pub mod fund_round;
pub mod helpers;

/// Generate the full export bundle for a round and zip it into `dest_dir`
/// as `<round short name>.zip`. The working directory is a tempdir with a
/// randomized suffix and is removed whether or not the export succeeds.
pub async fn create_export_files(
    pool: &SqlitePool,
    store: &FormStoreClient,
    round_id: Uuid,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let round = rounds::get_round_by_id(pool, round_id).await?;
    let short_name = round.short_name.clone();

    let workdir = tempfile::Builder::new()
        .prefix(&format!("{}-", short_name))
        .tempdir()
        .context("Failed to create export working directory")?;
    log::debug!("Export working directory: {:?}", workdir.path());

    form_jsons::generate_form_jsons_for_round(pool, round_id, workdir.path()).await?;
    all_questions::generate_all_round_html(pool, round_id, workdir.path()).await?;
    let (fund_config, round_config) =
        fund_round::generate_config_for_round(pool, store, round_id, workdir.path()).await?;
    assessment::generate_assessment_config_for_round(
        pool,
        &fund_config,
        &round_config,
        workdir.path(),
    )
    .await?;

    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dest_dir))?;
    let zip_path = dest_dir.join(format!("{}.zip", short_name));
    zip_directory(workdir.path(), &zip_path)?;

    log::info!("Export bundle written to {:?}", zip_path);
    Ok(zip_path)
}

/// Zip the contents of `source_dir` (paths relative to it) into `zip_path`.
pub fn zip_directory(source_dir: &Path, zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {:?}", zip_path))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_directory_entries(&mut writer, source_dir, source_dir, options)?;

    writer.finish().context("Failed to finish zip archive")?;
    Ok(())
}

fn add_directory_entries(
    writer: &mut ZipWriter<File>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .context("Zip entry outside the source directory")?
            .to_string_lossy()
            .replace('\\', "/");

        if path.is_dir() {
            writer
                .add_directory(format!("{}/", relative), options)
                .with_context(|| format!("Failed to add zip directory: {}", relative))?;
            add_directory_entries(writer, root, &path, options)?;
        } else {
            writer
                .start_file(relative.clone(), options)
                .with_context(|| format!("Failed to add zip entry: {}", relative))?;
            let mut contents = Vec::new();
            File::open(&path)
                .with_context(|| format!("Failed to open file for zipping: {:?}", path))?
                .read_to_end(&mut contents)
                .with_context(|| format!("Failed to read file for zipping: {:?}", path))?;
            writer
                .write_all(&contents)
                .with_context(|| format!("Failed to write zip entry: {}", relative))?;
        }
    }

    Ok(())
}
