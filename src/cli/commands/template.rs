use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::db::repository::application;
use crate::db::Db;
use crate::runner::import::load_form_as_template;

#[derive(Args)]
pub struct TemplateCommands {
    #[command(subcommand)]
    pub command: TemplateSubcommands,
}

#[derive(Subcommand)]
pub enum TemplateSubcommands {
    /// List the imported form templates
    List,
    /// Import a runner JSON document as a form template
    Import {
        /// Path to the form JSON file
        file: PathBuf,
        /// Template name; defaults to the form's own name
        #[arg(short, long)]
        name: Option<String>,
    },
}

pub async fn handle(db: &Db, commands: TemplateCommands) -> Result<()> {
    match commands.command {
        TemplateSubcommands::List => list_command(db).await,
        TemplateSubcommands::Import { file, name } => {
            import_command(db, &file, name.as_deref()).await
        }
    }
}

async fn list_command(db: &Db) -> Result<()> {
    let forms = application::list_form_templates(db.pool()).await?;

    if forms.is_empty() {
        println!("No templates imported yet.");
        return Ok(());
    }

    println!("Form templates:");
    for form in &forms {
        println!(
            "  {:<38} {}",
            form.form_id,
            form.template_name
                .as_deref()
                .unwrap_or(&form.name_in_apply_json.en)
        );
    }
    Ok(())
}

async fn import_command(db: &Db, file: &PathBuf, name: Option<&str>) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read form JSON file: {:?}", file))?;
    let document: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("File is not valid JSON: {:?}", file))?;

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("File has no usable name: {:?}", file))?;

    let form = load_form_as_template(db.pool(), &document, name, filename).await?;
    println!(
        "{} template '{}' ({})",
        "Imported".green(),
        form.template_name
            .as_deref()
            .unwrap_or(&form.name_in_apply_json.en),
        form.form_id
    );
    Ok(())
}
