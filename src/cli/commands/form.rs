use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use uuid::Uuid;

use crate::db::models::{Form, I18nText};
use crate::db::repository::application::{self, MoveDirection};
use crate::db::repository::{clone, pages};
use crate::db::Db;
use crate::export::form_jsons::to_json_indent4;
use crate::export::helpers::human_to_kebab_case;
use crate::runner::build_form_json;

use super::parse_id;

#[derive(Args)]
pub struct FormCommands {
    #[command(subcommand)]
    pub command: FormSubcommands,
}

#[derive(Subcommand)]
pub enum FormSubcommands {
    /// List a section's forms in order
    List {
        /// Section id
        section_id: String,
    },
    /// Add an empty form at the end of a section
    Add {
        /// Section id
        section_id: String,
        /// Form name (English)
        name: String,
    },
    /// Clone an existing form (or template) into a section
    Clone {
        /// Source form id
        form_id: String,
        /// Target section id
        section_id: String,
    },
    /// Rename a form
    Rename {
        /// Form id
        form_id: String,
        /// New name (English)
        name: String,
    },
    /// Move a form one place up within its section
    MoveUp {
        /// Section id
        section_id: String,
        /// Form id
        form_id: String,
    },
    /// Move a form one place down within its section
    MoveDown {
        /// Section id
        section_id: String,
        /// Form id
        form_id: String,
    },
    /// Print the assembled runner document for a form
    Json {
        /// Form id
        form_id: String,
    },
    /// Delete a form; requires --cascade when it still has pages
    Delete {
        /// Section id
        section_id: String,
        /// Form id
        form_id: String,
        /// Also delete the form's pages and components
        #[arg(long)]
        cascade: bool,
    },
}

pub async fn handle(db: &Db, commands: FormCommands) -> Result<()> {
    match commands.command {
        FormSubcommands::List { section_id } => list_command(db, &section_id).await,
        FormSubcommands::Add { section_id, name } => add_command(db, &section_id, name).await,
        FormSubcommands::Clone {
            form_id,
            section_id,
        } => clone_command(db, &form_id, &section_id).await,
        FormSubcommands::Rename { form_id, name } => rename_command(db, &form_id, name).await,
        FormSubcommands::MoveUp {
            section_id,
            form_id,
        } => move_command(db, &section_id, &form_id, MoveDirection::Up).await,
        FormSubcommands::MoveDown {
            section_id,
            form_id,
        } => move_command(db, &section_id, &form_id, MoveDirection::Down).await,
        FormSubcommands::Json { form_id } => json_command(db, &form_id).await,
        FormSubcommands::Delete {
            section_id,
            form_id,
            cascade,
        } => delete_command(db, &section_id, &form_id, cascade).await,
    }
}

async fn list_command(db: &Db, section_id: &str) -> Result<()> {
    let section_id = parse_id(section_id, "section")?;
    let forms = application::forms_for_section(db.pool(), section_id).await?;

    if forms.is_empty() {
        println!("No forms in this section.");
        return Ok(());
    }

    for form in &forms {
        println!(
            "{}. {} ({})",
            form.section_index, form.name_in_apply_json.en, form.form_id
        );
    }
    Ok(())
}

async fn add_command(db: &Db, section_id: &str, name: String) -> Result<()> {
    let section_id = parse_id(section_id, "section")?;
    application::get_section_by_id(db.pool(), section_id).await?;

    let form = Form {
        form_id: Uuid::new_v4(),
        section_id: Some(section_id),
        runner_publish_name: Some(human_to_kebab_case(&name)),
        name_in_apply_json: I18nText::new(name),
        section_index: 0,
        form_json: None,
        template_name: None,
        is_template: false,
        source_template_id: None,
        audit_info: None,
        created_at: None,
        updated_at: None,
    };

    let inserted = application::insert_new_form(db.pool(), &form).await?;
    println!(
        "{} form '{}' at position {} ({})",
        "Added".green(),
        inserted.name_in_apply_json.en,
        inserted.section_index,
        inserted.form_id
    );
    Ok(())
}

async fn clone_command(db: &Db, form_id: &str, section_id: &str) -> Result<()> {
    let form_id = parse_id(form_id, "form")?;
    let section_id = parse_id(section_id, "section")?;
    let cloned = clone::clone_form(db.pool(), form_id, section_id).await?;
    println!(
        "{} form as '{}' ({})",
        "Cloned".green(),
        cloned.name_in_apply_json.en,
        cloned.form_id
    );
    Ok(())
}

async fn rename_command(db: &Db, form_id: &str, name: String) -> Result<()> {
    let form_id = parse_id(form_id, "form")?;
    let mut form = application::get_form_by_id(db.pool(), form_id).await?;
    form.name_in_apply_json = I18nText::new(name);
    application::update_form(db.pool(), &form).await?;
    println!("Renamed form {} to '{}'", form_id, form.name_in_apply_json.en);
    Ok(())
}

async fn move_command(
    db: &Db,
    section_id: &str,
    form_id: &str,
    direction: MoveDirection,
) -> Result<()> {
    let section_id = parse_id(section_id, "section")?;
    let form_id = parse_id(form_id, "form")?;
    application::move_form(db.pool(), section_id, form_id, direction).await?;
    println!("Moved form {}", form_id);
    Ok(())
}

async fn json_command(db: &Db, form_id: &str) -> Result<()> {
    let form_id = parse_id(form_id, "form")?;
    let tree = pages::load_form_tree(db.pool(), form_id).await?;
    let document = build_form_json(&tree, None);
    let value = serde_json::to_value(&document)?;
    println!("{}", to_json_indent4(&value)?);
    Ok(())
}

async fn delete_command(db: &Db, section_id: &str, form_id: &str, cascade: bool) -> Result<()> {
    let section_id = parse_id(section_id, "section")?;
    let form_id = parse_id(form_id, "form")?;
    application::delete_form_from_section(db.pool(), section_id, form_id, cascade).await?;
    println!("{} form {}", "Deleted".red(), form_id);
    Ok(())
}
