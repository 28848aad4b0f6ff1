use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use uuid::Uuid;

use crate::db::models::{I18nText, Section};
use crate::db::repository::application::{self, MoveDirection};
use crate::db::Db;

use super::parse_id;

#[derive(Args)]
pub struct SectionCommands {
    #[command(subcommand)]
    pub command: SectionSubcommands,
}

#[derive(Subcommand)]
pub enum SectionSubcommands {
    /// List a round's sections in order
    List {
        /// Round id
        round_id: String,
    },
    /// Add a section at the end of a round
    Add {
        /// Round id
        round_id: String,
        /// Section name (English)
        name: String,
    },
    /// Rename a section
    Rename {
        /// Section id
        section_id: String,
        /// New name (English)
        name: String,
    },
    /// Move a section one place up
    MoveUp {
        /// Round id
        round_id: String,
        /// Section id
        section_id: String,
    },
    /// Move a section one place down
    MoveDown {
        /// Round id
        round_id: String,
        /// Section id
        section_id: String,
    },
    /// Delete a section; requires --cascade when it still has forms
    Delete {
        /// Round id
        round_id: String,
        /// Section id
        section_id: String,
        /// Also delete the section's forms, pages and components
        #[arg(long)]
        cascade: bool,
    },
}

pub async fn handle(db: &Db, commands: SectionCommands) -> Result<()> {
    match commands.command {
        SectionSubcommands::List { round_id } => list_command(db, &round_id).await,
        SectionSubcommands::Add { round_id, name } => add_command(db, &round_id, name).await,
        SectionSubcommands::Rename { section_id, name } => {
            rename_command(db, &section_id, name).await
        }
        SectionSubcommands::MoveUp {
            round_id,
            section_id,
        } => move_command(db, &round_id, &section_id, MoveDirection::Up).await,
        SectionSubcommands::MoveDown {
            round_id,
            section_id,
        } => move_command(db, &round_id, &section_id, MoveDirection::Down).await,
        SectionSubcommands::Delete {
            round_id,
            section_id,
            cascade,
        } => delete_command(db, &round_id, &section_id, cascade).await,
    }
}

async fn list_command(db: &Db, round_id: &str) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    let sections = application::sections_for_round(db.pool(), round_id).await?;

    if sections.is_empty() {
        println!("No sections in this round.");
        return Ok(());
    }

    for section in &sections {
        println!(
            "{}. {} ({})",
            section.index_in_round, section.name_in_apply_json.en, section.section_id
        );
        let forms = application::forms_for_section(db.pool(), section.section_id).await?;
        for form in &forms {
            println!(
                "   {}.{} {} ({})",
                section.index_in_round,
                form.section_index,
                form.name_in_apply_json.en,
                form.form_id
            );
        }
    }
    Ok(())
}

async fn add_command(db: &Db, round_id: &str, name: String) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    let section = Section {
        section_id: Uuid::new_v4(),
        round_id: Some(round_id),
        name_in_apply_json: I18nText::new(name),
        index_in_round: 0,
        template_name: None,
        is_template: false,
        source_template_id: None,
        audit_info: None,
    };

    let inserted = application::insert_new_section(db.pool(), &section).await?;
    println!(
        "{} section '{}' at position {} ({})",
        "Added".green(),
        inserted.name_in_apply_json.en,
        inserted.index_in_round,
        inserted.section_id
    );
    Ok(())
}

async fn rename_command(db: &Db, section_id: &str, name: String) -> Result<()> {
    let section_id = parse_id(section_id, "section")?;
    let mut section = application::get_section_by_id(db.pool(), section_id).await?;
    section.name_in_apply_json = I18nText::new(name);
    application::update_section(db.pool(), &section).await?;
    println!("Renamed section {} to '{}'", section_id, section.name_in_apply_json.en);
    Ok(())
}

async fn move_command(
    db: &Db,
    round_id: &str,
    section_id: &str,
    direction: MoveDirection,
) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    let section_id = parse_id(section_id, "section")?;
    application::move_section(db.pool(), round_id, section_id, direction).await?;
    println!("Moved section {}", section_id);
    Ok(())
}

async fn delete_command(db: &Db, round_id: &str, section_id: &str, cascade: bool) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    let section_id = parse_id(section_id, "section")?;
    application::delete_section_from_round(db.pool(), round_id, section_id, cascade).await?;
    println!("{} section {}", "Deleted".red(), section_id);
    Ok(())
}
