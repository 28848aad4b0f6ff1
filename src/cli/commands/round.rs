use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use uuid::Uuid;

use crate::db::models::{
    bool_from_form_str, parse_optional_json_text, I18nText, Round, RoundStatus,
};
use crate::db::repository::{clone, rounds};
use crate::db::Db;

use super::parse_id;

#[derive(Args)]
pub struct RoundCommands {
    #[command(subcommand)]
    pub command: RoundSubcommands,
}

#[derive(Subcommand)]
pub enum RoundSubcommands {
    /// List rounds, optionally for a single fund
    List {
        /// Fund id
        #[arg(short, long)]
        fund_id: Option<String>,
    },
    /// Create a round under a fund
    Create {
        /// Owning fund id
        fund_id: String,
        /// Round title (English)
        title: String,
        /// Short name, unique within the fund
        #[arg(short, long)]
        short_name: String,
        /// Link to the fund prospectus
        #[arg(long, default_value = "")]
        prospectus_link: String,
        /// Link to the privacy notice
        #[arg(long, default_value = "")]
        privacy_notice_link: String,
        /// Contact email shown to applicants
        #[arg(long)]
        contact_email: Option<String>,
        /// Flag fields accept "true"/"false"
        #[arg(long, default_value = "false")]
        is_expression_of_interest: String,
        #[arg(long, default_value = "true")]
        mark_as_complete_enabled: String,
        /// EOI decision schema as a JSON document (empty input is ignored)
        #[arg(long)]
        eoi_decision_schema: Option<String>,
    },
    /// Clone a round, optionally into another fund
    Clone {
        /// Source round id
        round_id: String,
        /// Short name for the copy
        #[arg(short, long)]
        new_short_name: String,
        /// Target fund id; defaults to the source round's fund
        #[arg(short, long)]
        fund_id: Option<String>,
    },
    /// Mark a round's application config as complete / in progress
    Status {
        /// Round id
        round_id: String,
        /// "In progress" or "Complete"
        status: String,
    },
    /// Delete a round and everything under it
    Delete {
        /// Round id
        round_id: String,
    },
}

pub async fn handle(db: &Db, commands: RoundCommands) -> Result<()> {
    match commands.command {
        RoundSubcommands::List { fund_id } => list_command(db, fund_id.as_deref()).await,
        RoundSubcommands::Create {
            fund_id,
            title,
            short_name,
            prospectus_link,
            privacy_notice_link,
            contact_email,
            is_expression_of_interest,
            mark_as_complete_enabled,
            eoi_decision_schema,
        } => {
            create_command(
                db,
                &fund_id,
                title,
                short_name,
                prospectus_link,
                privacy_notice_link,
                contact_email,
                &is_expression_of_interest,
                &mark_as_complete_enabled,
                eoi_decision_schema.as_deref(),
            )
            .await
        }
        RoundSubcommands::Clone {
            round_id,
            new_short_name,
            fund_id,
        } => clone_command(db, &round_id, &new_short_name, fund_id.as_deref()).await,
        RoundSubcommands::Status { round_id, status } => {
            status_command(db, &round_id, &status).await
        }
        RoundSubcommands::Delete { round_id } => delete_command(db, &round_id).await,
    }
}

async fn list_command(db: &Db, fund_id: Option<&str>) -> Result<()> {
    let all = match fund_id {
        Some(raw) => rounds::rounds_for_fund(db.pool(), parse_id(raw, "fund")?).await?,
        None => rounds::list_rounds(db.pool()).await?,
    };

    if all.is_empty() {
        println!("No rounds found.");
        return Ok(());
    }

    println!("{:<38} {:<12} {:<12} Title", "Round id", "Short name", "Status");
    println!("{}", "-".repeat(90));
    for round in &all {
        println!(
            "{:<38} {:<12} {:<12} {}",
            round.round_id,
            round.short_name,
            round.status.as_str(),
            round.title.en
        );
    }
    println!("\nTotal rounds: {}", all.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn create_command(
    db: &Db,
    fund_id: &str,
    title: String,
    short_name: String,
    prospectus_link: String,
    privacy_notice_link: String,
    contact_email: Option<String>,
    is_expression_of_interest: &str,
    mark_as_complete_enabled: &str,
    eoi_decision_schema: Option<&str>,
) -> Result<()> {
    let fund_id = parse_id(fund_id, "fund")?;
    // Fails early with a not-found error rather than a foreign key failure.
    crate::db::repository::funds::get_fund_by_id(db.pool(), fund_id).await?;

    let round = Round {
        round_id: Uuid::new_v4(),
        fund_id,
        title: I18nText::new(title),
        short_name,
        opens: None,
        deadline: None,
        assessment_start: None,
        reminder_date: None,
        assessment_deadline: None,
        prospectus_link,
        privacy_notice_link,
        contact_email,
        feedback_link: None,
        guidance_url: None,
        project_name_field_id: None,
        instructions: None,
        application_guidance: None,
        all_uploaded_documents_section_available: false,
        application_fields_download_available: false,
        display_logo_on_pdf_exports: false,
        mark_as_complete_enabled: bool_from_form_str(
            mark_as_complete_enabled,
            "mark_as_complete_enabled",
        )?,
        is_expression_of_interest: bool_from_form_str(
            is_expression_of_interest,
            "is_expression_of_interest",
        )?,
        send_deadline_reminder_emails: true,
        send_incomplete_application_emails: true,
        feedback_survey_config: None,
        eligibility_config: None,
        eoi_decision_schema: parse_optional_json_text(eoi_decision_schema, "eoi_decision_schema")?,
        status: RoundStatus::InProgress,
        section_base_path: None,
        is_template: false,
        template_name: None,
        source_template_id: None,
        audit_info: None,
    };

    rounds::insert_round(db.pool(), &round).await?;
    println!(
        "{} round '{}' ({})",
        "Created".green(),
        round.title.en,
        round.round_id
    );
    Ok(())
}

async fn clone_command(
    db: &Db,
    round_id: &str,
    new_short_name: &str,
    fund_id: Option<&str>,
) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    let target_fund_id = match fund_id {
        Some(raw) => parse_id(raw, "fund")?,
        None => rounds::get_round_by_id(db.pool(), round_id).await?.fund_id,
    };
    let cloned = clone::clone_round(db.pool(), round_id, target_fund_id, new_short_name).await?;
    println!(
        "{} round as '{}' ({})",
        "Cloned".green(),
        cloned.title.en,
        cloned.round_id
    );
    Ok(())
}

async fn status_command(db: &Db, round_id: &str, status: &str) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    let mut round = rounds::get_round_by_id(db.pool(), round_id).await?;
    round.status = RoundStatus::parse(status)?;
    rounds::update_round(db.pool(), &round).await?;
    println!("Round {} marked '{}'", round_id, round.status.as_str());
    Ok(())
}

async fn delete_command(db: &Db, round_id: &str) -> Result<()> {
    let round_id = parse_id(round_id, "round")?;
    rounds::delete_round(db.pool(), round_id).await?;
    println!("{} round {}", "Deleted".red(), round_id);
    Ok(())
}
