use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use uuid::Uuid;

use crate::db::models::{bool_from_form_str, Fund, FundingType, I18nText};
use crate::db::repository::funds;
use crate::db::Db;

use super::parse_id;

#[derive(Args)]
pub struct FundCommands {
    #[command(subcommand)]
    pub command: FundSubcommands,
}

#[derive(Subcommand)]
pub enum FundSubcommands {
    /// List all funds
    List,
    /// Create a fund
    Create {
        /// Fund name (English)
        name: String,
        /// Application title (English)
        title: String,
        /// Description shown to applicants (English)
        description: String,
        /// Short name, unique across all funds
        #[arg(short, long)]
        short_name: String,
        /// Whether a Welsh version is available ("true"/"false")
        #[arg(long, default_value = "false")]
        welsh_available: String,
        /// COMPETITIVE, UNCOMPETED or EOI
        #[arg(long, default_value = "COMPETITIVE")]
        funding_type: String,
        /// GGIS scheme reference number
        #[arg(long)]
        ggis_reference: Option<String>,
    },
    /// Show one fund and its rounds
    View {
        /// Fund id
        fund_id: String,
    },
    /// Delete a fund and everything under it
    Delete {
        /// Fund id
        fund_id: String,
    },
}

pub async fn handle(db: &Db, commands: FundCommands) -> Result<()> {
    match commands.command {
        FundSubcommands::List => list_command(db).await,
        FundSubcommands::Create {
            name,
            title,
            description,
            short_name,
            welsh_available,
            funding_type,
            ggis_reference,
        } => {
            create_command(
                db,
                name,
                title,
                description,
                short_name,
                welsh_available,
                funding_type,
                ggis_reference,
            )
            .await
        }
        FundSubcommands::View { fund_id } => view_command(db, &fund_id).await,
        FundSubcommands::Delete { fund_id } => delete_command(db, &fund_id).await,
    }
}

async fn list_command(db: &Db) -> Result<()> {
    let all = funds::list_funds(db.pool()).await?;

    if all.is_empty() {
        println!("No funds configured.");
        return Ok(());
    }

    println!("{:<38} {:<12} {:<14} Name", "Fund id", "Short name", "Type");
    println!("{}", "-".repeat(90));
    for fund in &all {
        println!(
            "{:<38} {:<12} {:<14} {}",
            fund.fund_id,
            fund.short_name,
            fund.funding_type.display_text(),
            fund.name.en
        );
    }
    println!("\nTotal funds: {}", all.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn create_command(
    db: &Db,
    name: String,
    title: String,
    description: String,
    short_name: String,
    welsh_available: String,
    funding_type: String,
    ggis_reference: Option<String>,
) -> Result<()> {
    let fund = Fund {
        fund_id: Uuid::new_v4(),
        name: I18nText::new(name),
        title: I18nText::new(title),
        description: I18nText::new(description),
        short_name,
        welsh_available: bool_from_form_str(&welsh_available, "welsh_available")?,
        funding_type: FundingType::parse(&funding_type)?,
        ggis_scheme_reference_number: ggis_reference,
        owner_organisation_id: None,
        is_template: false,
        audit_info: None,
    };

    funds::insert_fund(db.pool(), &fund).await?;
    println!("{} fund '{}' ({})", "Created".green(), fund.name.en, fund.fund_id);
    Ok(())
}

async fn view_command(db: &Db, fund_id: &str) -> Result<()> {
    let fund_id = parse_id(fund_id, "fund")?;
    let fund = funds::get_fund_by_id(db.pool(), fund_id).await?;

    println!("{}", fund.name.en.bold());
    println!("  id:           {}", fund.fund_id);
    println!("  short name:   {}", fund.short_name);
    println!("  title:        {}", fund.title.en);
    println!("  type:         {}", fund.funding_type.display_text());
    println!("  welsh:        {}", fund.welsh_available);
    if let Some(ggis) = &fund.ggis_scheme_reference_number {
        println!("  GGIS ref:     {}", ggis);
    }

    let rounds = crate::db::repository::rounds::rounds_for_fund(db.pool(), fund_id).await?;
    if rounds.is_empty() {
        println!("\nNo rounds.");
    } else {
        println!("\nRounds:");
        for round in &rounds {
            println!(
                "  {:<38} {:<12} {}",
                round.round_id,
                round.short_name,
                round.title.en
            );
        }
    }
    Ok(())
}

async fn delete_command(db: &Db, fund_id: &str) -> Result<()> {
    let fund_id = parse_id(fund_id, "fund")?;
    funds::delete_fund(db.pool(), fund_id).await?;
    println!("{} fund {}", "Deleted".red(), fund_id);
    Ok(())
}
