use clap::{Parser, Subcommand};

use super::commands::db::DbCommands;
use super::commands::form::FormCommands;
use super::commands::fund::FundCommands;
use super::commands::round::RoundCommands;
use super::commands::section::SectionCommands;
use super::commands::template::TemplateCommands;

#[derive(Parser)]
#[command(name = "fab")]
#[command(about = "Administer grant funds, application rounds and forms, and export runner config bundles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fund management
    Fund(FundCommands),
    /// Application round management
    Round(RoundCommands),
    /// Sections within a round
    Section(SectionCommands),
    /// Forms within a section
    Form(FormCommands),
    /// Reusable form templates
    Template(TemplateCommands),
    /// Export the full config bundle for a round
    Export {
        /// Round id
        round_id: String,
        /// Directory to write the zip bundle into
        #[arg(short, long, default_value = ".")]
        output: String,
    },
    /// Publish a form to the form runner and print the preview URL
    Preview {
        /// Form id
        form_id: String,
    },
    /// Database maintenance
    Db(DbCommands),
}
