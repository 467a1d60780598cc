//! CLI commands for data export
//!
//! Provides commands for exporting data in various formats.

use std::io::Write;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use super::{create_output, parse_optional_date};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::export::{csv, json, yaml};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (transactions only)
    Csv,
    /// JSON format (everything)
    Json,
    /// YAML format (everything, human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export all data to a file
    All {
        /// Output file path
        output: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export transactions to CSV
    Transactions {
        /// Output file path
        output: PathBuf,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Export accounts to CSV
    Accounts {
        /// Output file path
        output: PathBuf,
    },

    /// Show export information without writing files
    Info,
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> SpendwiseResult<()> {
    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_output(&output)?;
            match format {
                ExportFormat::Csv => {
                    let count = csv::export_transactions_csv(storage, &mut writer, None)?;
                    println!("Exported {} transactions to: {}", count, output.display());
                    println!("Note: CSV holds transactions only. Use JSON or YAML for everything.");
                }
                ExportFormat::Json => {
                    json::export_full_json(storage, &mut writer, pretty)?;
                    println!("Full export written to: {}", output.display());
                }
                ExportFormat::Yaml => {
                    yaml::export_full_yaml(storage, &mut writer)?;
                    println!("Full export written to: {}", output.display());
                }
            }
            writer
                .flush()
                .map_err(|e| SpendwiseError::Export(e.to_string()))?;
        }

        ExportCommands::Transactions { output, from, to } => {
            let range = match (parse_optional_date(from)?, parse_optional_date(to)?) {
                (None, None) => None,
                (from, to) => Some((
                    from.unwrap_or(chrono::NaiveDate::MIN),
                    to.unwrap_or(chrono::NaiveDate::MAX),
                )),
            };
            let mut writer = create_output(&output)?;
            let count = csv::export_transactions_csv(storage, &mut writer, range)?;
            println!("Exported {} transactions to: {}", count, output.display());
        }

        ExportCommands::Accounts { output } => {
            let mut writer = create_output(&output)?;
            let count = csv::export_accounts_csv(storage, &mut writer)?;
            println!("Exported {} accounts to: {}", count, output.display());
        }

        ExportCommands::Info => {
            let export = json::FullExport::from_storage(storage)?;

            println!("Export Information");
            println!("==================\n");
            println!("Schema Version: {}", export.schema_version);
            println!("App Version:    {}", export.app_version);
            println!();
            println!("Data Summary:");
            println!("  Accounts:      {}", export.metadata.account_count);
            println!("  Transactions:  {}", export.metadata.transaction_count);
            println!("  Categories:    {}", export.metadata.category_count);
            println!("  Budgets:       {}", export.metadata.budget_count);
            println!("  Goals:         {}", export.metadata.goal_count);
            println!("  Rules:         {}", export.metadata.rule_count);

            if let (Some(earliest), Some(latest)) = (
                &export.metadata.earliest_transaction,
                &export.metadata.latest_transaction,
            ) {
                println!("\nTransactions span {} to {}", earliest, latest);
            }

            println!("\nExamples:");
            println!("  spendwise export all backup.json --format json --pretty");
            println!("  spendwise export transactions txns.csv --from 2025-01-01");
        }
    }

    Ok(())
}
