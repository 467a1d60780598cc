//! CLI command handler for CSV import
//!
//! Handles importing transactions from CSV files with automatic
//! column mapping detection and duplicate checking.

use std::path::PathBuf;

use clap::Args;

use crate::config::Settings;
use crate::display::import::{format_import_preview, format_import_result};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::import::{detect_columns, read_csv};
use crate::services::{AccountService, CategorizationService, ImportOptions, ImportService};
use crate::storage::Storage;

/// Arguments of the import command
#[derive(Args)]
pub struct ImportArgs {
    /// Path to the CSV file
    pub file: PathBuf,
    /// Account the transactions belong to
    #[arg(short, long)]
    pub account: Option<String>,
    /// Currency for files without a currency column
    #[arg(short, long)]
    pub currency: Option<String>,
    /// Date format tried first (chrono syntax, e.g. "%d/%m/%Y")
    #[arg(long)]
    pub date_format: Option<String>,
    /// Flip amount signs (card exports listing purchases as positive)
    #[arg(long)]
    pub invert: bool,
    /// Skip rows identical to an earlier row of the same file
    #[arg(long)]
    pub skip_repeats: bool,
    /// Show what would be imported without saving anything
    #[arg(long)]
    pub dry_run: bool,
    /// Leave imported transactions uncategorized
    #[arg(long)]
    pub no_categorize: bool,
}

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    args: ImportArgs,
) -> SpendwiseResult<()> {
    let account = args
        .account
        .as_deref()
        .map(|a| AccountService::new(storage).require(a))
        .transpose()?;

    let content = std::fs::read_to_string(&args.file).map_err(|e| {
        SpendwiseError::Import(format!("Failed to read {}: {}", args.file.display(), e))
    })?;

    let currency = args
        .currency
        .clone()
        .or_else(|| account.as_ref().map(|a| a.currency.clone()))
        .unwrap_or_else(|| settings.base_currency.clone());
    let mut options = ImportOptions::new(currency).with_skip_repeats(args.skip_repeats);
    if let Some(account) = &account {
        options = options.with_account(account.id);
    }
    if args.date_format.is_some() || args.invert {
        let mut mapping =
            detect_columns(&read_csv(&content)?.headers).with_inverted_amounts(args.invert);
        if let Some(format) = &args.date_format {
            mapping = mapping.with_date_format(format.clone());
        }
        options = options.with_mapping(mapping);
    }

    let mut service = ImportService::new(storage);
    if !args.no_categorize {
        let categorizer =
            CategorizationService::new(storage, &settings.categorization).categorizer()?;
        service = service.with_categorizer(categorizer);
    }

    let preview = service.preview(&content, &options)?;
    if preview.entries.is_empty() {
        println!("No transactions found in {}.", args.file.display());
        return Ok(());
    }

    if args.dry_run {
        print!("{}", format_import_preview(&preview));
        return Ok(());
    }

    let result = service.import(&preview, &options)?;
    println!("{}", format_import_result(&result));
    Ok(())
}
