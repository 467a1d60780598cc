//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod ai;
pub mod alert;
pub mod budget;
pub mod categorize;
pub mod category;
pub mod duplicates;
pub mod export;
pub mod goal;
pub mod import;
pub mod report;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use ai::{handle_ai_command, AiCommands};
pub use alert::{handle_alert_command, AlertCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use categorize::{handle_categorize_command, CategorizeCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use duplicates::{handle_duplicates_command, DuplicatesCommands};
pub use export::{handle_export_command, ExportCommands};
pub use goal::{handle_goal_command, GoalCommands};
pub use import::{handle_import_command, ImportArgs};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::Money;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument
pub(crate) fn parse_date_arg(value: &str) -> SpendwiseResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SpendwiseError::Validation(format!("Invalid date: '{}'. Use YYYY-MM-DD", value))
    })
}

pub(crate) fn parse_optional_date(value: Option<String>) -> SpendwiseResult<Option<NaiveDate>> {
    value.as_deref().map(parse_date_arg).transpose()
}

/// Parse an amount such as `12.50`, `-40` or `$1,200.00`
pub(crate) fn parse_money_arg(value: &str) -> SpendwiseResult<Money> {
    Money::parse(value).map_err(|e| {
        SpendwiseError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '12.50'. {}",
            value, e
        ))
    })
}

pub(crate) fn start_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Open a file for a report or export
pub(crate) fn create_output(path: &Path) -> SpendwiseResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        SpendwiseError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}
