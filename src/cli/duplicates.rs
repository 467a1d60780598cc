//! Duplicate detection CLI commands

use clap::Subcommand;

use super::parse_optional_date;
use crate::config::Settings;
use crate::display::duplicates::format_duplicate_report;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::services::DuplicateService;
use crate::storage::Storage;

/// Duplicate subcommands
#[derive(Subcommand)]
pub enum DuplicatesCommands {
    /// Find groups of likely duplicate transactions
    Scan {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Delete duplicates, keeping the first transaction of each group
    Resolve {
        /// Group numbers from `duplicates scan`; every group when omitted
        groups: Vec<usize>,
        /// Start date used for the scan (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date used for the scan (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Confirm deletion
        #[arg(short, long)]
        yes: bool,
    },
}

fn scan_range(
    from: Option<String>,
    to: Option<String>,
) -> SpendwiseResult<Option<(chrono::NaiveDate, chrono::NaiveDate)>> {
    match (parse_optional_date(from)?, parse_optional_date(to)?) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) if start <= end => Ok(Some((start, end))),
        (Some(_), Some(_)) => Err(SpendwiseError::Validation(
            "--from must not be after --to".into(),
        )),
        (start, end) => Ok(Some((
            start.unwrap_or(chrono::NaiveDate::MIN),
            end.unwrap_or(chrono::NaiveDate::MAX),
        ))),
    }
}

/// Handle a duplicates command
pub fn handle_duplicates_command(
    storage: &Storage,
    settings: &Settings,
    cmd: DuplicatesCommands,
) -> SpendwiseResult<()> {
    let service = DuplicateService::new(storage, &settings.duplicates);

    match cmd {
        DuplicatesCommands::Scan { from, to } => {
            let report = service.scan(scan_range(from, to)?)?;
            print!("{}", format_duplicate_report(&report));
            if !report.is_empty() {
                println!("Run 'spendwise duplicates resolve --yes' to delete the duplicates.");
            } else {
                println!();
            }
        }

        DuplicatesCommands::Resolve {
            groups,
            from,
            to,
            yes,
        } => {
            let report = service.scan(scan_range(from, to)?)?;
            if report.is_empty() {
                println!("No duplicate transactions found.");
                return Ok(());
            }
            if !yes {
                print!("{}", format_duplicate_report(&report));
                println!("Re-run with --yes to delete the transactions marked 'dup'.");
                return Ok(());
            }
            let deleted = service.resolve(&report, &groups)?;
            println!("Deleted {} duplicate transaction(s).", deleted.len());
        }
    }

    Ok(())
}
