//! CLI commands for reports
//!
//! Provides commands for generating and exporting financial reports.

use std::io::Write;
use std::path::PathBuf;

use chrono::{Months, NaiveDate};
use clap::Subcommand;

use super::{create_output, parse_optional_date, start_of_month, today};
use crate::config::Settings;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::reports::{
    BudgetReport, CategoryBreakdownReport, GoalReport, MonthlySummaryReport, NetWorthReport,
};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Income, spending and savings rate per month
    Monthly {
        /// Start date (YYYY-MM-DD, default six months back)
        #[arg(short, long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        to: Option<String>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Spending by category with top merchants
    #[command(alias = "spending")]
    Categories {
        /// Start date (YYYY-MM-DD, default start of this month)
        #[arg(short, long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        to: Option<String>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Budget utilisation for the current periods
    Budgets,

    /// Generate a net worth report
    #[command(alias = "nw")]
    NetWorth {
        /// Include archived accounts
        #[arg(short, long)]
        all: bool,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Progress towards savings goals
    Goals {
        /// Include completed goals
        #[arg(short, long)]
        all: bool,
    },
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> SpendwiseResult<()> {
    let now = today();

    match cmd {
        ReportCommands::Monthly { from, to, output } => {
            let default_start = start_of_month(now)
                .checked_sub_months(Months::new(5))
                .unwrap_or(NaiveDate::MIN);
            let (start, end) = date_range(from, to, default_start, now)?;
            let report = MonthlySummaryReport::generate(storage, settings, start, end)?;
            match output {
                Some(path) => {
                    let mut writer = create_output(&path)?;
                    report.export_csv(&mut writer)?;
                    finish(writer, &path)?;
                }
                None => println!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Categories { from, to, output } => {
            let (start, end) = date_range(from, to, start_of_month(now), now)?;
            let report = CategoryBreakdownReport::generate(storage, settings, start, end)?;
            match output {
                Some(path) => {
                    let mut writer = create_output(&path)?;
                    report.export_csv(&mut writer)?;
                    finish(writer, &path)?;
                }
                None => println!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Budgets => {
            println!("{}", BudgetReport::generate(storage, settings, now)?.format_terminal());
        }

        ReportCommands::NetWorth { all, output } => {
            let report = NetWorthReport::generate(storage, settings, all)?;
            match output {
                Some(path) => {
                    let mut writer = create_output(&path)?;
                    report.export_csv(&mut writer)?;
                    finish(writer, &path)?;
                }
                None => println!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Goals { all } => {
            println!("{}", GoalReport::generate(storage, now, all)?.format_terminal());
        }
    }

    Ok(())
}

fn date_range(
    from: Option<String>,
    to: Option<String>,
    default_start: NaiveDate,
    default_end: NaiveDate,
) -> SpendwiseResult<(NaiveDate, NaiveDate)> {
    let start = parse_optional_date(from)?.unwrap_or(default_start);
    let end = parse_optional_date(to)?.unwrap_or(default_end);
    if start > end {
        return Err(SpendwiseError::Validation(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }
    Ok((start, end))
}

fn finish<W: Write>(mut writer: W, path: &std::path::Path) -> SpendwiseResult<()> {
    writer
        .flush()
        .map_err(|e| SpendwiseError::Export(e.to_string()))?;
    println!("Report exported to: {}", path.display());
    Ok(())
}
