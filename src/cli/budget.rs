//! Budget CLI commands
//!
//! Implements CLI commands for per-category spending limits.

use clap::Subcommand;

use super::{parse_date_arg, parse_money_arg, start_of_month, today};
use crate::config::Settings;
use crate::display::budget::format_budget_list;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::BudgetPeriod;
use crate::reports::BudgetReport;
use crate::services::{BudgetService, CreateBudgetInput};
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set a spending limit for a category
    Create {
        /// Category name
        category: String,
        /// Limit per period (e.g., "400.00")
        amount: String,
        /// Period (weekly, monthly, yearly)
        #[arg(short, long, default_value = "monthly")]
        period: String,
        /// Currency code (defaults to the base currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// First day the budget applies (YYYY-MM-DD, default start of this month)
        #[arg(short, long)]
        start: Option<String>,
    },
    /// List budgets with their current spending
    List,
    /// Show utilisation of every budget
    Status {
        /// Evaluate as of this date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Change a budget's limit
    Set {
        /// Budget category or ID
        budget: String,
        /// New limit
        amount: String,
    },
    /// Delete a budget
    Delete {
        /// Budget category or ID
        budget: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> SpendwiseResult<()> {
    let service = BudgetService::new(storage, settings);

    match cmd {
        BudgetCommands::Create {
            category,
            amount,
            period,
            currency,
            start,
        } => {
            let period = BudgetPeriod::parse(&period).ok_or_else(|| {
                SpendwiseError::Validation(format!(
                    "Invalid period: '{}'. Valid periods: weekly, monthly, yearly",
                    period
                ))
            })?;
            let start_date = match start {
                Some(s) => parse_date_arg(&s)?,
                None => start_of_month(today()),
            };

            let budget = service.create(CreateBudgetInput {
                category,
                amount: parse_money_arg(&amount)?,
                currency: currency.unwrap_or_else(|| settings.base_currency.clone()),
                period,
                start_date,
            })?;
            println!(
                "Created {} budget for '{}': {}",
                budget.period.to_string().to_lowercase(),
                budget.category,
                budget.amount.format_with_code(&budget.currency)
            );
        }

        BudgetCommands::List => {
            let budgets = service.list()?;
            let statuses = service.status_all(today())?;
            println!("{}", format_budget_list(&budgets, &statuses));
        }

        BudgetCommands::Status { date } => {
            let as_of = match date {
                Some(d) => parse_date_arg(&d)?,
                None => today(),
            };
            println!("{}", BudgetReport::generate(storage, settings, as_of)?.format_terminal());
        }

        BudgetCommands::Set { budget, amount } => {
            let found = service.require(&budget)?;
            let updated = service.set_amount(found.id, parse_money_arg(&amount)?)?;
            println!(
                "Budget for '{}' is now {}",
                updated.category,
                updated.amount.format_with_code(&updated.currency)
            );
        }

        BudgetCommands::Delete { budget } => {
            let found = service.require(&budget)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted budget for '{}'", deleted.category);
        }
    }

    Ok(())
}
