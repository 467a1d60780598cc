//! Savings goal CLI commands

use clap::Subcommand;

use super::{parse_money_arg, parse_optional_date, today};
use crate::config::Settings;
use crate::display::budget::format_goal_list;
use crate::error::SpendwiseResult;
use crate::models::Money;
use crate::services::{CreateGoalInput, GoalService};
use crate::storage::Storage;

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a savings goal
    Create {
        /// Goal name
        name: String,
        /// Target amount
        target: String,
        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Amount already saved
        #[arg(short, long)]
        saved: Option<String>,
        /// Currency code (defaults to the base currency)
        #[arg(short, long)]
        currency: Option<String>,
    },
    /// List goals
    List {
        /// Include completed goals
        #[arg(short, long)]
        all: bool,
    },
    /// Add money to a goal (negative to withdraw)
    Contribute {
        /// Goal name or ID
        goal: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Set the amount saved so far
    Set {
        /// Goal name or ID
        goal: String,
        amount: String,
    },
    /// Delete a goal
    Delete {
        /// Goal name or ID
        goal: String,
    },
}

/// Handle a goal command
pub fn handle_goal_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GoalCommands,
) -> SpendwiseResult<()> {
    let service = GoalService::new(storage);

    match cmd {
        GoalCommands::Create {
            name,
            target,
            date,
            saved,
            currency,
        } => {
            let goal = service.create(CreateGoalInput {
                name,
                target_amount: parse_money_arg(&target)?,
                currency: currency.unwrap_or_else(|| settings.base_currency.clone()),
                target_date: parse_optional_date(date)?,
                starting_amount: saved
                    .as_deref()
                    .map(parse_money_arg)
                    .transpose()?
                    .unwrap_or_else(Money::zero),
            })?;
            println!(
                "Created goal '{}': {} of {}",
                goal.name,
                goal.current_amount,
                goal.target_amount.format_with_code(&goal.currency)
            );
        }

        GoalCommands::List { all } => {
            println!("{}", format_goal_list(&service.list(all)?, today()));
        }

        GoalCommands::Contribute { goal, amount } => {
            let found = service.require(&goal)?;
            let updated = service.contribute(found.id, parse_money_arg(&amount)?)?;
            println!(
                "'{}' is at {} of {} ({:.0}%)",
                updated.name,
                updated.current_amount,
                updated.target_amount.format_with_code(&updated.currency),
                updated.progress_percent()
            );
            if updated.is_complete() {
                println!("Goal reached!");
            }
        }

        GoalCommands::Set { goal, amount } => {
            let found = service.require(&goal)?;
            let updated = service.set_current(found.id, parse_money_arg(&amount)?)?;
            println!(
                "'{}' is at {} of {}",
                updated.name,
                updated.current_amount,
                updated.target_amount.format_with_code(&updated.currency)
            );
        }

        GoalCommands::Delete { goal } => {
            let found = service.require(&goal)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted goal: {}", deleted.name);
        }
    }

    Ok(())
}
