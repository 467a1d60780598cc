//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use super::parse_money_arg;
use crate::config::Settings;
use crate::display::account::{format_account_details, format_account_list};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::AccountType;
use crate::services::{AccountService, CreateAccountInput};
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (checking, savings, cash, investment, property,
        /// vehicle, credit, loan, mortgage, other)
        #[arg(short = 't', long, default_value = "checking")]
        account_type: String,
        /// Current balance (e.g., "1000.00"); liabilities may be entered positive
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        balance: String,
        /// Currency code (defaults to the base currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Household or entity label (e.g., "Personal", "Business")
        #[arg(long)]
        category: Option<String>,
    },
    /// List all accounts
    List {
        /// Show archived accounts
        #[arg(short, long)]
        all: bool,
    },
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Rename an account
    Rename {
        /// Account name or ID
        account: String,
        /// New name
        name: String,
    },
    /// Record a new balance, e.g. from a statement
    Balance {
        /// Account name or ID
        account: String,
        /// New balance
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Archive an account
    Archive {
        /// Account name or ID
        account: String,
    },
    /// Unarchive an account
    Unarchive {
        /// Account name or ID
        account: String,
    },
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> SpendwiseResult<()> {
    let service = AccountService::new(storage);

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            balance,
            currency,
            category,
        } => {
            let account_type = AccountType::parse(&account_type).ok_or_else(|| {
                SpendwiseError::Validation(format!(
                    "Invalid account type: '{}'. Valid types: checking, savings, cash, investment, property, vehicle, credit, loan, mortgage, other",
                    account_type
                ))
            })?;

            let account = service.create(CreateAccountInput {
                name,
                account_type,
                currency: currency.unwrap_or_else(|| settings.base_currency.clone()),
                balance: parse_money_arg(&balance)?,
                category,
            })?;

            println!("Created account: {}", account.name);
            println!("  Type: {} ({})", account.account_type, account.kind());
            println!(
                "  Balance: {}",
                account.balance.format_with_code(&account.currency)
            );
            println!("  ID: {}", account.id);
        }

        AccountCommands::List { all } => {
            let summaries = service.list_with_summaries(all)?;
            println!("{}", format_account_list(&summaries));
        }

        AccountCommands::Show { account } => {
            let found = service.require(&account)?;
            let summary = service.get_summary(found)?;
            print!("{}", format_account_details(&summary));
        }

        AccountCommands::Rename { account, name } => {
            let found = service.require(&account)?;
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed account '{}' to '{}'", found.name, renamed.name);
        }

        AccountCommands::Balance { account, amount } => {
            let found = service.require(&account)?;
            let updated = service.set_balance(found.id, parse_money_arg(&amount)?)?;
            println!(
                "Balance of '{}' is now {}",
                updated.name,
                updated.balance.format_with_code(&updated.currency)
            );
        }

        AccountCommands::Archive { account } => {
            let found = service.require(&account)?;
            let archived = service.archive(found.id)?;
            println!("Archived account: {}", archived.name);
        }

        AccountCommands::Unarchive { account } => {
            let found = service.require(&account)?;
            let unarchived = service.unarchive(found.id)?;
            println!("Unarchived account: {}", unarchived.name);
        }
    }

    Ok(())
}
