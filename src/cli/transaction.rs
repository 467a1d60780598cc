//! Transaction CLI commands

use clap::Subcommand;

use super::{parse_date_arg, parse_money_arg, parse_optional_date, today};
use crate::config::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_list};
use crate::error::SpendwiseResult;
use crate::services::{
    AccountService, CategorizationService, CreateTransactionInput, TransactionFilter,
    TransactionService,
};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a transaction
    Add {
        /// Description as it would appear on a statement
        description: String,
        /// Amount (negative for money out)
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Transaction date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// Account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Category; categorized automatically when omitted
        #[arg(short, long)]
        category: Option<String>,
        /// Currency code (defaults to the account's or the base currency)
        #[arg(long)]
        currency: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List transactions, newest first
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Only uncategorized transactions
        #[arg(short, long)]
        uncategorized: bool,
        /// Description contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID (full or short)
        id: String,
    },
    /// Edit a transaction
    Edit {
        /// Transaction ID (full or short)
        id: String,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Set a transaction's category by hand
    Categorize {
        /// Transaction ID (full or short)
        id: String,
        /// Category name
        category: String,
    },
    /// Remove a transaction's category
    Uncategorize {
        /// Transaction ID (full or short)
        id: String,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID (full or short)
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> SpendwiseResult<()> {
    let service = TransactionService::new(storage);
    let accounts = AccountService::new(storage);

    match cmd {
        TransactionCommands::Add {
            description,
            amount,
            date,
            account,
            category,
            currency,
            notes,
        } => {
            let account = account.map(|a| accounts.require(&a)).transpose()?;
            let currency = currency
                .or_else(|| account.as_ref().map(|a| a.currency.clone()))
                .unwrap_or_else(|| settings.base_currency.clone());
            let date = match date {
                Some(d) => parse_date_arg(&d)?,
                None => today(),
            };

            let categorizer =
                CategorizationService::new(storage, &settings.categorization).categorizer()?;
            let txn = service.create(
                CreateTransactionInput {
                    account_id: account.map(|a| a.id),
                    date,
                    description,
                    amount: parse_money_arg(&amount)?,
                    currency,
                    category,
                    notes,
                },
                Some(&categorizer),
            )?;

            println!(
                "Added transaction {}: {} {} [{}]",
                txn.id,
                txn.description,
                txn.amount.format_with_code(&txn.currency),
                txn.category_label()
            );
        }

        TransactionCommands::List {
            account,
            category,
            uncategorized,
            search,
            from,
            to,
            limit,
        } => {
            let filter = TransactionFilter {
                account_id: account.map(|a| accounts.require(&a)).transpose()?.map(|a| a.id),
                category,
                start_date: parse_optional_date(from)?,
                end_date: parse_optional_date(to)?,
                uncategorized,
                search,
                limit: Some(limit),
            };
            println!("{}", format_transaction_list(&service.list(&filter)?));
        }

        TransactionCommands::Show { id } => {
            let txn = service.require(&id)?;
            let account_name = match txn.account_id {
                Some(account_id) => accounts.get(account_id)?.map(|a| a.name),
                None => None,
            };
            print!("{}", format_transaction_details(&txn, account_name.as_deref()));
        }

        TransactionCommands::Edit {
            id,
            date,
            description,
            amount,
            notes,
        } => {
            let txn = service.require(&id)?;
            if date.is_none() && description.is_none() && amount.is_none() && notes.is_none() {
                println!("No changes specified. Use --date, --description, --amount or --notes.");
                return Ok(());
            }
            let updated = service.update(
                txn.id,
                parse_optional_date(date)?,
                description,
                amount.as_deref().map(parse_money_arg).transpose()?,
                notes,
            )?;
            println!("Updated transaction {}", updated.id);
        }

        TransactionCommands::Categorize { id, category } => {
            let txn = service.require(&id)?;
            let updated = CategorizationService::new(storage, &settings.categorization)
                .assign(txn.id, &category)?;
            println!(
                "Categorized {} as '{}'",
                updated.description,
                updated.category_label()
            );
        }

        TransactionCommands::Uncategorize { id } => {
            let txn = service.require(&id)?;
            service.clear_category(txn.id)?;
            println!("Cleared category of {}", txn.description);
        }

        TransactionCommands::Delete { id } => {
            let txn = service.require(&id)?;
            let deleted = service.delete(txn.id)?;
            println!(
                "Deleted transaction {}: {} {}",
                deleted.id,
                deleted.description,
                deleted.amount.format_with_code(&deleted.currency)
            );
        }
    }

    Ok(())
}
