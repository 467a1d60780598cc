//! CSV Export functionality
//!
//! Exports transactions and accounts to CSV format.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::services::AccountService;
use crate::storage::Storage;

/// Export transactions to CSV, oldest first
///
/// `range` limits the export to an inclusive date range.
pub fn export_transactions_csv<W: Write>(
    storage: &Storage,
    writer: &mut W,
    range: Option<(NaiveDate, NaiveDate)>,
) -> SpendwiseResult<usize> {
    let account_names: HashMap<_, _> = AccountService::new(storage)
        .list(true)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    let transactions = storage.transactions.get_chronological()?;
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "ID",
        "Date",
        "Account",
        "Description",
        "Merchant",
        "Category",
        "Source",
        "Confidence",
        "Amount",
        "Currency",
        "Notes",
    ])?;

    let mut written = 0;
    for txn in transactions
        .iter()
        .filter(|t| range.map_or(true, |(start, end)| t.date >= start && t.date <= end))
    {
        let account = txn
            .account_id
            .and_then(|id| account_names.get(&id).cloned())
            .unwrap_or_default();
        let (source, confidence) = match &txn.categorization {
            Some(how) => (how.source.to_string(), format!("{:.2}", how.confidence)),
            None => (String::new(), String::new()),
        };

        csv.write_record([
            txn.id.to_string(),
            txn.date.to_string(),
            account,
            txn.description.clone(),
            txn.merchant.clone(),
            txn.category.clone().unwrap_or_default(),
            source,
            confidence,
            txn.amount.to_string(),
            txn.currency.clone(),
            txn.notes.clone(),
        ])?;
        written += 1;
    }

    csv.flush()
        .map_err(|e| SpendwiseError::Export(e.to_string()))?;
    Ok(written)
}

/// Export accounts to CSV
pub fn export_accounts_csv<W: Write>(storage: &Storage, writer: &mut W) -> SpendwiseResult<usize> {
    let accounts = AccountService::new(storage).list(true)?;
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "ID", "Name", "Type", "Category", "Balance", "Currency", "Archived",
    ])?;

    for account in &accounts {
        csv.write_record([
            account.id.to_string(),
            account.name.clone(),
            account.account_type.to_string(),
            account.category.clone().unwrap_or_default(),
            account.balance.to_string(),
            account.currency.clone(),
            account.archived.to_string(),
        ])?;
    }

    csv.flush()
        .map_err(|e| SpendwiseError::Export(e.to_string()))?;
    Ok(accounts.len())
}
