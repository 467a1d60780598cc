//! Transaction display formatting

use tabled::Tabled;

use super::{render_table, truncate};
use crate::models::Transaction;

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Source")]
    source: String,
}

/// Format transactions as a table, in the order given
pub fn format_transaction_list(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.".to_string();
    }

    let rows = transactions
        .iter()
        .map(|txn| TransactionRow {
            id: txn.id.short(),
            date: txn.date.format("%Y-%m-%d").to_string(),
            description: truncate(&txn.description, 32),
            amount: txn.amount.format_with_code(&txn.currency),
            category: txn.category_label().to_string(),
            source: txn
                .categorization
                .as_ref()
                .map(|c| c.source.to_string())
                .unwrap_or_default(),
        })
        .collect();

    format!(
        "{}\n{} transaction(s)",
        render_table(rows),
        transactions.len()
    )
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, account_name: Option<&str>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_code(&txn.currency)
    ));
    if let Some(name) = account_name {
        output.push_str(&format!("Account:     {}\n", name));
    }
    if !txn.merchant.is_empty() {
        output.push_str(&format!("Merchant:    {}\n", txn.merchant));
    }

    output.push_str(&format!("Category:    {}\n", txn.category_label()));
    if let Some(how) = &txn.categorization {
        let rule = how
            .rule
            .as_deref()
            .map(|r| format!(", rule '{}'", r))
            .unwrap_or_default();
        output.push_str(&format!(
            "Decided by:  {} ({:.0}% confidence{})\n",
            how.source,
            how.confidence * 100.0,
            rule
        ));
    }

    if !txn.notes.is_empty() {
        output.push_str(&format!("Notes:       {}\n", txn.notes));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Categorization, CategorizationSource, Money};
    use chrono::NaiveDate;

    fn coffee() -> Transaction {
        let mut txn = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            "STARBUCKS STORE 00123 SEATTLE WA",
            Money::from_cents(-575),
            "USD",
        );
        txn.merchant = "STARBUCKS".into();
        txn.set_category(
            "Food & Dining",
            Categorization {
                source: CategorizationSource::Rule,
                confidence: 0.9,
                rule: Some("Coffee shops".into()),
            },
        );
        txn
    }

    #[test]
    fn test_transaction_list() {
        assert_eq!(format_transaction_list(&[]), "No transactions found.");

        let output = format_transaction_list(&[coffee()]);
        assert!(output.contains("2025-01-15"));
        assert!(output.contains("-5.75 USD"));
        assert!(output.contains("Food & Dining"));
        assert!(output.ends_with("1 transaction(s)"));
    }

    #[test]
    fn test_transaction_details() {
        let output = format_transaction_details(&coffee(), Some("Checking"));
        assert!(output.contains("Account:     Checking"));
        assert!(output.contains("Merchant:    STARBUCKS"));
        assert!(output.contains("Decided by:  rule (90% confidence, rule 'Coffee shops')"));

        let plain = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
            "UNKNOWN",
            Money::from_cents(-100),
            "USD",
        );
        assert!(format_transaction_details(&plain, None).contains("Category:    Uncategorized"));
    }
}
