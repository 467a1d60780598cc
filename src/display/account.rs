//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use tabled::Tabled;

use super::render_table;
use crate::services::account::AccountSummary;

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    account_type: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Txns")]
    transactions: usize,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a list of accounts with balances as a table
pub fn format_account_list(summaries: &[AccountSummary]) -> String {
    if summaries.is_empty() {
        return "No accounts found.".to_string();
    }

    let rows = summaries
        .iter()
        .map(|s| AccountRow {
            id: s.account.id.short(),
            name: s.account.name.clone(),
            account_type: s.account.account_type.to_string(),
            balance: s.account.balance.format_with_code(&s.account.currency),
            transactions: s.transaction_count,
            status: if s.account.archived {
                "Archived".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    render_table(rows)
}

/// Format a single account's details
pub fn format_account_details(summary: &AccountSummary) -> String {
    let account = &summary.account;

    let mut output = String::new();
    output.push_str(&format!("Account:      {}\n", account.name));
    output.push_str(&format!("ID:           {}\n", account.id));
    output.push_str(&format!(
        "Type:         {} ({})\n",
        account.account_type,
        account.kind()
    ));
    if let Some(category) = &account.category {
        output.push_str(&format!("Category:     {}\n", category));
    }
    output.push_str(&format!(
        "Balance:      {}\n",
        account.balance.format_with_code(&account.currency)
    ));
    output.push_str(&format!(
        "Activity:     {} over {} transaction(s)\n",
        summary.activity.format_with_code(&account.currency),
        summary.transaction_count
    ));
    if account.archived {
        output.push_str("Status:       Archived\n");
    }
    if !account.notes.is_empty() {
        output.push_str(&format!("Notes:        {}\n", account.notes));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Money};

    fn summary(account: Account) -> AccountSummary {
        AccountSummary {
            account,
            transaction_count: 2,
            activity: Money::from_cents(-1500),
        }
    }

    #[test]
    fn test_account_list() {
        assert_eq!(format_account_list(&[]), "No accounts found.");

        let mut archived = Account::new("Old Card", AccountType::CreditCard, "USD");
        archived.archive();
        let output = format_account_list(&[
            summary(Account::with_balance(
                "Checking",
                AccountType::Checking,
                "USD",
                Money::from_cents(120050),
            )),
            summary(archived),
        ]);

        assert!(output.contains("Checking"));
        assert!(output.contains("1200.50 USD"));
        assert!(output.contains("Credit Card"));
        assert!(output.contains("Archived"));
    }

    #[test]
    fn test_account_details() {
        let mut account = Account::new("Mortgage", AccountType::Mortgage, "USD");
        account.category = Some("Household".into());
        let output = format_account_details(&summary(account));

        assert!(output.contains("Account:      Mortgage"));
        assert!(output.contains("Category:     Household"));
        assert!(output.contains("-15.00 USD over 2 transaction(s)"));
    }
}
