//! Net Worth Report
//!
//! Account balances grouped by type, with assets, liabilities and net worth
//! in the base currency.

use std::collections::HashMap;
use std::io::Write;

use crate::config::Settings;
use crate::currency::CurrencyConverter;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{AccountId, AccountKind, AccountType, Money};
use crate::services::AccountService;
use crate::storage::Storage;

/// One account's balance
#[derive(Debug, Clone)]
pub struct AccountBalance {
    pub account_id: AccountId,
    pub account_name: String,
    pub account_type: AccountType,
    /// Free-form grouping label (household member, business, ...)
    pub category: Option<String>,
    /// Balance as entered, in the account currency
    pub balance: Money,
    pub currency: String,
    /// Signed contribution to net worth in the base currency
    pub base_value: Money,
}

/// Accounts of one type
#[derive(Debug, Clone)]
pub struct AccountTypeGroup {
    pub account_type: AccountType,
    pub accounts: Vec<AccountBalance>,
    /// Sum of `base_value` over the group
    pub total: Money,
}

impl AccountTypeGroup {
    pub fn new(account_type: AccountType) -> Self {
        Self {
            account_type,
            accounts: Vec::new(),
            total: Money::zero(),
        }
    }

    pub fn add_account(&mut self, account: AccountBalance) {
        self.total += account.base_value;
        self.accounts.push(account);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetWorthSummary {
    pub total_assets: Money,
    /// Amount owed, as a positive number
    pub total_liabilities: Money,
    pub net_worth: Money,
}

/// Net Worth Report
#[derive(Debug, Clone)]
pub struct NetWorthReport {
    pub base_currency: String,
    /// Assets first, then liabilities
    pub groups: Vec<AccountTypeGroup>,
    pub summary: NetWorthSummary,
    pub include_archived: bool,
}

impl NetWorthReport {
    pub fn generate(
        storage: &Storage,
        settings: &Settings,
        include_archived: bool,
    ) -> SpendwiseResult<Self> {
        let converter = CurrencyConverter::new(settings);
        let accounts = AccountService::new(storage).list(include_archived)?;

        let mut groups: HashMap<AccountType, AccountTypeGroup> = HashMap::new();
        let mut total_assets = Money::zero();
        let mut total_liabilities = Money::zero();

        for account in accounts {
            let base_value =
                converter.to_base(account.net_worth_contribution(), &account.currency)?;
            match account.kind() {
                AccountKind::Asset => total_assets += base_value,
                AccountKind::Liability => total_liabilities += base_value.abs(),
            }

            groups
                .entry(account.account_type)
                .or_insert_with(|| AccountTypeGroup::new(account.account_type))
                .add_account(AccountBalance {
                    account_id: account.id,
                    account_name: account.name.clone(),
                    account_type: account.account_type,
                    category: account.category.clone(),
                    balance: account.balance,
                    currency: account.currency.clone(),
                    base_value,
                });
        }

        let mut groups: Vec<_> = groups.into_values().collect();
        groups.sort_by_key(|g| account_type_sort_order(g.account_type));

        Ok(Self {
            base_currency: converter.base_currency().to_string(),
            groups,
            summary: NetWorthSummary {
                total_assets,
                total_liabilities,
                net_worth: total_assets - total_liabilities,
            },
            include_archived,
        })
    }

    pub fn account_count(&self) -> usize {
        self.groups.iter().map(|g| g.accounts.len()).sum()
    }

    /// Net worth per account category label; accounts without one are
    /// grouped under "Personal"
    pub fn by_account_category(&self) -> Vec<(String, Money)> {
        let mut totals: HashMap<String, Money> = HashMap::new();
        for account in self.groups.iter().flat_map(|g| &g.accounts) {
            let label = account
                .category
                .clone()
                .unwrap_or_else(|| "Personal".to_string());
            *totals.entry(label).or_default() += account.base_value;
        }
        let mut list: Vec<_> = totals.into_iter().collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Net Worth Report ({})\n", self.base_currency));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "Total Assets:      {:>15}\n",
            self.summary.total_assets
        ));
        output.push_str(&format!(
            "Total Liabilities: {:>15}\n",
            self.summary.total_liabilities
        ));
        output.push_str(&"-".repeat(35));
        output.push('\n');
        output.push_str(&format!(
            "Net Worth:         {:>15}\n\n",
            self.summary.net_worth
        ));

        output.push_str(&format!(
            "{:<30} {:>16} {:>12}\n",
            "Account", "Balance", "Value"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for group in &self.groups {
            output.push_str(&format!("\n{}\n", group.account_type.to_string().to_uppercase()));
            for account in &group.accounts {
                output.push_str(&format!(
                    "  {:<28} {:>16} {:>12}\n",
                    account.account_name,
                    account.balance.format_with_code(&account.currency),
                    account.base_value
                ));
            }
            output.push_str(&format!(
                "  {:<28} {:>16} {:>12}\n",
                "Subtotal:", "", group.total
            ));
        }
        output
    }

    pub fn export_csv<W: Write>(&self, writer: &mut W) -> SpendwiseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Account Type", "Account Name", "Balance", "Currency", "Value"])?;
        for group in &self.groups {
            for account in &group.accounts {
                csv.write_record([
                    group.account_type.to_string(),
                    account.account_name.clone(),
                    account.balance.to_string(),
                    account.currency.clone(),
                    account.base_value.to_string(),
                ])?;
            }
        }
        for (label, value) in [
            ("Total Assets", self.summary.total_assets),
            ("Total Liabilities", self.summary.total_liabilities),
            ("Net Worth", self.summary.net_worth),
        ] {
            csv.write_record([
                "SUMMARY".to_string(),
                label.to_string(),
                String::new(),
                self.base_currency.clone(),
                value.to_string(),
            ])?;
        }
        csv.flush()
            .map_err(|e| SpendwiseError::Export(e.to_string()))?;
        Ok(())
    }
}

/// Assets first, then liabilities
fn account_type_sort_order(account_type: AccountType) -> i32 {
    match account_type {
        AccountType::Checking => 0,
        AccountType::Savings => 1,
        AccountType::Cash => 2,
        AccountType::Investment => 3,
        AccountType::Property => 4,
        AccountType::Vehicle => 5,
        AccountType::Other => 6,
        AccountType::CreditCard => 10,
        AccountType::Loan => 11,
        AccountType::Mortgage => 12,
    }
}
