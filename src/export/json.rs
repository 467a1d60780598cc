//! JSON Export functionality
//!
//! Exports the complete data set to JSON format with schema versioning.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{
    category_names_match, Account, Alert, Budget, Category, CategoryGroup, CategoryRule, Goal,
    MerchantProfile, Transaction,
};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub accounts: Vec<Account>,
    pub category_groups: Vec<CategoryGroup>,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
    pub alerts: Vec<Alert>,
    pub rules: Vec<CategoryRule>,
    pub merchants: Vec<MerchantProfile>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub account_count: usize,
    pub transaction_count: usize,
    pub category_count: usize,
    pub budget_count: usize,
    pub goal_count: usize,
    pub rule_count: usize,

    /// Date range of transactions (earliest)
    pub earliest_transaction: Option<String>,

    /// Date range of transactions (latest)
    pub latest_transaction: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> SpendwiseResult<Self> {
        let accounts = storage.accounts.get_all()?;
        let category_groups = storage.categories.get_all_groups()?;
        let categories = storage.categories.get_all_categories()?;
        let transactions = storage.transactions.get_chronological()?;
        let budgets = storage.budgets.get_all()?;
        let goals = storage.goals.get_all()?;
        let alerts = storage.alerts.get_all()?;
        let rules = storage.rules.get_all()?;
        let merchants = storage.merchants.get_all()?;

        let metadata = ExportMetadata {
            account_count: accounts.len(),
            transaction_count: transactions.len(),
            category_count: categories.len(),
            budget_count: budgets.len(),
            goal_count: goals.len(),
            rule_count: rules.len(),
            earliest_transaction: transactions.first().map(|t| t.date.to_string()),
            latest_transaction: transactions.last().map(|t| t.date.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            accounts,
            category_groups,
            categories,
            transactions,
            budgets,
            goals,
            alerts,
            rules,
            merchants,
            metadata,
        })
    }

    fn knows_category(&self, label: &str) -> bool {
        self.categories
            .iter()
            .any(|c| category_names_match(&c.name, label))
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let account_ids: HashSet<_> = self.accounts.iter().map(|a| a.id).collect();
        let group_ids: HashSet<_> = self.category_groups.iter().map(|g| g.id).collect();

        for txn in &self.transactions {
            if let Some(account_id) = txn.account_id {
                if !account_ids.contains(&account_id) {
                    return Err(format!(
                        "Transaction {} references unknown account {}",
                        txn.id, account_id
                    ));
                }
            }
        }

        for cat in &self.categories {
            if let Some(group_id) = cat.group_id {
                if !group_ids.contains(&group_id) {
                    return Err(format!(
                        "Category {} references unknown group {}",
                        cat.name, group_id
                    ));
                }
            }
        }

        for budget in &self.budgets {
            if !self.knows_category(&budget.category) {
                return Err(format!(
                    "Budget {} references unknown category '{}'",
                    budget.id, budget.category
                ));
            }
        }

        Ok(())
    }
}

/// Export the full data set to JSON
pub fn export_full_json<W: Write>(
    storage: &Storage,
    writer: &mut W,
    pretty: bool,
) -> SpendwiseResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| SpendwiseError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a JSON export, checking its integrity
pub fn import_from_json(json_str: &str) -> SpendwiseResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| SpendwiseError::Import(e.to_string()))?;
    export.validate().map_err(SpendwiseError::Import)?;
    Ok(export)
}
