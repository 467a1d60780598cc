//! Category Breakdown Report
//!
//! Spending per category over a date range, with each category's share of
//! total spending, plus the merchants where the money went.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::currency::CurrencyConverter;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Money, UNCATEGORIZED};
use crate::storage::Storage;

use super::{collect_flows, percentage};

/// Number of merchants kept in the report
const TOP_MERCHANTS: usize = 10;

/// Spending in one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    pub category: String,
    /// Outflow as a positive amount
    pub amount: Money,
    pub transaction_count: usize,
    /// Share of total spending
    pub percentage: f64,
}

/// Spending at one merchant pattern
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantSpending {
    pub merchant: String,
    pub amount: Money,
    pub transaction_count: usize,
}

/// Category Breakdown Report
#[derive(Debug, Clone)]
pub struct CategoryBreakdownReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base_currency: String,
    /// Largest spending first
    pub categories: Vec<CategorySpending>,
    /// Largest spending first, at most ten
    pub merchants: Vec<MerchantSpending>,
    pub total_spending: Money,
    pub total_income: Money,
}

impl CategoryBreakdownReport {
    pub fn generate(
        storage: &Storage,
        settings: &Settings,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> SpendwiseResult<Self> {
        let converter = CurrencyConverter::new(settings);
        let flows = collect_flows(storage, &converter, start_date, end_date)?;

        // Keyed by lowercase label so "groceries" and "Groceries" merge
        let mut by_category: HashMap<String, (String, Money, usize)> = HashMap::new();
        let mut by_merchant: HashMap<String, (Money, usize)> = HashMap::new();
        let mut total_spending = Money::zero();
        let mut total_income = Money::zero();

        for flow in &flows {
            if flow.is_income() {
                total_income += flow.amount;
                continue;
            }
            let spent = flow.amount.abs();
            total_spending += spent;

            let label = flow.transaction.category_label();
            let entry = by_category
                .entry(label.to_lowercase())
                .or_insert_with(|| (label.to_string(), Money::zero(), 0));
            entry.1 += spent;
            entry.2 += 1;

            if !flow.transaction.merchant.is_empty() {
                let entry = by_merchant
                    .entry(flow.transaction.merchant.clone())
                    .or_insert((Money::zero(), 0));
                entry.0 += spent;
                entry.1 += 1;
            }
        }

        let mut categories: Vec<CategorySpending> = by_category
            .into_values()
            .map(|(category, amount, transaction_count)| CategorySpending {
                percentage: percentage(amount, total_spending),
                category,
                amount,
                transaction_count,
            })
            .collect();
        categories.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.category.cmp(&b.category)));

        let mut merchants: Vec<MerchantSpending> = by_merchant
            .into_iter()
            .map(|(merchant, (amount, transaction_count))| MerchantSpending {
                merchant,
                amount,
                transaction_count,
            })
            .collect();
        merchants.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.merchant.cmp(&b.merchant)));
        merchants.truncate(TOP_MERCHANTS);

        Ok(Self {
            start_date,
            end_date,
            base_currency: converter.base_currency().to_string(),
            categories,
            merchants,
            total_spending,
            total_income,
        })
    }

    /// Spending with no real category
    pub fn uncategorized(&self) -> Option<&CategorySpending> {
        self.categories
            .iter()
            .find(|c| c.category.eq_ignore_ascii_case(UNCATEGORIZED))
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Spending by Category: {} to {} ({})\n",
            self.start_date, self.end_date, self.base_currency
        ));
        output.push_str(&"=".repeat(70));
        output.push('\n');
        output.push_str(&format!("Total Spending: {}\n", self.total_spending));
        output.push_str(&format!("Total Income:   {}\n\n", self.total_income));

        if self.categories.is_empty() {
            output.push_str("No spending in this period.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<35} {:>12} {:>8} {:>8}\n",
            "Category", "Amount", "Count", "%"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');
        for row in &self.categories {
            output.push_str(&format!(
                "{:<35} {:>12} {:>8} {:>7.1}%\n",
                row.category, row.amount, row.transaction_count, row.percentage
            ));
        }

        if !self.merchants.is_empty() {
            output.push_str("\nTop Merchants\n");
            output.push_str(&"-".repeat(70));
            output.push('\n');
            for row in &self.merchants {
                output.push_str(&format!(
                    "{:<35} {:>12} {:>8}\n",
                    row.merchant, row.amount, row.transaction_count
                ));
            }
        }
        output
    }

    pub fn export_csv<W: Write>(&self, writer: &mut W) -> SpendwiseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Category", "Amount", "Transactions", "Percentage"])?;
        for row in &self.categories {
            csv.write_record([
                row.category.clone(),
                row.amount.to_string(),
                row.transaction_count.to_string(),
                format!("{:.2}", row.percentage),
            ])?;
        }
        csv.flush()
            .map_err(|e| SpendwiseError::Export(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendwisePaths;
    use crate::models::{Categorization, Transaction};
    use crate::storage::initialize_storage;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add(storage: &Storage, cents: i64, category: Option<&str>, merchant: &str) {
        let mut txn = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            merchant,
            Money::from_cents(cents),
            "USD",
        );
        txn.merchant = merchant.to_string();
        if let Some(category) = category {
            txn.set_category(category, Categorization::manual());
        }
        storage.transactions.upsert(txn).unwrap();
    }

    fn generate(storage: &Storage) -> CategoryBreakdownReport {
        CategoryBreakdownReport::generate(
            storage,
            &Settings::default(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_breakdown_shares() {
        let (_dir, storage) = create_test_storage();
        add(&storage, -6_000, Some("Groceries"), "WHOLE FOODS");
        add(&storage, -2_000, Some("groceries"), "ALDI");
        add(&storage, -2_000, None, "MYSTERY");
        add(&storage, 50_000, Some("Income"), "ACME PAYROLL");
        add(&storage, -9_000, Some("Transfer"), "TO SAVINGS");

        let report = generate(&storage);
        assert_eq!(report.total_spending.cents(), 10_000);
        assert_eq!(report.total_income.cents(), 50_000);
        assert_eq!(report.categories.len(), 2);

        let top = &report.categories[0];
        assert!(top.category.eq_ignore_ascii_case("groceries"));
        assert_eq!(top.amount.cents(), 8_000);
        assert_eq!(top.transaction_count, 2);
        assert!((top.percentage - 80.0).abs() < 1e-9);
        assert_eq!(report.uncategorized().unwrap().amount.cents(), 2_000);

        assert_eq!(report.merchants[0].merchant, "WHOLE FOODS");
        assert_eq!(report.merchants.len(), 3);
    }

    #[test]
    fn test_empty_period() {
        let (_dir, storage) = create_test_storage();
        let report = generate(&storage);
        assert!(report.categories.is_empty());
        assert!(report.format_terminal().contains("No spending"));
    }
}
