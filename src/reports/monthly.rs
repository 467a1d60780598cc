//! Monthly Summary Report
//!
//! Income, spending and net cash flow per calendar month.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{Datelike, NaiveDate};

use crate::config::Settings;
use crate::currency::CurrencyConverter;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::Money;
use crate::storage::Storage;

use super::collect_flows;

/// Cash flow for one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub income: Money,
    /// Total outflow as a positive amount
    pub spending: Money,
    pub net: Money,
    pub transaction_count: usize,
}

impl MonthSummary {
    fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            income: Money::zero(),
            spending: Money::zero(),
            net: Money::zero(),
            transaction_count: 0,
        }
    }

    /// "YYYY-MM"
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Share of income kept, as a percentage
    pub fn savings_rate(&self) -> Option<f64> {
        if !self.income.is_positive() {
            return None;
        }
        Some(self.net.cents() as f64 / self.income.cents() as f64 * 100.0)
    }
}

/// Monthly Summary Report
#[derive(Debug, Clone)]
pub struct MonthlySummaryReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base_currency: String,
    /// Oldest month first; months without activity are included
    pub months: Vec<MonthSummary>,
    pub total_income: Money,
    pub total_spending: Money,
}

impl MonthlySummaryReport {
    pub fn generate(
        storage: &Storage,
        settings: &Settings,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> SpendwiseResult<Self> {
        let converter = CurrencyConverter::new(settings);
        let flows = collect_flows(storage, &converter, start_date, end_date)?;

        let mut months: BTreeMap<(i32, u32), MonthSummary> = BTreeMap::new();
        let mut cursor = (start_date.year(), start_date.month());
        let last = (end_date.year(), end_date.month());
        while cursor <= last {
            months.insert(cursor, MonthSummary::new(cursor.0, cursor.1));
            cursor = if cursor.1 == 12 {
                (cursor.0 + 1, 1)
            } else {
                (cursor.0, cursor.1 + 1)
            };
        }

        for flow in &flows {
            let key = (flow.transaction.date.year(), flow.transaction.date.month());
            let summary = months
                .entry(key)
                .or_insert_with(|| MonthSummary::new(key.0, key.1));
            if flow.is_income() {
                summary.income += flow.amount;
            } else {
                summary.spending += flow.amount.abs();
            }
            summary.transaction_count += 1;
        }

        let mut months: Vec<MonthSummary> = months.into_values().collect();
        for summary in &mut months {
            summary.net = summary.income - summary.spending;
        }

        Ok(Self {
            start_date,
            end_date,
            base_currency: converter.base_currency().to_string(),
            total_income: months.iter().map(|m| m.income).sum(),
            total_spending: months.iter().map(|m| m.spending).sum(),
            months,
        })
    }

    pub fn net(&self) -> Money {
        self.total_income - self.total_spending
    }

    /// Mean monthly spending over the months in the report
    pub fn average_spending(&self) -> Money {
        if self.months.is_empty() {
            return Money::zero();
        }
        Money::from_cents(self.total_spending.cents() / self.months.len() as i64)
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Monthly Summary: {} to {} ({})\n",
            self.start_date, self.end_date, self.base_currency
        ));
        output.push_str(&"=".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>12} {:>12} {:>12} {:>8} {:>6}\n",
            "Month", "Income", "Spending", "Net", "Saved", "Txns"
        ));
        output.push_str(&"-".repeat(64));
        output.push('\n');

        for month in &self.months {
            let rate = month
                .savings_rate()
                .map(|r| format!("{:.0}%", r))
                .unwrap_or_else(|| "-".into());
            output.push_str(&format!(
                "{:<10} {:>12} {:>12} {:>12} {:>8} {:>6}\n",
                month.label(),
                month.income,
                month.spending,
                month.net,
                rate,
                month.transaction_count
            ));
        }

        output.push_str(&"-".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>12} {:>12} {:>12}\n",
            "TOTAL",
            self.total_income,
            self.total_spending,
            self.net()
        ));
        output.push_str(&format!(
            "Average monthly spending: {}\n",
            self.average_spending()
        ));
        output
    }

    pub fn export_csv<W: Write>(&self, writer: &mut W) -> SpendwiseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Month", "Income", "Spending", "Net", "Transactions"])?;
        for month in &self.months {
            csv.write_record([
                month.label(),
                month.income.to_string(),
                month.spending.to_string(),
                month.net.to_string(),
                month.transaction_count.to_string(),
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

    fn add(storage: &Storage, date: NaiveDate, cents: i64, category: Option<&str>) {
        let mut txn = Transaction::new(date, "x", Money::from_cents(cents), "USD");
        if let Some(category) = category {
            txn.set_category(category, Categorization::manual());
        }
        storage.transactions.upsert(txn).unwrap();
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn test_monthly_totals() {
        let (_dir, storage) = create_test_storage();
        add(&storage, d(1, 5), 300_000, Some("Income"));
        add(&storage, d(1, 9), -120_000, Some("Housing"));
        add(&storage, d(1, 20), -50_000, Some("Transfer"));
        add(&storage, d(3, 2), -4_500, None);

        let report =
            MonthlySummaryReport::generate(&storage, &Settings::default(), d(1, 1), d(3, 31))
                .unwrap();

        assert_eq!(report.months.len(), 3);
        let jan = &report.months[0];
        assert_eq!(jan.label(), "2025-01");
        assert_eq!(jan.income.cents(), 300_000);
        assert_eq!(jan.spending.cents(), 120_000);
        assert_eq!(jan.net.cents(), 180_000);
        assert_eq!(jan.transaction_count, 2);
        assert_eq!(jan.savings_rate(), Some(60.0));

        assert_eq!(report.months[1].transaction_count, 0);
        assert_eq!(report.months[2].spending.cents(), 4_500);
        assert_eq!(report.total_spending.cents(), 124_500);
        assert_eq!(report.net().cents(), 175_500);
        assert_eq!(report.average_spending().cents(), 41_500);
    }

    #[test]
    fn test_unknown_currency_is_an_error() {
        let (_dir, storage) = create_test_storage();
        storage
            .transactions
            .upsert(Transaction::new(d(2, 1), "x", Money::from_cents(-100), "CHF"))
            .unwrap();
        let err = MonthlySummaryReport::generate(&storage, &Settings::default(), d(2, 1), d(2, 28))
            .unwrap_err();
        assert!(err.to_string().contains("CHF"));
    }

    #[test]
    fn test_terminal_and_csv() {
        let (_dir, storage) = create_test_storage();
        add(&storage, d(4, 1), -2_000, Some("Groceries"));
        let report =
            MonthlySummaryReport::generate(&storage, &Settings::default(), d(4, 1), d(4, 30))
                .unwrap();

        assert!(report.format_terminal().contains("2025-04"));

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Month,Income,Spending,Net,Transactions"));
        assert!(text.contains("2025-04,0.00,20.00,-20.00,1"));
    }
}
