//! Alert service
//!
//! Budget checks raise alerts at fixed utilisation thresholds. AI insights
//! are stored through the same service.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Alert, AlertId, AlertKind, Severity};
use crate::services::budget::{BudgetService, BudgetStatus};
use crate::storage::Storage;

/// Utilisation (percent) at which a budget raises a warning
pub const WARNING_THRESHOLD: f64 = 80.0;

/// Utilisation (percent) at which a budget alert becomes critical
pub const CRITICAL_THRESHOLD: f64 = 100.0;

/// Service for alerts and insights
pub struct AlertService<'a> {
    storage: &'a Storage,
}

impl<'a> AlertService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Store new alerts
    pub fn add(&self, alerts: Vec<Alert>) -> SpendwiseResult<usize> {
        let count = alerts.len();
        for alert in alerts {
            self.storage.alerts.upsert(alert)?;
        }
        self.storage.alerts.save()?;
        Ok(count)
    }

    /// Alerts newest first
    pub fn list(&self, include_dismissed: bool) -> SpendwiseResult<Vec<Alert>> {
        self.storage
            .alerts
            .filter(|a| include_dismissed || a.is_active())
    }

    pub fn require(&self, identifier: &str) -> SpendwiseResult<Alert> {
        self.storage
            .alerts
            .find(|a| a.id.matches(identifier))?
            .ok_or_else(|| SpendwiseError::NotFound {
                entity_type: "Alert",
                identifier: identifier.to_string(),
            })
    }

    pub fn dismiss(&self, id: AlertId) -> SpendwiseResult<Alert> {
        let mut alert = self.storage.alerts.get(id)?.ok_or_else(|| SpendwiseError::NotFound {
            entity_type: "Alert",
            identifier: id.to_string(),
        })?;
        alert.dismiss();
        self.storage.alerts.upsert(alert.clone())?;
        self.storage.alerts.save()?;
        Ok(alert)
    }

    /// Dismiss every active alert, returning how many changed
    pub fn dismiss_all(&self) -> SpendwiseResult<usize> {
        let active = self.list(false)?;
        for mut alert in active.iter().cloned() {
            alert.dismiss();
            self.storage.alerts.upsert(alert)?;
        }
        self.storage.alerts.save()?;
        Ok(active.len())
    }

    /// Delete dismissed alerts
    pub fn purge_dismissed(&self) -> SpendwiseResult<usize> {
        let dismissed = self.storage.alerts.filter(|a| a.dismissed)?;
        for alert in &dismissed {
            self.storage.alerts.delete(alert.id)?;
        }
        self.storage.alerts.save()?;
        Ok(dismissed.len())
    }

    /// Raise budget alerts for the period containing `as_of`
    ///
    /// One active alert is kept per budget and period: a warning that
    /// crosses into critical is escalated in place, and an alert already
    /// raised at the same severity is left alone. Returns the alerts created
    /// or escalated.
    pub fn check_budgets(&self, settings: &Settings, as_of: NaiveDate) -> SpendwiseResult<Vec<Alert>> {
        let statuses = BudgetService::new(self.storage, settings).status_all(as_of)?;
        let mut raised = Vec::new();

        for status in statuses {
            let Some(severity) = budget_severity(status.percent_used()) else {
                continue;
            };
            let period = status.period_key();
            let existing = self.storage.alerts.find(|a| {
                a.is_active()
                    && a.budget_id == Some(status.budget.id)
                    && a.period.as_deref() == Some(period.as_str())
            })?;

            let alert = match existing {
                Some(alert) if alert.severity >= severity => {
                    debug!(budget = %status.budget.category, "budget alert already active");
                    continue;
                }
                Some(mut alert) => {
                    let fresh = budget_alert(&status, severity);
                    alert.severity = fresh.severity;
                    alert.title = fresh.title;
                    alert.message = fresh.message;
                    alert
                }
                None => budget_alert(&status, severity),
            };

            self.storage.alerts.upsert(alert.clone())?;
            raised.push(alert);
        }

        self.storage.alerts.save()?;
        info!(raised = raised.len(), "checked budgets");
        Ok(raised)
    }
}

fn budget_severity(percent_used: f64) -> Option<Severity> {
    if percent_used >= CRITICAL_THRESHOLD {
        Some(Severity::Critical)
    } else if percent_used >= WARNING_THRESHOLD {
        Some(Severity::Warning)
    } else {
        None
    }
}

fn budget_alert(status: &BudgetStatus, severity: Severity) -> Alert {
    let budget = &status.budget;
    let title = match severity {
        Severity::Critical => format!("{} budget exceeded", budget.category),
        _ => format!("{} budget nearly used", budget.category),
    };
    let message = format!(
        "Spent {} of {} ({:.0}%) for {}",
        status.spent.format_with_code(&budget.currency),
        budget.amount.format_with_code(&budget.currency),
        status.percent_used(),
        status.period
    );
    Alert::new(AlertKind::BudgetWarning, severity, title, message)
        .with_category(budget.category.clone())
        .for_budget(budget.id, status.period_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendwisePaths;
    use crate::models::{BudgetPeriod, Categorization, Money, Transaction};
    use crate::services::budget::CreateBudgetInput;
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

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn setup_budget(storage: &Storage, cents: i64) {
        BudgetService::new(storage, &Settings::default())
            .create(CreateBudgetInput {
                category: "Food & Dining".into(),
                amount: Money::from_cents(cents),
                currency: "USD".into(),
                period: BudgetPeriod::Monthly,
                start_date: date(1),
            })
            .unwrap();
    }

    fn spend(storage: &Storage, day: u32, cents: i64) {
        let mut txn = Transaction::new(date(day), "Dinner", Money::from_cents(cents), "USD");
        txn.set_category("Food & Dining", Categorization::manual());
        storage.transactions.upsert(txn).unwrap();
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(budget_severity(79.9), None);
        assert_eq!(budget_severity(80.0), Some(Severity::Warning));
        assert_eq!(budget_severity(100.0), Some(Severity::Critical));
        assert_eq!(budget_severity(140.0), Some(Severity::Critical));
    }

    #[test]
    fn test_check_budgets_does_not_repeat() {
        let (_dir, storage) = create_test_storage();
        setup_budget(&storage, 10000);
        spend(&storage, 3, -8500);
        let service = AlertService::new(&storage);
        let settings = Settings::default();

        let raised = service.check_budgets(&settings, date(10)).unwrap();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].severity, Severity::Warning);
        assert_eq!(raised[0].kind, AlertKind::BudgetWarning);

        assert!(service.check_budgets(&settings, date(11)).unwrap().is_empty());
        assert_eq!(service.list(false).unwrap().len(), 1);
    }

    #[test]
    fn test_warning_escalates_in_place() {
        let (_dir, storage) = create_test_storage();
        setup_budget(&storage, 10000);
        spend(&storage, 3, -8500);
        let service = AlertService::new(&storage);
        let settings = Settings::default();

        let first = service.check_budgets(&settings, date(10)).unwrap();
        spend(&storage, 12, -2000);
        let second = service.check_budgets(&settings, date(12)).unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].severity, Severity::Critical);
        assert_eq!(service.list(false).unwrap().len(), 1);
    }

    #[test]
    fn test_dismissed_alert_raised_again_next_period() {
        let (_dir, storage) = create_test_storage();
        setup_budget(&storage, 10000);
        spend(&storage, 3, -12000);
        let service = AlertService::new(&storage);
        let settings = Settings::default();

        let raised = service.check_budgets(&settings, date(10)).unwrap();
        service.dismiss(raised[0].id).unwrap();
        assert!(service.list(false).unwrap().is_empty());

        // Dismissed alerts no longer block a new one
        let again = service.check_budgets(&settings, date(20)).unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(service.purge_dismissed().unwrap(), 1);
        assert_eq!(service.dismiss_all().unwrap(), 1);
    }
}
