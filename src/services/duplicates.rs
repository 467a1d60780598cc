//! Duplicate scanning over stored transactions

use chrono::NaiveDate;
use tracing::info;

use crate::config::DuplicateSettings;
use crate::duplicates::{DuplicateDetector, DuplicateReport};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::TransactionId;
use crate::storage::Storage;

/// Service for finding and removing duplicate transactions
pub struct DuplicateService<'a> {
    storage: &'a Storage,
    detector: DuplicateDetector,
}

impl<'a> DuplicateService<'a> {
    pub fn new(storage: &'a Storage, settings: &DuplicateSettings) -> Self {
        Self {
            storage,
            detector: DuplicateDetector::new(settings.clone()),
        }
    }

    /// Scan stored transactions, oldest first, optionally within a date range
    pub fn scan(&self, range: Option<(NaiveDate, NaiveDate)>) -> SpendwiseResult<DuplicateReport> {
        let mut transactions = self.storage.transactions.get_chronological()?;
        if let Some((start, end)) = range {
            transactions.retain(|t| t.date >= start && t.date <= end);
        }
        Ok(self.detector.detect(&transactions))
    }

    /// Delete every member but the first of the chosen groups
    ///
    /// `groups` holds 1-based group numbers from the report; empty means
    /// every group.
    pub fn resolve(
        &self,
        report: &DuplicateReport,
        groups: &[usize],
    ) -> SpendwiseResult<Vec<TransactionId>> {
        for &number in groups {
            if number == 0 || number > report.groups.len() {
                return Err(SpendwiseError::Validation(format!(
                    "No duplicate group {} (report has {})",
                    number,
                    report.groups.len()
                )));
            }
        }

        let chosen: Vec<usize> = if groups.is_empty() {
            (0..report.groups.len()).collect()
        } else {
            groups.iter().map(|n| n - 1).collect()
        };

        let mut deleted = Vec::new();
        for index in chosen {
            for extra in report.groups[index].extras() {
                if self.storage.transactions.delete(extra.id)? {
                    deleted.push(extra.id);
                }
            }
        }

        self.storage.transactions.save()?;
        info!(deleted = deleted.len(), "resolved duplicates");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendwisePaths;
    use crate::models::{Money, Transaction};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add(storage: &Storage, day: u32, description: &str, cents: i64) -> TransactionId {
        let txn = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            description,
            Money::from_cents(cents),
            "USD",
        );
        let id = txn.id;
        storage.transactions.upsert(txn).unwrap();
        id
    }

    #[test]
    fn test_scan_and_resolve_keeps_oldest() {
        let (_dir, storage) = create_test_storage();
        let first = add(&storage, 2, "Spotify", -999);
        let second = add(&storage, 2, "SPOTIFY", -999);
        add(&storage, 8, "Rent", -120000);
        let service = DuplicateService::new(&storage, &DuplicateSettings::default());

        let report = service.scan(None).unwrap();
        assert_eq!(report.groups.len(), 1);

        let deleted = service.resolve(&report, &[]).unwrap();
        assert_eq!(deleted.len(), 1);
        let remaining: Vec<_> = storage
            .transactions
            .get_all()
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&first) ^ remaining.contains(&second));
        assert!(service.scan(None).unwrap().is_empty());
    }

    #[test]
    fn test_scan_with_range() {
        let (_dir, storage) = create_test_storage();
        add(&storage, 2, "Spotify", -999);
        add(&storage, 2, "Spotify", -999);
        let service = DuplicateService::new(&storage, &DuplicateSettings::default());

        let start = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        assert!(service.scan(Some((start, end))).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_rejects_unknown_group() {
        let (_dir, storage) = create_test_storage();
        add(&storage, 2, "Spotify", -999);
        add(&storage, 2, "Spotify", -999);
        let service = DuplicateService::new(&storage, &DuplicateSettings::default());
        let report = service.scan(None).unwrap();

        assert!(service.resolve(&report, &[2]).unwrap_err().is_validation());
        assert!(service.resolve(&report, &[0]).unwrap_err().is_validation());
        assert_eq!(service.resolve(&report, &[1]).unwrap().len(), 1);
    }
}
