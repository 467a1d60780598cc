//! CSV import service
//!
//! Previews a bank export against stored transactions and imports the new
//! rows, categorizing each as it goes. A row is a re-import when a stored
//! transaction carries its fingerprint; identical rows inside one file are
//! imported as separate transactions unless `skip_repeats` is set, so the
//! duplicate scan can report them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{info, warn};

use crate::categorize::{extract_merchant_pattern, Categorizer};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::import::{detect_columns, normalize_row, read_csv, ColumnMapping, ParsedTransaction};
use crate::models::{AccountId, MerchantProfile, Transaction, TransactionId};
use crate::storage::Storage;

/// Status of one row in an import preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    /// Will be imported
    New,
    /// Already stored; carries the existing transaction's id
    Duplicate(TransactionId),
    /// Repeats an earlier row of the same file; carries that row's line.
    /// Only produced when `skip_repeats` is set.
    DuplicateInFile(usize),
    /// Could not be parsed
    Error(String),
}

impl ImportStatus {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_) | Self::DuplicateInFile(_))
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Duplicate(id) => write!(f, "duplicate of {}", id),
            Self::DuplicateInFile(line) => write!(f, "repeats line {}", line),
            Self::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// One row of an import preview
#[derive(Debug, Clone)]
pub struct ImportPreviewEntry {
    /// Source line number
    pub line: usize,
    /// The normalized row, absent when it could not be parsed
    pub transaction: Option<ParsedTransaction>,
    pub status: ImportStatus,
}

/// Preview of a whole file
#[derive(Debug, Clone)]
pub struct ImportPreview {
    pub mapping: ColumnMapping,
    pub entries: Vec<ImportPreviewEntry>,
}

impl ImportPreview {
    pub fn new_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_new()).count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_duplicate()).count()
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, ImportStatus::Error(_)))
            .count()
    }
}

/// Result of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
    /// Imported transactions that received a category
    pub categorized: usize,
    pub imported_ids: Vec<TransactionId>,
    /// Error message per source line
    pub error_messages: BTreeMap<usize, String>,
}

/// Options for an import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Account the rows belong to
    pub account_id: Option<AccountId>,
    /// Currency for rows without a currency column
    pub default_currency: String,
    /// Overrides header detection
    pub mapping: Option<ColumnMapping>,
    /// Skip rows identical to an earlier row of the same file
    pub skip_repeats: bool,
}

impl ImportOptions {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            account_id: None,
            default_currency: default_currency.into(),
            mapping: None,
            skip_repeats: false,
        }
    }

    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn with_skip_repeats(mut self, skip_repeats: bool) -> Self {
        self.skip_repeats = skip_repeats;
        self
    }
}

/// Service for CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
    categorizer: Option<Categorizer>,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            categorizer: None,
        }
    }

    /// Categorize imported rows with `categorizer`
    pub fn with_categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizer = Some(categorizer);
        self
    }

    /// Parse a file and classify every row
    ///
    /// Fails only when the file cannot be read or its columns cannot be
    /// mapped; bad rows become `Error` entries.
    pub fn preview(&self, content: &str, options: &ImportOptions) -> SpendwiseResult<ImportPreview> {
        let table = read_csv(content)?;
        let mapping = match &options.mapping {
            Some(mapping) => mapping.clone(),
            None => detect_columns(&table.headers),
        };
        if !table.headers.is_empty() && !mapping.is_complete() {
            return Err(SpendwiseError::Import(format!(
                "Could not find column(s) {} in headers: {}",
                mapping.missing().join(", "),
                table.headers.join(", ")
            )));
        }

        // Stored transactions per fingerprint, oldest first; each stored
        // occurrence absorbs one matching row of the file
        let mut stored = self.storage.transactions.get_all()?;
        stored.sort_by_key(|t| (t.date, t.created_at));
        let mut existing: HashMap<String, Vec<TransactionId>> = HashMap::new();
        for txn in stored {
            if let Some(import_id) = txn.import_id {
                existing.entry(import_id).or_default().push(txn.id);
            }
        }
        let mut seen_in_file: HashMap<String, (usize, usize)> = HashMap::new();

        let entries = table
            .rows
            .iter()
            .map(|row| match normalize_row(row, &mapping, &options.default_currency) {
                Ok(parsed) => {
                    let (first_line, occurrence) = seen_in_file
                        .entry(parsed.import_id.clone())
                        .or_insert((row.line, 0));
                    let stored_match = existing
                        .get(&parsed.import_id)
                        .and_then(|ids| ids.get(*occurrence))
                        .copied();
                    let status = match stored_match {
                        Some(id) => ImportStatus::Duplicate(id),
                        None if options.skip_repeats && *occurrence > 0 => {
                            ImportStatus::DuplicateInFile(*first_line)
                        }
                        None => ImportStatus::New,
                    };
                    *occurrence += 1;
                    ImportPreviewEntry {
                        line: row.line,
                        transaction: Some(parsed),
                        status,
                    }
                }
                Err(e) => ImportPreviewEntry {
                    line: row.line,
                    transaction: None,
                    status: ImportStatus::Error(error_text(e)),
                },
            })
            .collect();

        Ok(ImportPreview { mapping, entries })
    }

    /// Import the new rows of a preview
    ///
    /// A failing row is recorded and the rest of the batch continues.
    pub fn import(
        &self,
        preview: &ImportPreview,
        options: &ImportOptions,
    ) -> SpendwiseResult<ImportResult> {
        if let Some(account_id) = options.account_id {
            self.storage
                .accounts
                .get(account_id)?
                .ok_or_else(|| SpendwiseError::account_not_found(account_id.to_string()))?;
        }

        let history = match self.categorizer {
            Some(_) => self.storage.merchants.get_all()?,
            None => Vec::new(),
        };
        let mut result = ImportResult::default();

        for entry in &preview.entries {
            match (&entry.status, &entry.transaction) {
                (ImportStatus::New, Some(parsed)) => {
                    match self.build_transaction(parsed, options.account_id, &history) {
                        Ok(txn) => {
                            if txn.is_categorized() {
                                result.categorized += 1;
                            }
                            result.imported_ids.push(txn.id);
                            self.storage.transactions.upsert(txn)?;
                            result.imported += 1;
                        }
                        Err(e) => {
                            warn!(line = entry.line, error = %e, "skipping row");
                            result.errors += 1;
                            result.error_messages.insert(entry.line, error_text(e));
                        }
                    }
                }
                (ImportStatus::Duplicate(_) | ImportStatus::DuplicateInFile(_), _) => {
                    result.duplicates_skipped += 1;
                }
                (ImportStatus::Error(msg), _) => {
                    result.errors += 1;
                    result.error_messages.insert(entry.line, msg.clone());
                }
                (ImportStatus::New, None) => {
                    result.errors += 1;
                    result
                        .error_messages
                        .insert(entry.line, "row has no parsed transaction".into());
                }
            }
        }

        self.storage.transactions.save()?;
        info!(
            imported = result.imported,
            duplicates = result.duplicates_skipped,
            errors = result.errors,
            categorized = result.categorized,
            "import finished"
        );
        Ok(result)
    }

    /// Preview and import in one step
    pub fn import_csv(&self, content: &str, options: &ImportOptions) -> SpendwiseResult<ImportResult> {
        let preview = self.preview(content, options)?;
        self.import(&preview, options)
    }

    fn build_transaction(
        &self,
        parsed: &ParsedTransaction,
        account_id: Option<AccountId>,
        history: &[MerchantProfile],
    ) -> SpendwiseResult<Transaction> {
        let mut txn = Transaction::new(
            parsed.date,
            parsed.description.clone(),
            parsed.amount,
            parsed.currency.clone(),
        );
        txn.account_id = account_id;
        txn.notes = parsed.notes.clone();
        txn.import_id = Some(parsed.import_id.clone());

        match &self.categorizer {
            Some(categorizer) => {
                let result = categorizer.categorize(&txn.description, history);
                txn.merchant = result.merchant.clone();
                if result.is_categorized() {
                    txn.set_category(result.category.clone(), result.categorization());
                }
            }
            None => txn.merchant = extract_merchant_pattern(&txn.description),
        }

        txn.validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;
        Ok(txn)
    }
}

/// Row-level message without the error-kind prefix
fn error_text(error: SpendwiseError) -> String {
    match error {
        SpendwiseError::Import(msg) | SpendwiseError::Validation(msg) => msg,
        other => other.to_string(),
    }
}
