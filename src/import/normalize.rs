//! Row normalization
//!
//! Turns a raw CSV row into a dated, signed amount with a description and
//! currency, using a [`ColumnMapping`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::SpendwiseError;
use crate::models::{Money, Transaction};

use super::columns::ColumnMapping;
use super::parser::CsvRow;

/// Date formats tried in order. Month-first wins over day-first when a date
/// is ambiguous.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d/%m/%Y",
    "%d/%m/%y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%d %b %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// A CSV row after normalization, ready to become a transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
    /// Source line number
    pub row_number: usize,
    pub date: NaiveDate,
    pub description: String,
    /// Signed amount (negative for money out)
    pub amount: Money,
    pub currency: String,
    pub notes: String,
    /// Fingerprint for re-import detection
    pub import_id: String,
}

/// Parse a date in any of the supported formats
///
/// `preferred` is tried first when given. Timestamps keep only their date.
pub fn parse_date(value: &str, preferred: Option<&str>) -> Result<NaiveDate, SpendwiseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SpendwiseError::Import("missing date".into()));
    }

    if let Some(format) = preferred {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| SpendwiseError::Import(format!("unrecognised date '{}'", value)))
}

fn parse_amount(value: &str) -> Result<Money, SpendwiseError> {
    Money::parse(value)
        .map_err(|e| SpendwiseError::Import(format!("invalid amount '{}': {}", value, e)))
}

fn signed_amount(row: &CsvRow, mapping: &ColumnMapping) -> Result<Money, SpendwiseError> {
    if let Some(column) = &mapping.amount {
        let raw = row
            .value(column)
            .ok_or_else(|| SpendwiseError::Import(format!("missing amount in '{}'", column)))?;
        return parse_amount(raw);
    }

    let debit = match mapping.debit.as_deref().and_then(|c| row.value(c)) {
        Some(raw) => Some(parse_amount(raw)?.abs()),
        None => None,
    };
    let credit = match mapping.credit.as_deref().and_then(|c| row.value(c)) {
        Some(raw) => Some(parse_amount(raw)?.abs()),
        None => None,
    };

    match (debit, credit) {
        (None, None) => Err(SpendwiseError::Import(
            "missing amount: debit and credit are both empty".into(),
        )),
        (debit, credit) => Ok(credit.unwrap_or_default() - debit.unwrap_or_default()),
    }
}

fn normalize_currency(raw: &str) -> Result<String, SpendwiseError> {
    let code = raw.trim().to_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(SpendwiseError::Import(format!("invalid currency '{}'", raw)))
    }
}

/// Normalize one CSV row
///
/// The currency column wins over `default_currency` when present and
/// non-empty.
pub fn normalize_row(
    row: &CsvRow,
    mapping: &ColumnMapping,
    default_currency: &str,
) -> Result<ParsedTransaction, SpendwiseError> {
    let date_column = mapping
        .date
        .as_deref()
        .ok_or_else(|| SpendwiseError::Import("no date column".into()))?;
    let date = parse_date(row.get(date_column).unwrap_or(""), mapping.date_format.as_deref())?;

    let description = mapping
        .description
        .as_deref()
        .and_then(|c| row.value(c))
        .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
        .ok_or_else(|| SpendwiseError::Import("missing description".into()))?;

    let mut amount = signed_amount(row, mapping)?;
    if mapping.invert_amounts {
        amount = -amount;
    }

    let currency = match mapping.currency.as_deref().and_then(|c| row.value(c)) {
        Some(raw) => normalize_currency(raw)?,
        None => normalize_currency(default_currency)?,
    };

    let notes = mapping
        .notes
        .as_deref()
        .and_then(|c| row.value(c))
        .unwrap_or("")
        .to_string();

    let import_id = Transaction::fingerprint(date, amount, &currency, &description);

    Ok(ParsedTransaction {
        row_number: row.line,
        date,
        description,
        amount,
        currency,
        notes,
        import_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{detect_columns, read_csv};

    fn first(content: &str) -> Result<ParsedTransaction, SpendwiseError> {
        let table = read_csv(content).unwrap();
        let mapping = detect_columns(&table.headers);
        normalize_row(&table.rows[0], &mapping, "USD")
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_signed_amount_row() {
        let txn = first("Date,Description,Amount\n2025-01-15,  Test   Store ,-50.00\n").unwrap();
        assert_eq!(txn.date, ymd(2025, 1, 15));
        assert_eq!(txn.description, "Test Store");
        assert_eq!(txn.amount.cents(), -5000);
        assert_eq!(txn.currency, "USD");
        assert_eq!(txn.row_number, 2);
        assert!(txn.import_id.starts_with("imp-"));
    }

    #[test]
    fn test_debit_credit_combination() {
        let debit = first("Date,Description,Debit,Credit\n01/15/2025,Groceries,50.00,\n").unwrap();
        assert_eq!(debit.amount.cents(), -5000);
        assert_eq!(debit.date, ymd(2025, 1, 15));

        let credit = first("Date,Description,Debit,Credit\n2025-01-16,Paycheck,,\"1,000.00\"\n").unwrap();
        assert_eq!(credit.amount.cents(), 100_000);

        let neither = first("Date,Description,Debit,Credit\n2025-01-16,Nothing,,\n");
        assert!(matches!(neither, Err(SpendwiseError::Import(_))));
    }

    #[test]
    fn test_accounting_and_symbol_amounts() {
        assert_eq!(
            first("Date,Description,Amount\n2025-01-15,Refund,(50.00)\n").unwrap().amount.cents(),
            -5000
        );
        assert_eq!(
            first("Date,Description,Amount\n2025-01-15,Big,\"$1,234.56\"\n").unwrap().amount.cents(),
            123_456
        );
    }

    #[test]
    fn test_currency_column_and_invert() {
        let table = read_csv("Date,Description,Amount,Currency\n2025-01-15,Hotel,120.00,eur\n").unwrap();
        let mapping = detect_columns(&table.headers).with_inverted_amounts(true);
        let txn = normalize_row(&table.rows[0], &mapping, "USD").unwrap();
        assert_eq!(txn.currency, "EUR");
        assert_eq!(txn.amount.cents(), -12_000);
    }

    #[test]
    fn test_row_errors() {
        assert!(first("Date,Description,Amount\nnot-a-date,Coffee,1.00\n").is_err());
        assert!(first("Date,Description,Amount\n2025-01-01,,1.00\n").is_err());
        assert!(first("Date,Description,Amount\n2025-01-01,Coffee,abc\n").is_err());
        assert!(first("Date,Description,Amount,Currency\n2025-01-01,Coffee,1.00,DOLLARS\n").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2025-01-15", None).unwrap(), ymd(2025, 1, 15));
        assert_eq!(parse_date("01/15/2025", None).unwrap(), ymd(2025, 1, 15));
        assert_eq!(parse_date("15/01/2025", None).unwrap(), ymd(2025, 1, 15));
        assert_eq!(parse_date("15.01.2025", None).unwrap(), ymd(2025, 1, 15));
        assert_eq!(parse_date("2025-01-15T08:30:00", None).unwrap(), ymd(2025, 1, 15));
        assert_eq!(parse_date("15 Jan 2025", None).unwrap(), ymd(2025, 1, 15));
        assert_eq!(parse_date("02/03/2025", Some("%d/%m/%Y")).unwrap(), ymd(2025, 3, 2));
        assert_eq!(parse_date("02/03/2025", None).unwrap(), ymd(2025, 2, 3));
        assert!(parse_date("", None).is_err());
    }

    #[test]
    fn test_same_row_same_fingerprint() {
        let a = first("Date,Description,Amount\n2025-01-15,Coffee,-4.50\n").unwrap();
        let b = first("Posted Date,Payee,Amount\n01/15/2025,COFFEE,-4.50\n").unwrap();
        assert_eq!(a.import_id, b.import_id);
    }
}
