//! Column detection
//!
//! Maps the header names real bank exports use onto the columns an import
//! needs: date, description, amount (or separate debit and credit columns),
//! currency and notes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which CSV headers hold which transaction fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: Option<String>,
    pub description: Option<String>,
    /// Single signed amount column
    pub amount: Option<String>,
    /// Money-out column, used when there is no signed amount column
    pub debit: Option<String>,
    /// Money-in column, used when there is no signed amount column
    pub credit: Option<String>,
    pub currency: Option<String>,
    pub notes: Option<String>,
    /// Date format tried before the built-in list
    #[serde(default)]
    pub date_format: Option<String>,
    /// Flip signs (card exports that list purchases as positive)
    #[serde(default)]
    pub invert_amounts: bool,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn with_inverted_amounts(mut self, invert: bool) -> Self {
        self.invert_amounts = invert;
        self
    }

    pub fn uses_debit_credit(&self) -> bool {
        self.amount.is_none() && (self.debit.is_some() || self.credit.is_some())
    }

    /// Columns that are required but could not be mapped
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.amount.is_none() && self.debit.is_none() && self.credit.is_none() {
            missing.push("amount");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

impl fmt::Display for ColumnMapping {
    /// `date=Posted, description=Memo, debit=Out, credit=In`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("date", &self.date),
            ("description", &self.description),
            ("amount", &self.amount),
            ("debit", &self.debit),
            ("credit", &self.credit),
            ("currency", &self.currency),
            ("notes", &self.notes),
        ];
        let mapped: Vec<String> = fields
            .iter()
            .filter_map(|(field, column)| column.as_ref().map(|c| format!("{}={}", field, c)))
            .collect();
        write!(f, "{}", mapped.join(", "))?;
        if self.invert_amounts {
            write!(f, " (amounts inverted)")?;
        }
        Ok(())
    }
}

const AMOUNT_HEADERS: &[&str] = &[
    "amount",
    "transaction amount",
    "debit/credit",
    "credit/debit",
    "amount (usd)",
    "value",
    "sum",
];
const DEBIT_HEADERS: &[&str] = &[
    "debit",
    "debits",
    "debit amount",
    "withdrawal",
    "withdrawals",
    "withdrawal amount",
    "outflow",
    "money out",
    "paid out",
];
const CREDIT_HEADERS: &[&str] = &[
    "credit",
    "credits",
    "credit amount",
    "deposit",
    "deposits",
    "deposit amount",
    "inflow",
    "money in",
    "paid in",
];
const DATE_HEADERS: &[&str] = &[
    "date",
    "transaction date",
    "trans date",
    "trans. date",
    "posted date",
    "posting date",
    "post date",
    "booking date",
    "value date",
];
const CURRENCY_HEADERS: &[&str] = &["currency", "ccy", "currency code", "curr"];
/// Best first; payee-like columns stand in when there is no description
const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "transaction description",
    "details",
    "narrative",
    "payee",
    "merchant",
    "merchant name",
    "name",
    "memo",
];
const NOTES_HEADERS: &[&str] = &["memo", "notes", "note", "reference"];

/// Lowercase, unify separators and collapse whitespace
fn normalize_header(header: &str) -> String {
    let lowered = header.trim().to_lowercase().replace(['_', '-'], " ");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" / ", "/").replace("/ ", "/").replace(" /", "/")
}

struct Detector<'a> {
    headers: &'a [String],
    normalized: Vec<String>,
    claimed: Vec<bool>,
}

impl<'a> Detector<'a> {
    fn new(headers: &'a [String]) -> Self {
        Self {
            headers,
            normalized: headers.iter().map(|h| normalize_header(h)).collect(),
            claimed: vec![false; headers.len()],
        }
    }

    /// Claim the unclaimed header that appears earliest in `names`
    fn exact(&mut self, names: &[&str]) -> Option<String> {
        let best = self
            .normalized
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.claimed[*i])
            .filter_map(|(i, h)| names.iter().position(|n| *n == h.as_str()).map(|rank| (rank, i)))
            .min()?;
        Some(self.claim(best.1))
    }

    /// Claim the first unclaimed header containing any of `needles`
    fn containing(&mut self, needles: &[&str]) -> Option<String> {
        let index = self
            .normalized
            .iter()
            .enumerate()
            .position(|(i, h)| !self.claimed[i] && needles.iter().any(|n| h.contains(*n)))?;
        Some(self.claim(index))
    }

    fn claim(&mut self, index: usize) -> String {
        self.claimed[index] = true;
        self.headers[index].clone()
    }
}

/// Detect which headers hold which fields
///
/// Unrecognised headers are left unmapped; check [`ColumnMapping::missing`]
/// before importing.
pub fn detect_columns(headers: &[String]) -> ColumnMapping {
    let mut d = Detector::new(headers);
    let mut mapping = ColumnMapping::new();

    mapping.amount = d.exact(AMOUNT_HEADERS);
    mapping.debit = d
        .exact(DEBIT_HEADERS)
        .or_else(|| d.containing(&["debit", "withdrawal"]));
    mapping.credit = d
        .exact(CREDIT_HEADERS)
        .or_else(|| d.containing(&["credit", "deposit"]));
    if mapping.amount.is_none() {
        mapping.amount = d.containing(&["amount"]);
    }
    if mapping.debit.is_some() && mapping.credit.is_some() && mapping.amount.is_some() {
        // Separate columns carry the sign; a generic amount column alongside
        // them is usually unsigned
        mapping.amount = None;
    }

    mapping.date = d.exact(DATE_HEADERS).or_else(|| d.containing(&["date"]));
    mapping.currency = d.exact(CURRENCY_HEADERS);
    mapping.description = d
        .exact(DESCRIPTION_HEADERS)
        .or_else(|| d.containing(&["description", "payee", "merchant"]));
    mapping.notes = d.exact(NOTES_HEADERS);

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_headers() {
        let m = detect_columns(&headers(&["Date", "Description", "Amount"]));
        assert_eq!(m.date.as_deref(), Some("Date"));
        assert_eq!(m.description.as_deref(), Some("Description"));
        assert_eq!(m.amount.as_deref(), Some("Amount"));
        assert!(m.is_complete());
        assert!(!m.uses_debit_credit());
    }

    #[test]
    fn test_transaction_and_posted_dates() {
        let m = detect_columns(&headers(&["Posted Date", "Transaction Date", "Payee", "Debit/Credit"]));
        assert_eq!(m.date.as_deref(), Some("Transaction Date"));
        assert_eq!(m.amount.as_deref(), Some("Debit/Credit"));
        assert_eq!(m.description.as_deref(), Some("Payee"));
        assert!(m.debit.is_none());
    }

    #[test]
    fn test_separate_debit_credit() {
        let m = detect_columns(&headers(&["Date", "Description", "Debit", "Credit", "Balance"]));
        assert!(m.amount.is_none());
        assert_eq!(m.debit.as_deref(), Some("Debit"));
        assert_eq!(m.credit.as_deref(), Some("Credit"));
        assert!(m.uses_debit_credit());
        assert!(m.is_complete());
    }

    #[test]
    fn test_debit_amount_credit_amount() {
        let m = detect_columns(&headers(&[
            "Booking_Date",
            "Merchant",
            "Debit Amount",
            "Credit Amount",
            "CCY",
        ]));
        assert_eq!(m.date.as_deref(), Some("Booking_Date"));
        assert_eq!(m.debit.as_deref(), Some("Debit Amount"));
        assert_eq!(m.credit.as_deref(), Some("Credit Amount"));
        assert!(m.amount.is_none());
        assert_eq!(m.currency.as_deref(), Some("CCY"));
        assert_eq!(m.description.as_deref(), Some("Merchant"));
    }

    #[test]
    fn test_memo_is_description_fallback_or_notes() {
        let fallback = detect_columns(&headers(&["Date", "Memo", "Amount"]));
        assert_eq!(fallback.description.as_deref(), Some("Memo"));
        assert!(fallback.notes.is_none());

        let both = detect_columns(&headers(&["Date", "Description", "Memo", "Amount", "Currency"]));
        assert_eq!(both.description.as_deref(), Some("Description"));
        assert_eq!(both.notes.as_deref(), Some("Memo"));
        assert_eq!(both.currency.as_deref(), Some("Currency"));
    }

    #[test]
    fn test_missing_columns_reported() {
        let m = detect_columns(&headers(&["Foo", "Bar"]));
        assert_eq!(m.missing(), vec!["date", "description", "amount"]);
        assert!(!m.is_complete());
    }

    #[test]
    fn test_mapping_display() {
        let mapping = ColumnMapping {
            date: Some("Posted".into()),
            description: Some("Memo".into()),
            debit: Some("Out".into()),
            credit: Some("In".into()),
            ..ColumnMapping::default()
        };
        assert_eq!(
            mapping.to_string(),
            "date=Posted, description=Memo, debit=Out, credit=In"
        );
    }
}
