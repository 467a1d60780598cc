//! Duplicate scan display formatting

use crate::duplicates::DuplicateReport;

/// Format a duplicate scan as numbered groups; the first member of each group
/// is the one kept on resolve
pub fn format_duplicate_report(report: &DuplicateReport) -> String {
    if report.is_empty() {
        return "No duplicate transactions found.".to_string();
    }

    let mut output = String::new();
    for (i, group) in report.groups.iter().enumerate() {
        output.push_str(&format!(
            "Group {} ({} confidence)\n",
            i + 1,
            group.confidence
        ));
        for (j, txn) in group.transactions.iter().enumerate() {
            let marker = if j == 0 { "keep" } else { "dup " };
            output.push_str(&format!(
                "  {} {}  {}  {:>14}  {}\n",
                marker,
                txn.id.short(),
                txn.date,
                txn.amount.format_with_code(&txn.currency),
                txn.description
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "{} duplicate(s) in {} group(s); potential savings {}\n",
        report.total_duplicates,
        report.groups.len(),
        report.potential_savings
    ));
    output
}
