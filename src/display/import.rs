//! Import preview and result formatting

use tabled::Tabled;

use super::{render_table, truncate};
use crate::services::import::{ImportPreview, ImportResult};

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "Line")]
    line: usize,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format an import preview with the detected column mapping
pub fn format_import_preview(preview: &ImportPreview) -> String {
    let mut output = format!("Columns: {}\n\n", preview.mapping);

    if preview.entries.is_empty() {
        output.push_str("No rows found.\n");
        return output;
    }

    let rows = preview
        .entries
        .iter()
        .map(|entry| match &entry.transaction {
            Some(txn) => PreviewRow {
                line: entry.line,
                date: txn.date.to_string(),
                description: truncate(&txn.description, 32),
                amount: txn.amount.format_with_code(&txn.currency),
                status: entry.status.to_string(),
            },
            None => PreviewRow {
                line: entry.line,
                date: String::new(),
                description: String::new(),
                amount: String::new(),
                status: entry.status.to_string(),
            },
        })
        .collect();

    output.push_str(&render_table(rows));
    output.push_str(&format!(
        "\n{} new, {} duplicate(s), {} error(s)\n",
        preview.new_count(),
        preview.duplicate_count(),
        preview.error_count()
    ));
    output
}

/// Format the outcome of an import
pub fn format_import_result(result: &ImportResult) -> String {
    let mut output = format!(
        "Imported {} transaction(s) ({} categorized); skipped {} duplicate(s)",
        result.imported, result.categorized, result.duplicates_skipped
    );
    if result.errors > 0 {
        output.push_str(&format!("; {} row(s) with errors:", result.errors));
        for (line, message) in &result.error_messages {
            output.push_str(&format!("\n  line {}: {}", line, message));
        }
    }
    output
}
