//! Display formatting for terminal output
//!
//! List views are rendered as tables; detail views are aligned label/value
//! lines.

pub mod account;
pub mod alert;
pub mod budget;
pub mod category;
pub mod duplicates;
pub mod import;
pub mod rule;
pub mod transaction;

pub use account::{format_account_details, format_account_list};
pub use alert::format_alert_list;
pub use budget::{format_budget_list, format_goal_list};
pub use category::{format_category_tree, format_group_list};
pub use duplicates::format_duplicate_report;
pub use import::{format_import_preview, format_import_result};
pub use rule::{format_rule_list, format_suggestion};
pub use transaction::{format_transaction_details, format_transaction_list};

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows as a table in the house style
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// Truncate to `max` characters, marking the cut with an ellipsis
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
