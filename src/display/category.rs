//! Category display formatting
//!
//! Formats categories and groups for terminal output in tree and table views.

use crate::models::CategoryGroup;
use crate::services::category::CategoryGroupWithCategories;

/// Format categories as a tree grouped by category group
pub fn format_category_tree(groups_with_categories: &[CategoryGroupWithCategories]) -> String {
    if groups_with_categories.is_empty() {
        return "No categories found.\n\nRun 'spendwise init' to create default categories."
            .to_string();
    }

    let mut output = String::new();

    for (i, gwc) in groups_with_categories.iter().enumerate() {
        output.push_str(&format!("{}\n", gwc.group.name));

        if gwc.categories.is_empty() {
            output.push_str("  (no categories)\n");
        } else {
            for (j, category) in gwc.categories.iter().enumerate() {
                let is_last = j == gwc.categories.len() - 1;
                let prefix = if is_last { "└── " } else { "├── " };

                let hidden = if category.hidden { ", hidden" } else { "" };
                let tags = format!(" ({}{})", category.bucket, hidden);

                output.push_str(&format!("  {}{}{}\n", prefix, category.name, tags));
            }
        }

        if i < groups_with_categories.len() - 1 {
            output.push('\n');
        }
    }

    output
}

/// Format a simple list of groups
pub fn format_group_list(groups: &[CategoryGroup]) -> String {
    if groups.is_empty() {
        return "No category groups found.".to_string();
    }

    let mut output = String::from("Category Groups:\n");
    for group in groups {
        output.push_str(&format!("  {} - order: {}\n", group.name, group.sort_order));
    }
    output
}
