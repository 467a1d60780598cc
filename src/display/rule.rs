//! Categorization rule display formatting

use tabled::Tabled;

use super::render_table;
use crate::categorize::CategoryMatch;
use crate::models::CategoryRule;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Match")]
    match_kind: String,
    #[tabled(rename = "Pattern")]
    pattern: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "On")]
    enabled: String,
}

/// Format user rules in evaluation order
pub fn format_rule_list(rules: &[CategoryRule]) -> String {
    if rules.is_empty() {
        return "No rules defined.".to_string();
    }

    let rows = rules
        .iter()
        .map(|rule| RuleRow {
            id: rule.id.short(),
            name: rule.name.clone(),
            match_kind: rule.match_kind.to_string(),
            pattern: rule.pattern.clone(),
            category: rule.category.clone(),
            priority: rule.priority,
            enabled: if rule.enabled { "yes" } else { "no" }.to_string(),
        })
        .collect();

    render_table(rows)
}

/// Format the categorizer's answer for one description
pub fn format_suggestion(description: &str, suggestion: &CategoryMatch) -> String {
    let mut output = format!("Description: {}\n", description);
    output.push_str(&format!("Merchant:    {}\n", suggestion.merchant));
    output.push_str(&format!("Category:    {}\n", suggestion.category));
    output.push_str(&format!(
        "Source:      {} ({:.0}% confidence)\n",
        suggestion.source,
        suggestion.confidence * 100.0
    ));
    if let Some(rule) = &suggestion.rule {
        output.push_str(&format!("Rule:        {}\n", rule));
    }
    output
}
