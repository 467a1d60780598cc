//! Prompt formatting
//!
//! Every prompt asks for JSON only; the response parser still tolerates
//! fences and prose around it.

use std::fmt::Write;

use super::client::{ChatMessage, ChatRequest};
use crate::knowledge::KnowledgeDocument;
use crate::models::{Transaction, UNCATEGORIZED};

const CATEGORIZE_SYSTEM: &str = "You categorize personal bank transactions. \
Choose exactly one category for each transaction from the allowed list. \
If none fits, use \"Uncategorized\". \
Reply with a JSON array only, one object per transaction: \
[{\"index\": 1, \"category\": \"Groceries\", \"confidence\": 0.9}]";

const INSIGHTS_SYSTEM: &str = "You are a careful personal finance analyst. \
Using only the figures in the provided summary, point out at most five \
noteworthy patterns, risks or opportunities. \
Reply with a JSON array only: \
[{\"title\": \"...\", \"message\": \"...\", \"severity\": \"info|warning|critical\", \"category\": \"optional category\"}]";

const CHAT_SYSTEM: &str = "You are a helpful personal finance assistant. \
Answer using the user's financial summary below. \
Say so when the summary does not contain the answer. Amounts are in the base currency.";

/// Prompt asking for a category for each transaction
///
/// Transactions are numbered from 1 in slice order.
pub fn categorization_prompt(transactions: &[Transaction], categories: &[String]) -> ChatRequest {
    let mut user = String::from("Allowed categories:\n");
    for category in categories {
        let _ = writeln!(user, "- {}", category);
    }
    if !categories.iter().any(|c| c.eq_ignore_ascii_case(UNCATEGORIZED)) {
        let _ = writeln!(user, "- {}", UNCATEGORIZED);
    }

    user.push_str("\nTransactions:\n");
    for (i, txn) in transactions.iter().enumerate() {
        let _ = writeln!(
            user,
            "{}. {} | {} | {}",
            i + 1,
            txn.date,
            txn.amount.format_with_code(&txn.currency),
            txn.description
        );
    }

    ChatRequest::new(vec![
        ChatMessage::system(CATEGORIZE_SYSTEM),
        ChatMessage::user(user),
    ])
    .with_temperature(0.0)
}

/// Prompt asking for insights grounded on the knowledge document
pub fn insights_prompt(document_json: &str) -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system(INSIGHTS_SYSTEM),
        ChatMessage::user(format!("Financial summary:\n{}", document_json)),
    ])
}

/// Chat prompt with the knowledge document as system context
pub fn chat_prompt(
    document: &KnowledgeDocument,
    document_json: &str,
    history: &[ChatMessage],
    question: &str,
) -> ChatRequest {
    let system = format!(
        "{}\n\nSummary ({} to {}, {}):\n{}",
        CHAT_SYSTEM,
        document.window_start,
        document.window_end,
        document.base_currency,
        document_json
    );
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(question.trim()));
    ChatRequest::new(messages).with_temperature(0.4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::Role;
    use crate::models::Money;
    use chrono::NaiveDate;

    #[test]
    fn test_categorization_prompt_numbers_lines() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let transactions = vec![
            Transaction::new(date, "STARBUCKS #1234", Money::from_cents(-575), "USD"),
            Transaction::new(date, "SHELL OIL", Money::from_cents(-4000), "USD"),
        ];
        let request = categorization_prompt(
            &transactions,
            &["Food & Dining".to_string(), "Fuel".to_string()],
        );

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        let user = &request.messages[1].content;
        assert!(user.contains("- Food & Dining\n- Fuel\n- Uncategorized\n"));
        assert!(user.contains("1. 2025-03-04 | -5.75 USD | STARBUCKS #1234"));
        assert!(user.contains("2. 2025-03-04 | -40.00 USD | SHELL OIL"));
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn test_chat_prompt_keeps_history_order() {
        let json = "{}";
        let document: KnowledgeDocument = serde_json::from_value(serde_json::json!({
            "schema_version": 1,
            "generated_on": "2025-03-31",
            "base_currency": "USD",
            "window_start": "2025-01-01",
            "window_end": "2025-03-31",
            "totals": {"income": 0.0, "spending": 0.0, "net": 0.0,
                       "transaction_count": 0, "uncategorized_count": 0},
            "top_categories": [], "top_merchants": [], "monthly_trend": [],
            "budgets": [], "goals": [],
            "net_worth": {"assets": 0.0, "liabilities": 0.0, "net": 0.0}
        }))
        .unwrap();
        let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];

        let request = chat_prompt(&document, json, &history, "  How much did I spend? ");
        assert_eq!(request.messages.len(), 4);
        assert!(request.messages[0].content.contains("2025-01-01 to 2025-03-31"));
        assert_eq!(request.messages[2].content, "hello");
        assert_eq!(request.messages[3].content, "How much did I spend?");
    }
}
