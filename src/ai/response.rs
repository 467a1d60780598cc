//! Parsing of model replies
//!
//! Models wrap JSON in Markdown fences or add prose around it. The JSON
//! payload is cut out of the reply before deserializing, and every value is
//! checked against what the crate accepts.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{category_names_match, Alert, AlertKind, Severity, UNCATEGORIZED};

/// A category suggested for one transaction of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct AiCategorization {
    /// 1-based position in the batch
    pub index: usize,
    /// An allowed label, or `Uncategorized`
    pub category: String,
    /// Clamped to 0..=1
    pub confidence: f64,
}

impl AiCategorization {
    pub fn is_categorized(&self) -> bool {
        !self.category.eq_ignore_ascii_case(UNCATEGORIZED)
    }
}

/// An insight produced from the knowledge document
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub category: Option<String>,
}

impl Insight {
    pub fn into_alert(self) -> Alert {
        let alert = Alert::new(AlertKind::Insight, self.severity, self.title, self.message);
        match self.category {
            Some(category) => alert.with_category(category),
            None => alert,
        }
    }
}

/// Remove a surrounding Markdown code fence, if present
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    // Skip the info string ("json") up to the end of the fence line
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(after.len());
    let body = &after[body_start..];
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Cut the outermost JSON array or object out of a reply
pub fn extract_json(text: &str) -> Option<&str> {
    let text = strip_code_fences(text);
    let start = text.find(['[', '{'])?;
    let close = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a reply into a JSON array
///
/// An object is accepted when one of its values is an array, as in
/// `{"results": [...]}`.
fn parse_array(text: &str) -> SpendwiseResult<Vec<Value>> {
    let json = extract_json(text)
        .ok_or_else(|| SpendwiseError::Ai("Reply contains no JSON".into()))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SpendwiseError::Ai(format!("Reply is not valid JSON: {}", e)))?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or_else(|| SpendwiseError::Ai("Reply JSON has no array".into())),
        _ => Err(SpendwiseError::Ai("Reply JSON is not an array".into())),
    }
}

fn clamp_confidence(value: Option<f64>) -> f64 {
    match value {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[derive(Deserialize)]
struct RawCategorization {
    index: Option<usize>,
    category: Option<String>,
    confidence: Option<f64>,
}

/// Parse a categorization reply for a batch of `count` transactions
///
/// Entries without an index take their position in the array. Indices out
/// of range are dropped, and the first entry for an index wins. Categories
/// outside `allowed` become `Uncategorized`; allowed ones are returned in
/// their canonical spelling.
pub fn parse_categorizations(
    text: &str,
    count: usize,
    allowed: &[String],
) -> SpendwiseResult<Vec<AiCategorization>> {
    let mut seen = vec![false; count];
    let mut results = Vec::new();

    for (position, item) in parse_array(text)?.into_iter().enumerate() {
        let Ok(raw) = serde_json::from_value::<RawCategorization>(item) else {
            continue;
        };
        let index = raw.index.unwrap_or(position + 1);
        if index == 0 || index > count || seen[index - 1] {
            continue;
        }
        seen[index - 1] = true;

        let category = raw
            .category
            .as_deref()
            .and_then(|c| allowed.iter().find(|a| category_names_match(a, c)))
            .cloned()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let confidence = if category == UNCATEGORIZED {
            0.0
        } else {
            clamp_confidence(raw.confidence)
        };

        results.push(AiCategorization {
            index,
            category,
            confidence,
        });
    }

    results.sort_by_key(|r| r.index);
    Ok(results)
}

#[derive(Deserialize)]
struct RawInsight {
    title: Option<String>,
    message: Option<String>,
    severity: Option<String>,
    category: Option<String>,
}

/// Parse an insights reply; entries without a message are skipped
pub fn parse_insights(text: &str) -> SpendwiseResult<Vec<Insight>> {
    Ok(parse_array(text)?
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawInsight>(item).ok())
        .filter_map(|raw| {
            let message = raw.message?.trim().to_string();
            if message.is_empty() {
                return None;
            }
            Some(Insight {
                title: raw
                    .title
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "Insight".to_string()),
                message,
                severity: Severity::parse_lenient(raw.severity.as_deref().unwrap_or("")),
                category: raw
                    .category
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            })
        })
        .collect())
}
