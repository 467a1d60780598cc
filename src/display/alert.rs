//! Alert display formatting

use tabled::Tabled;

use super::{render_table, truncate};
use crate::models::Alert;

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Raised")]
    raised: String,
}

/// Format alerts, most severe first
pub fn format_alert_list(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return "No alerts.".to_string();
    }

    let mut sorted: Vec<&Alert> = alerts.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.created_at.cmp(&a.created_at))
    });

    let rows = sorted
        .into_iter()
        .map(|alert| AlertRow {
            id: alert.id.short(),
            severity: if alert.dismissed {
                format!("{} (dismissed)", alert.severity)
            } else {
                alert.severity.to_string()
            },
            kind: alert.kind.to_string(),
            title: truncate(&alert.title, 30),
            message: truncate(&alert.message, 60),
            raised: alert.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    render_table(rows)
}
