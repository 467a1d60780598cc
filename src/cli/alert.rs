//! Alert CLI commands

use clap::Subcommand;

use super::today;
use crate::config::Settings;
use crate::display::alert::format_alert_list;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::services::AlertService;
use crate::storage::Storage;

/// Alert subcommands
#[derive(Subcommand)]
pub enum AlertCommands {
    /// List active alerts
    List {
        /// Include dismissed alerts
        #[arg(short, long)]
        all: bool,
    },
    /// Check budgets and raise alerts for any near or over their limit
    Check,
    /// Dismiss an alert
    Dismiss {
        /// Alert ID
        id: Option<String>,
        /// Dismiss every active alert
        #[arg(short, long)]
        all: bool,
    },
    /// Delete dismissed alerts
    Purge,
}

/// Handle an alert command
pub fn handle_alert_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AlertCommands,
) -> SpendwiseResult<()> {
    let service = AlertService::new(storage);

    match cmd {
        AlertCommands::List { all } => {
            println!("{}", format_alert_list(&service.list(all)?));
        }

        AlertCommands::Check => {
            let raised = service.check_budgets(settings, today())?;
            if raised.is_empty() {
                println!("All budgets are within their limits.");
            } else {
                println!("{}", format_alert_list(&raised));
            }
        }

        AlertCommands::Dismiss { id, all } => match (id, all) {
            (_, true) => {
                let count = service.dismiss_all()?;
                println!("Dismissed {} alert(s)", count);
            }
            (Some(id), false) => {
                let found = service.require(&id)?;
                let dismissed = service.dismiss(found.id)?;
                println!("Dismissed: {}", dismissed.title);
            }
            (None, false) => {
                return Err(SpendwiseError::Validation(
                    "Give an alert ID or --all".into(),
                ));
            }
        },

        AlertCommands::Purge => {
            let count = service.purge_dismissed()?;
            println!("Removed {} dismissed alert(s)", count);
        }
    }

    Ok(())
}
