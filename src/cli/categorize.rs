//! Categorization CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::rule::{format_rule_list, format_suggestion};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::RuleMatch;
use crate::services::{CategorizationService, NewRule};
use crate::storage::Storage;

/// Categorize subcommands
#[derive(Subcommand)]
pub enum CategorizeCommands {
    /// Categorize stored transactions with rules and merchant history
    Run {
        /// Re-categorize transactions that already have a category
        /// (manual choices are kept)
        #[arg(short, long)]
        force: bool,
    },
    /// Show how a description would be categorized
    Test {
        /// Description as it would appear on a statement
        description: String,
    },
    /// Always use a category for a merchant
    Pin {
        /// Merchant name or a description containing it
        merchant: String,
        /// Category name; clears the pin when omitted
        category: Option<String>,
    },
    /// Manage user rules
    #[command(subcommand)]
    Rule(RuleCommands),
}

/// Rule subcommands
#[derive(Subcommand)]
pub enum RuleCommands {
    /// Add a rule
    Add {
        /// Rule name
        name: String,
        /// Text or regular expression to look for
        pattern: String,
        /// Category to assign
        category: String,
        /// How the pattern is matched (contains, exact, regex)
        #[arg(short, long, default_value = "contains")]
        match_kind: String,
        /// Higher priority rules are tried first
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        priority: i32,
    },
    /// List rules
    List,
    /// Remove a rule
    Remove {
        /// Rule name or ID
        rule: String,
    },
    /// Enable a rule
    Enable {
        /// Rule name or ID
        rule: String,
    },
    /// Disable a rule
    Disable {
        /// Rule name or ID
        rule: String,
    },
}

/// Handle a categorize command
pub fn handle_categorize_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CategorizeCommands,
) -> SpendwiseResult<()> {
    let service = CategorizationService::new(storage, &settings.categorization);

    match cmd {
        CategorizeCommands::Run { force } => {
            let summary = service.run(force)?;
            println!(
                "Examined {} transaction(s): {} categorized, {} unmatched",
                summary.examined, summary.categorized, summary.unmatched
            );
            for (source, count) in &summary.by_source {
                println!("  {:<10} {}", source, count);
            }
        }

        CategorizeCommands::Test { description } => {
            let suggestion = service.suggest(&description)?;
            print!("{}", format_suggestion(&description, &suggestion));
        }

        CategorizeCommands::Pin { merchant, category } => {
            service.pin_merchant(&merchant, category.as_deref())?;
            match category {
                Some(category) => println!("Pinned '{}' to '{}'", merchant, category),
                None => println!("Cleared pin for '{}'", merchant),
            }
        }

        CategorizeCommands::Rule(cmd) => handle_rule_command(&service, cmd)?,
    }

    Ok(())
}

fn handle_rule_command(service: &CategorizationService, cmd: RuleCommands) -> SpendwiseResult<()> {
    match cmd {
        RuleCommands::Add {
            name,
            pattern,
            category,
            match_kind,
            priority,
        } => {
            let match_kind = RuleMatch::parse(&match_kind).ok_or_else(|| {
                SpendwiseError::Validation(format!(
                    "Invalid match kind: '{}'. Valid kinds: contains, exact, regex",
                    match_kind
                ))
            })?;
            let rule = service.add_rule(NewRule {
                name,
                pattern,
                match_kind,
                category,
                priority,
            })?;
            println!("Added rule: {}", rule);
        }

        RuleCommands::List => {
            println!("{}", format_rule_list(&service.list_rules()?));
        }

        RuleCommands::Remove { rule } => {
            let removed = service.remove_rule(&rule)?;
            println!("Removed rule: {}", removed.name);
        }

        RuleCommands::Enable { rule } => {
            let rule = service.set_rule_enabled(&rule, true)?;
            println!("Enabled rule: {}", rule.name);
        }

        RuleCommands::Disable { rule } => {
            let rule = service.set_rule_enabled(&rule, false)?;
            println!("Disabled rule: {}", rule.name);
        }
    }

    Ok(())
}
