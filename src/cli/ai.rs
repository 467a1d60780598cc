//! AI CLI commands
//!
//! Categorization, insights and chat against an OpenAI-compatible
//! provider. The knowledge document can be inspected without a provider.

use std::io::{self, BufRead, Write};

use clap::Subcommand;

use super::today;
use crate::ai::{ChatMessage, HttpLlmClient};
use crate::config::Settings;
use crate::display::alert::format_alert_list;
use crate::error::SpendwiseResult;
use crate::knowledge::KnowledgeDocument;
use crate::services::AiService;
use crate::storage::Storage;

/// AI subcommands
#[derive(Subcommand)]
pub enum AiCommands {
    /// Ask the model to categorize uncategorized transactions
    Categorize {
        /// Only send this many transactions
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Generate insights from recent activity and store them as alerts
    Insights,
    /// Ask a question about your finances; without one, start a conversation
    Chat {
        question: Option<String>,
    },
    /// Show the knowledge document sent as context
    Knowledge {
        /// Recompile it from current data
        #[arg(short, long)]
        refresh: bool,
        /// Print the raw JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle an AI command
pub fn handle_ai_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AiCommands,
) -> SpendwiseResult<()> {
    match cmd {
        AiCommands::Knowledge { refresh, json } => {
            show_knowledge(storage, settings, refresh, json)?;
        }

        AiCommands::Categorize { limit } => {
            let client = HttpLlmClient::from_settings(&settings.ai)?;
            let service = AiService::new(storage, settings, &client);
            let summary = service.categorize_uncategorized(limit)?;
            if summary.examined == 0 {
                println!("Nothing to categorize.");
                return Ok(());
            }
            println!(
                "Categorized {} of {} transaction(s); {} left uncategorized",
                summary.categorized, summary.examined, summary.left_uncategorized
            );
            for error in &summary.errors {
                eprintln!("  failed {}", error);
            }
        }

        AiCommands::Insights => {
            let client = HttpLlmClient::from_settings(&settings.ai)?;
            let service = AiService::new(storage, settings, &client);
            let alerts = service.generate_insights(today())?;
            println!("{}", format_alert_list(&alerts));
        }

        AiCommands::Chat { question } => {
            let client = HttpLlmClient::from_settings(&settings.ai)?;
            let service = AiService::new(storage, settings, &client);
            if let Some(question) = question {
                ask(&service, &question, &[])?;
                return Ok(());
            }

            println!("Ask about your finances. An empty line ends the conversation.");
            let mut history: Vec<ChatMessage> = Vec::new();
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
                    break;
                }
                let question = line.trim().to_string();
                let reply = ask(&service, &question, &history)?;
                history.push(ChatMessage::user(question));
                history.push(ChatMessage::assistant(reply));
            }
        }
    }

    Ok(())
}

fn ask(service: &AiService, question: &str, history: &[ChatMessage]) -> SpendwiseResult<String> {
    let mut stdout = io::stdout();
    let mut write_error: Option<io::Error> = None;
    let reply = service.chat(question, history, today(), &mut |delta| {
        if write_error.is_none() {
            if let Err(e) = stdout.write_all(delta.as_bytes()).and_then(|_| stdout.flush()) {
                write_error = Some(e);
            }
        }
    })?;
    println!();
    match write_error {
        Some(e) => Err(e.into()),
        None => Ok(reply),
    }
}

fn show_knowledge(
    storage: &Storage,
    settings: &Settings,
    refresh: bool,
    json: bool,
) -> SpendwiseResult<()> {
    let saved = if refresh {
        None
    } else {
        KnowledgeDocument::load(storage.paths())?
    };
    let document = match saved {
        Some(document) => document,
        None => {
            let document = KnowledgeDocument::compile(storage, settings, today())?;
            document.save(storage.paths())?;
            document
        }
    };

    if json {
        println!("{}", document.to_json()?);
        return Ok(());
    }

    println!(
        "Knowledge document ({} to {}, generated {})",
        document.window_start, document.window_end, document.generated_on
    );
    println!(
        "  Income {:.2}  Spending {:.2}  Net {:.2} {}",
        document.totals.income, document.totals.spending, document.totals.net, document.base_currency
    );
    println!(
        "  {} transaction(s), {} uncategorized",
        document.totals.transaction_count, document.totals.uncategorized_count
    );
    if !document.top_categories.is_empty() {
        println!("  Top categories:");
        for c in &document.top_categories {
            println!("    {:<24} {:>10.2} ({:.0}%)", c.category, c.amount, c.share);
        }
    }
    println!(
        "  Net worth {:.2} ({} budget(s), {} goal(s))",
        document.net_worth.net,
        document.budgets.len(),
        document.goals.len()
    );
    Ok(())
}
