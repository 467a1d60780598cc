use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use spendwise::cli::{
    handle_account_command, handle_ai_command, handle_alert_command, handle_budget_command,
    handle_categorize_command, handle_category_command, handle_duplicates_command,
    handle_export_command, handle_goal_command, handle_import_command, handle_report_command,
    handle_transaction_command,
};
use spendwise::config::{Settings, SpendwisePaths};
use spendwise::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "spendwise",
    version,
    about = "Personal finance tracking from the terminal",
    long_about = "Spendwise imports bank CSV exports, flags duplicate transactions, \
                  categorizes spending and tracks budgets, goals and net worth. \
                  Optional AI features categorize, summarise and answer questions \
                  about your finances."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, default settings and starter categories
    Init,

    /// Show current configuration and paths
    Config,

    /// Account management commands
    #[command(subcommand)]
    Account(spendwise::cli::AccountCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(spendwise::cli::TransactionCommands),

    /// Import transactions from a bank CSV export
    Import(spendwise::cli::ImportArgs),

    /// Find and resolve duplicate transactions
    #[command(subcommand, alias = "dupes")]
    Duplicates(spendwise::cli::DuplicatesCommands),

    /// Rule and history based categorization
    #[command(subcommand)]
    Categorize(spendwise::cli::CategorizeCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(spendwise::cli::CategoryCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(spendwise::cli::BudgetCommands),

    /// Savings goal commands
    #[command(subcommand)]
    Goal(spendwise::cli::GoalCommands),

    /// Budget warnings and AI insights
    #[command(subcommand)]
    Alert(spendwise::cli::AlertCommands),

    /// Generate reports
    #[command(subcommand)]
    Report(spendwise::cli::ReportCommands),

    /// AI categorization, insights and chat
    #[command(subcommand)]
    Ai(spendwise::cli::AiCommands),

    /// Export data
    #[command(subcommand)]
    Export(spendwise::cli::ExportCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    spendwise::logging::init(cli.verbose);

    let paths = SpendwisePaths::new()?;

    let command = match cli.command {
        Some(Commands::Init) => {
            println!("Initializing Spendwise at: {}", paths.base_dir().display());
            initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Starter categories have been created. Next steps:");
            println!("  spendwise account create \"Checking\"");
            println!("  spendwise import statement.csv --account Checking");
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("Spendwise - personal finance tracking from the terminal");
            println!();
            println!("Run 'spendwise --help' for usage information.");
            return Ok(());
        }
    };

    if !paths.is_initialized() {
        debug!(path = %paths.base_dir().display(), "first run, initializing storage");
        initialize_storage(&paths)?;
    }

    let settings = Settings::load_or_create(&paths)?;
    settings.validate()?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match command {
        Commands::Init => {}
        Commands::Config => {
            println!("Spendwise Configuration");
            println!("=======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Base currency:  {}", settings.base_currency);
            for (code, rate) in &settings.exchange_rates {
                println!("    1 {} = {} {}", code, rate, settings.base_currency);
            }
            println!("  Date format:    {}", settings.date_format);
            println!("  Built-in rules: {}", settings.categorization.use_builtin_rules);
            println!("  AI endpoint:    {}", settings.ai.endpoint);
            println!("  AI model:       {}", settings.ai.model);
            println!("  AI key from:    ${}", settings.ai.api_key_env);
        }
        Commands::Account(cmd) => handle_account_command(&storage, &settings, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Import(args) => handle_import_command(&storage, &settings, args)?,
        Commands::Duplicates(cmd) => handle_duplicates_command(&storage, &settings, cmd)?,
        Commands::Categorize(cmd) => handle_categorize_command(&storage, &settings, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, cmd)?,
        Commands::Budget(cmd) => handle_budget_command(&storage, &settings, cmd)?,
        Commands::Goal(cmd) => handle_goal_command(&storage, &settings, cmd)?,
        Commands::Alert(cmd) => handle_alert_command(&storage, &settings, cmd)?,
        Commands::Report(cmd) => handle_report_command(&storage, &settings, cmd)?,
        Commands::Ai(cmd) => handle_ai_command(&storage, &settings, cmd)?,
        Commands::Export(cmd) => handle_export_command(&storage, cmd)?,
    }

    Ok(())
}
