//! Spendwise - personal finance tracking from the terminal
//!
//! Spendwise keeps transactions, accounts, budgets and goals in local JSON
//! files. It imports bank CSV exports, finds duplicate transactions,
//! categorizes spending with merchant rules and learned history, and can
//! hand a compact digest of recent activity to an LLM for categorization,
//! insights and chat.
//!
//! # Architecture
//!
//! - `config`: paths and user settings
//! - `error`: the crate error type
//! - `models`: accounts, transactions, categories, budgets, goals, alerts
//! - `storage`: JSON file storage
//! - `import`: CSV parsing and column detection
//! - `duplicates`: fuzzy duplicate detection
//! - `categorize`: merchant extraction and rule/history categorization
//! - `services`: business logic over storage
//! - `reports`: aggregations in the base currency
//! - `knowledge`: the digest sent to the AI provider
//! - `ai`: prompts, response parsing and the provider client
//! - `export`: CSV, JSON and YAML export
//! - `display`, `cli`: terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use spendwise::config::{SpendwisePaths, Settings};
//! use spendwise::storage::Storage;
//!
//! let paths = SpendwisePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod ai;
pub mod categorize;
pub mod cli;
pub mod config;
pub mod currency;
pub mod display;
pub mod duplicates;
pub mod error;
pub mod export;
pub mod import;
pub mod knowledge;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{SpendwiseError, SpendwiseResult};
