//! Category CLI commands
//!
//! Implements CLI commands for category and group management.

use clap::Subcommand;

use crate::display::category::{format_category_tree, format_group_list};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::Bucket;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories grouped by category group
    List {
        /// Include hidden categories
        #[arg(short, long)]
        all: bool,
    },
    /// Create a category
    Create {
        /// Category name
        name: String,
        /// Group name
        #[arg(short, long)]
        group: Option<String>,
        /// Spending bucket (needs, wants, savings, income, transfer)
        #[arg(short, long, default_value = "wants")]
        bucket: String,
    },
    /// Rename a category; transactions, budgets and rules follow
    Rename {
        /// Current name or ID
        category: String,
        /// New name
        name: String,
    },
    /// Move a category to another group
    Move {
        /// Category name or ID
        category: String,
        /// Target group; ungrouped when omitted
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Hide a category from listings and AI prompts
    Hide {
        /// Category name or ID
        category: String,
    },
    /// Show a hidden category again
    Unhide {
        /// Category name or ID
        category: String,
    },
    /// Delete a category; its transactions become uncategorized
    Delete {
        /// Category name or ID
        category: String,
    },
    /// List category groups
    Groups,
    /// Create a category group
    CreateGroup {
        /// Group name
        name: String,
    },
    /// Rename a category group
    RenameGroup {
        /// Current name or ID
        group: String,
        /// New name
        name: String,
    },
    /// Delete a category group
    DeleteGroup {
        /// Group name or ID
        group: String,
        /// Ungroup its categories instead of refusing
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> SpendwiseResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { all } => {
            let groups = service.list_groups_with_categories(all)?;
            println!("{}", format_category_tree(&groups));
        }

        CategoryCommands::Create {
            name,
            group,
            bucket,
        } => {
            let bucket = Bucket::parse(&bucket).ok_or_else(|| {
                SpendwiseError::Validation(format!(
                    "Invalid bucket: '{}'. Valid buckets: needs, wants, savings, income, transfer",
                    bucket
                ))
            })?;
            let category = service.create_category(&name, group.as_deref(), bucket)?;
            println!("Created category: {} ({})", category.name, category.bucket);
        }

        CategoryCommands::Rename { category, name } => {
            let (renamed, counts) = service.rename_category(&category, &name)?;
            println!("Renamed category to '{}'", renamed.name);
            println!(
                "  Relabelled {} transaction(s), {} budget(s), {} rule(s)",
                counts.transactions, counts.budgets, counts.rules
            );
        }

        CategoryCommands::Move { category, group } => {
            let moved = service.move_category(&category, group.as_deref())?;
            match group {
                Some(group) => println!("Moved '{}' to '{}'", moved.name, group),
                None => println!("Moved '{}' out of its group", moved.name),
            }
        }

        CategoryCommands::Hide { category } => {
            let hidden = service.set_hidden(&category, true)?;
            println!("Hid category: {}", hidden.name);
        }

        CategoryCommands::Unhide { category } => {
            let shown = service.set_hidden(&category, false)?;
            println!("Unhid category: {}", shown.name);
        }

        CategoryCommands::Delete { category } => {
            let (deleted, cleared) = service.delete_category(&category)?;
            println!("Deleted category: {}", deleted.name);
            if cleared > 0 {
                println!("  {} transaction(s) are now uncategorized", cleared);
            }
        }

        CategoryCommands::Groups => {
            println!("{}", format_group_list(&service.list_groups()?));
        }

        CategoryCommands::CreateGroup { name } => {
            let group = service.create_group(&name)?;
            println!("Created group: {}", group.name);
        }

        CategoryCommands::RenameGroup { group, name } => {
            let renamed = service.rename_group(&group, &name)?;
            println!("Renamed group to '{}'", renamed.name);
        }

        CategoryCommands::DeleteGroup { group, force } => {
            let deleted = service.delete_group(&group, force)?;
            println!("Deleted group: {}", deleted.name);
        }
    }

    Ok(())
}
