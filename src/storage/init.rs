//! Storage initialization
//!
//! First-run setup: directories, default settings and the starter category
//! set. The starter labels are the ones the built-in merchant rules assign.

use tracing::info;

use crate::config::paths::SpendwisePaths;
use crate::config::settings::Settings;
use crate::error::SpendwiseError;
use crate::models::{Bucket, Category, CategoryGroup};

use super::categories::CategoryData;
use super::file_io::write_json_atomic;

/// Starter groups and their categories
pub const DEFAULT_CATEGORIES: &[(&str, &[(&str, Bucket)])] = &[
    ("Income", &[("Income", Bucket::Income)]),
    (
        "Essentials",
        &[
            ("Housing", Bucket::Needs),
            ("Utilities", Bucket::Needs),
            ("Groceries", Bucket::Needs),
            ("Transportation", Bucket::Needs),
            ("Fuel", Bucket::Needs),
            ("Health & Pharmacy", Bucket::Needs),
            ("Insurance", Bucket::Needs),
            ("Fees", Bucket::Needs),
        ],
    ),
    (
        "Lifestyle",
        &[
            ("Food & Dining", Bucket::Wants),
            ("Entertainment", Bucket::Wants),
            ("Subscriptions", Bucket::Wants),
            ("Shopping", Bucket::Wants),
            ("Travel", Bucket::Wants),
        ],
    ),
    (
        "Money Movement",
        &[
            ("Savings", Bucket::Savings),
            ("Transfer", Bucket::Transfer),
            ("Cash & ATM", Bucket::Transfer),
        ],
    ),
];

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched, so running it twice is harmless.
pub fn initialize_storage(paths: &SpendwisePaths) -> Result<(), SpendwiseError> {
    paths.ensure_directories()?;

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
        info!(path = %paths.settings_file().display(), "wrote default settings");
    }

    if !paths.categories_file().exists() {
        create_default_categories(paths)?;
    }

    Ok(())
}

fn create_default_categories(paths: &SpendwisePaths) -> Result<(), SpendwiseError> {
    let mut groups = Vec::new();
    let mut categories = Vec::new();

    for (i, (group_name, members)) in DEFAULT_CATEGORIES.iter().enumerate() {
        let group = CategoryGroup::with_sort_order(group_name, i as i32);
        for (j, (name, bucket)) in members.iter().enumerate() {
            let mut category = Category::with_exact_name(*name, *bucket).in_group(group.id);
            category.sort_order = j as i32;
            categories.push(category);
        }
        groups.push(group);
    }

    info!(
        groups = groups.len(),
        categories = categories.len(),
        "created default categories"
    );
    write_json_atomic(paths.categories_file(), &CategoryData { groups, categories })
}
