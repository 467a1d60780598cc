//! Category service
//!
//! Category and group management. User-entered names are normalized and
//! compared case-insensitively; renaming a category relabels everything that
//! refers to it by name.

use tracing::info;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{
    category_names_match, normalize_category_name, Bucket, Categorization, Category,
    CategoryGroup, CategoryGroupId, CategoryId,
};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// A category group with its categories
#[derive(Debug, Clone)]
pub struct CategoryGroupWithCategories {
    pub group: CategoryGroup,
    pub categories: Vec<Category>,
}

/// What a category rename touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelabelCounts {
    pub transactions: usize,
    pub budgets: usize,
    pub rules: usize,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    // === Group Operations ===

    pub fn create_group(&self, name: &str) -> SpendwiseResult<CategoryGroup> {
        let name = normalize_category_name(name);
        if name.is_empty() {
            return Err(SpendwiseError::Validation(
                "Category group name cannot be empty".into(),
            ));
        }
        if self.storage.categories.get_group_by_name(&name)?.is_some() {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Category Group",
                identifier: name,
            });
        }

        let groups = self.storage.categories.get_all_groups()?;
        let max_order = groups.iter().map(|g| g.sort_order).max().unwrap_or(-1);
        let group = CategoryGroup::with_sort_order(&name, max_order + 1);
        group
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.categories.upsert_group(group.clone())?;
        self.storage.categories.save()?;
        Ok(group)
    }

    /// Find a group by name or ID
    pub fn find_group(&self, identifier: &str) -> SpendwiseResult<Option<CategoryGroup>> {
        if let Some(group) = self.storage.categories.get_group_by_name(identifier)? {
            return Ok(Some(group));
        }
        Ok(self
            .storage
            .categories
            .get_all_groups()?
            .into_iter()
            .find(|g| g.id.matches(identifier)))
    }

    fn require_group(&self, identifier: &str) -> SpendwiseResult<CategoryGroup> {
        self.find_group(identifier)?
            .ok_or_else(|| SpendwiseError::NotFound {
                entity_type: "Category Group",
                identifier: identifier.to_string(),
            })
    }

    pub fn list_groups(&self) -> SpendwiseResult<Vec<CategoryGroup>> {
        self.storage.categories.get_all_groups()
    }

    /// Groups with their categories; ungrouped categories come last under a
    /// synthetic "Other" group
    pub fn list_groups_with_categories(
        &self,
        include_hidden: bool,
    ) -> SpendwiseResult<Vec<CategoryGroupWithCategories>> {
        let mut result = Vec::new();
        for group in self.storage.categories.get_all_groups()? {
            let categories = self
                .storage
                .categories
                .get_categories_in_group(group.id)?
                .into_iter()
                .filter(|c| include_hidden || !c.hidden)
                .collect();
            result.push(CategoryGroupWithCategories { group, categories });
        }

        let ungrouped: Vec<Category> = self
            .list_categories(include_hidden)?
            .into_iter()
            .filter(|c| c.group_id.is_none())
            .collect();
        if !ungrouped.is_empty() {
            result.push(CategoryGroupWithCategories {
                group: CategoryGroup::with_sort_order("Other", i32::MAX),
                categories: ungrouped,
            });
        }
        Ok(result)
    }

    pub fn rename_group(&self, identifier: &str, name: &str) -> SpendwiseResult<CategoryGroup> {
        let mut group = self.require_group(identifier)?;
        let name = normalize_category_name(name);
        if let Some(other) = self.storage.categories.get_group_by_name(&name)? {
            if other.id != group.id {
                return Err(SpendwiseError::Duplicate {
                    entity_type: "Category Group",
                    identifier: name,
                });
            }
        }

        group.name = name;
        group.updated_at = chrono::Utc::now();
        group
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;
        self.storage.categories.upsert_group(group.clone())?;
        self.storage.categories.save()?;
        Ok(group)
    }

    /// Delete a group
    ///
    /// A group with categories is only deleted with `force`, which leaves
    /// its categories ungrouped.
    pub fn delete_group(&self, identifier: &str, force: bool) -> SpendwiseResult<CategoryGroup> {
        let group = self.require_group(identifier)?;
        let categories = self.storage.categories.get_categories_in_group(group.id)?;
        if !categories.is_empty() && !force {
            return Err(SpendwiseError::Validation(format!(
                "Cannot delete group '{}' - it contains {} categories. Use --force to ungroup them.",
                group.name,
                categories.len()
            )));
        }

        for mut category in categories {
            category.move_to_group(None);
            self.storage.categories.upsert_category(category)?;
        }
        self.storage.categories.delete_group(group.id)?;
        self.storage.categories.save()?;
        Ok(group)
    }

    // === Category Operations ===

    pub fn create_category(
        &self,
        name: &str,
        group: Option<&str>,
        bucket: Bucket,
    ) -> SpendwiseResult<Category> {
        let group_id: Option<CategoryGroupId> = match group {
            Some(identifier) => Some(self.require_group(identifier)?.id),
            None => None,
        };

        let mut category = Category::new(name, bucket);
        category
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        if self.storage.categories.category_name_exists(&category.name, None)? {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Category",
                identifier: category.name,
            });
        }

        if let Some(group_id) = group_id {
            let siblings = self.storage.categories.get_categories_in_group(group_id)?;
            category.sort_order = siblings.iter().map(|c| c.sort_order).max().unwrap_or(-1) + 1;
            category.group_id = Some(group_id);
        }

        self.storage.categories.upsert_category(category.clone())?;
        self.storage.categories.save()?;
        info!(category = %category.name, "created category");
        Ok(category)
    }

    pub fn get_category(&self, id: CategoryId) -> SpendwiseResult<Option<Category>> {
        self.storage.categories.get_category(id)
    }

    /// Find a category by label or ID
    pub fn find_category(&self, identifier: &str) -> SpendwiseResult<Option<Category>> {
        if let Some(category) = self.storage.categories.get_category_by_name(identifier)? {
            return Ok(Some(category));
        }
        Ok(self
            .storage
            .categories
            .get_all_categories()?
            .into_iter()
            .find(|c| c.id.matches(identifier)))
    }

    pub fn require_category(&self, identifier: &str) -> SpendwiseResult<Category> {
        self.find_category(identifier)?
            .ok_or_else(|| SpendwiseError::category_not_found(identifier))
    }

    pub fn list_categories(&self, include_hidden: bool) -> SpendwiseResult<Vec<Category>> {
        Ok(self
            .storage
            .categories
            .get_all_categories()?
            .into_iter()
            .filter(|c| include_hidden || !c.hidden)
            .collect())
    }

    /// Labels offered to categorizers
    pub fn labels(&self) -> SpendwiseResult<Vec<String>> {
        self.storage.categories.labels()
    }

    /// Rename a category and relabel transactions, budgets and rules
    pub fn rename_category(
        &self,
        identifier: &str,
        name: &str,
    ) -> SpendwiseResult<(Category, RelabelCounts)> {
        let mut category = self.require_category(identifier)?;
        let old_name = category.name.clone();
        category.rename(name);
        category
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;
        if self
            .storage
            .categories
            .category_name_exists(&category.name, Some(category.id))?
        {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Category",
                identifier: category.name,
            });
        }

        self.storage.categories.upsert_category(category.clone())?;
        self.storage.categories.save()?;
        let counts = self.relabel(&old_name, Some(&category.name))?;
        info!(from = %old_name, to = %category.name, ?counts, "renamed category");
        Ok((category, counts))
    }

    pub fn move_category(&self, identifier: &str, group: Option<&str>) -> SpendwiseResult<Category> {
        let mut category = self.require_category(identifier)?;
        let group_id = match group {
            Some(g) => Some(self.require_group(g)?.id),
            None => None,
        };
        category.move_to_group(group_id);
        self.storage.categories.upsert_category(category.clone())?;
        self.storage.categories.save()?;
        Ok(category)
    }

    pub fn set_hidden(&self, identifier: &str, hidden: bool) -> SpendwiseResult<Category> {
        let mut category = self.require_category(identifier)?;
        category.hidden = hidden;
        category.updated_at = chrono::Utc::now();
        self.storage.categories.upsert_category(category.clone())?;
        self.storage.categories.save()?;
        Ok(category)
    }

    /// Delete a category
    ///
    /// Refused while a budget refers to it. Transactions carrying the label
    /// become uncategorized.
    pub fn delete_category(&self, identifier: &str) -> SpendwiseResult<(Category, usize)> {
        let category = self.require_category(identifier)?;
        let budgets = self
            .storage
            .budgets
            .filter(|b| category_names_match(&b.category, &category.name))?;
        if !budgets.is_empty() {
            return Err(SpendwiseError::Validation(format!(
                "Category '{}' has {} budget(s); delete them first",
                category.name,
                budgets.len()
            )));
        }

        self.storage.categories.delete_category(category.id)?;
        self.storage.categories.save()?;
        let counts = self.relabel(&category.name, None)?;
        Ok((category, counts.transactions))
    }

    /// Point everything labelled `from` at `to`, or clear the label
    fn relabel(&self, from: &str, to: Option<&str>) -> SpendwiseResult<RelabelCounts> {
        let mut counts = RelabelCounts::default();

        for mut txn in self.storage.transactions.get_all()? {
            if txn.category.as_deref().map(|c| category_names_match(c, from)) != Some(true) {
                continue;
            }
            match to {
                Some(label) => {
                    let how = txn.categorization.clone().unwrap_or_else(Categorization::manual);
                    txn.set_category(label, how);
                }
                None => txn.clear_category(),
            }
            self.storage.transactions.upsert(txn)?;
            counts.transactions += 1;
        }

        if let Some(label) = to {
            for mut budget in self
                .storage
                .budgets
                .filter(|b| category_names_match(&b.category, from))?
            {
                budget.category = label.to_string();
                budget.updated_at = chrono::Utc::now();
                self.storage.budgets.upsert(budget)?;
                counts.budgets += 1;
            }

            for mut rule in self
                .storage
                .rules
                .filter(|r| category_names_match(&r.category, from))?
            {
                rule.category = label.to_string();
                self.storage.rules.upsert(rule)?;
                counts.rules += 1;
            }
        }

        self.storage.transactions.save()?;
        self.storage.budgets.save()?;
        self.storage.rules.save()?;
        Ok(counts)
    }
}
