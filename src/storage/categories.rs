//! Category and CategoryGroup repository for JSON storage
//!
//! Groups and categories live together in categories.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendwiseError;
use crate::models::{category_names_match, Category, CategoryGroup, CategoryGroupId, CategoryId};

use super::collection::lock_error;
use super::file_io::{read_json, write_json_atomic};

/// On-disk layout of categories.json
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub groups: Vec<CategoryGroup>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Repository for category and group persistence
pub struct CategoryRepository {
    path: PathBuf,
    groups: RwLock<HashMap<CategoryGroupId, CategoryGroup>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            groups: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SpendwiseError> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut groups = self.groups.write().map_err(lock_error)?;
        let mut categories = self.categories.write().map_err(lock_error)?;

        groups.clear();
        categories.clear();
        groups.extend(file_data.groups.into_iter().map(|g| (g.id, g)));
        categories.extend(file_data.categories.into_iter().map(|c| (c.id, c)));
        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendwiseError> {
        let file_data = CategoryData {
            groups: self.get_all_groups()?,
            categories: self.get_all_categories()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    // Group operations

    pub fn get_group(&self, id: CategoryGroupId) -> Result<Option<CategoryGroup>, SpendwiseError> {
        let groups = self.groups.read().map_err(lock_error)?;
        Ok(groups.get(&id).cloned())
    }

    /// All groups by sort order
    pub fn get_all_groups(&self) -> Result<Vec<CategoryGroup>, SpendwiseError> {
        let groups = self.groups.read().map_err(lock_error)?;
        let mut list: Vec<_> = groups.values().cloned().collect();
        list.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(list)
    }

    /// Find a group by name (normalized, case-insensitive)
    pub fn get_group_by_name(&self, name: &str) -> Result<Option<CategoryGroup>, SpendwiseError> {
        let groups = self.groups.read().map_err(lock_error)?;
        Ok(groups
            .values()
            .find(|g| category_names_match(&g.name, name))
            .cloned())
    }

    pub fn upsert_group(&self, group: CategoryGroup) -> Result<(), SpendwiseError> {
        let mut groups = self.groups.write().map_err(lock_error)?;
        groups.insert(group.id, group);
        Ok(())
    }

    pub fn delete_group(&self, id: CategoryGroupId) -> Result<bool, SpendwiseError> {
        let mut groups = self.groups.write().map_err(lock_error)?;
        Ok(groups.remove(&id).is_some())
    }

    // Category operations

    pub fn get_category(&self, id: CategoryId) -> Result<Option<Category>, SpendwiseError> {
        let categories = self.categories.read().map_err(lock_error)?;
        Ok(categories.get(&id).cloned())
    }

    /// All categories ordered by group sort order, then their own sort order
    pub fn get_all_categories(&self) -> Result<Vec<Category>, SpendwiseError> {
        let group_order: HashMap<CategoryGroupId, i32> = self
            .get_all_groups()?
            .into_iter()
            .map(|g| (g.id, g.sort_order))
            .collect();

        let categories = self.categories.read().map_err(lock_error)?;
        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by_key(|c| {
            let group_rank = c
                .group_id
                .and_then(|g| group_order.get(&g).copied())
                .unwrap_or(i32::MAX);
            (group_rank, c.sort_order, c.name.to_lowercase())
        });
        Ok(list)
    }

    pub fn get_categories_in_group(
        &self,
        group_id: CategoryGroupId,
    ) -> Result<Vec<Category>, SpendwiseError> {
        Ok(self
            .get_all_categories()?
            .into_iter()
            .filter(|c| c.group_id == Some(group_id))
            .collect())
    }

    /// Find a category by label (normalized, case-insensitive)
    pub fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, SpendwiseError> {
        let categories = self.categories.read().map_err(lock_error)?;
        Ok(categories.values().find(|c| c.matches_name(name)).cloned())
    }

    pub fn upsert_category(&self, category: Category) -> Result<(), SpendwiseError> {
        let mut categories = self.categories.write().map_err(lock_error)?;
        categories.insert(category.id, category);
        Ok(())
    }

    pub fn delete_category(&self, id: CategoryId) -> Result<bool, SpendwiseError> {
        let mut categories = self.categories.write().map_err(lock_error)?;
        Ok(categories.remove(&id).is_some())
    }

    /// Whether a category name is taken, optionally ignoring one category
    pub fn category_name_exists(
        &self,
        name: &str,
        exclude_id: Option<CategoryId>,
    ) -> Result<bool, SpendwiseError> {
        let categories = self.categories.read().map_err(lock_error)?;
        Ok(categories
            .values()
            .any(|c| c.matches_name(name) && Some(c.id) != exclude_id))
    }

    /// Labels of all visible categories, in listing order
    pub fn labels(&self) -> Result<Vec<String>, SpendwiseError> {
        Ok(self
            .get_all_categories()?
            .into_iter()
            .filter(|c| !c.hidden)
            .map(|c| c.name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bucket;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_lookup_by_normalized_name() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert_category(Category::with_exact_name("Food & Dining", Bucket::Wants))
            .unwrap();

        assert!(repo.get_category_by_name("food dining").unwrap().is_some());
        assert!(repo.get_category_by_name("FOOD & DINING").unwrap().is_some());
        assert!(repo.category_name_exists("Food <Dining>", None).unwrap());
        assert!(repo.get_category_by_name("Dining").unwrap().is_none());
    }

    #[test]
    fn test_ordering_follows_groups() {
        let (_temp_dir, repo) = create_test_repo();
        let first = CategoryGroup::with_sort_order("Essentials", 0);
        let second = CategoryGroup::with_sort_order("Lifestyle", 1);
        repo.upsert_group(second.clone()).unwrap();
        repo.upsert_group(first.clone()).unwrap();

        repo.upsert_category(Category::new("Travel", Bucket::Wants).in_group(second.id))
            .unwrap();
        repo.upsert_category(Category::new("Rent", Bucket::Needs).in_group(first.id))
            .unwrap();
        repo.upsert_category(Category::new("Loose", Bucket::Wants)).unwrap();

        assert_eq!(repo.labels().unwrap(), vec!["Rent", "Travel", "Loose"]);
        assert_eq!(repo.get_categories_in_group(second.id).unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let group = CategoryGroup::new("Essentials");
        repo.upsert_group(group.clone()).unwrap();
        let category = Category::new("Groceries", Bucket::Needs).in_group(group.id);
        repo.upsert_category(category.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = CategoryRepository::new(temp_dir.path().join("categories.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_all_groups().unwrap().len(), 1);
        assert_eq!(
            reloaded.get_category(category.id).unwrap().unwrap().group_id,
            Some(group.id)
        );
    }

    #[test]
    fn test_hidden_categories_excluded_from_labels() {
        let (_temp_dir, repo) = create_test_repo();
        let mut hidden = Category::new("Old", Bucket::Wants);
        hidden.hidden = true;
        repo.upsert_category(hidden).unwrap();
        repo.upsert_category(Category::new("Current", Bucket::Wants)).unwrap();

        assert_eq!(repo.labels().unwrap(), vec!["Current"]);
    }
}
