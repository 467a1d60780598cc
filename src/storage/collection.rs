//! Generic keyed collection persisted as one JSON file
//!
//! Accounts, budgets, goals, alerts and rules all share the same shape: a map
//! from id to record, loaded whole and saved whole. `Collection` holds that
//! shape once; each record type says how it is keyed and listed.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::SpendwiseError;
use crate::models::{
    Account, AccountId, Alert, AlertId, Budget, BudgetId, CategoryRule, Goal, GoalId, RuleId,
};

use super::file_io::{read_json, write_json_atomic};

/// A record stored in a `Collection`
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Eq + Hash + Display;

    fn id(&self) -> Self::Id;

    /// Listing order
    fn listing_order(a: &Self, b: &Self) -> Ordering;
}

#[derive(Serialize, Deserialize)]
struct CollectionFile<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

impl<T> Default for CollectionFile<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

pub(crate) fn lock_error(e: impl Display) -> SpendwiseError {
    SpendwiseError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Repository for one record type
pub struct Collection<T: Record> {
    path: PathBuf,
    data: RwLock<HashMap<T::Id, T>>,
}

impl<T: Record> Collection<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SpendwiseError> {
        let file: CollectionFile<T> = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_error)?;

        data.clear();
        for item in file.items {
            data.insert(item.id(), item);
        }
        debug!(path = %self.path.display(), count = data.len(), "loaded collection");
        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendwiseError> {
        let items = self.get_all()?;
        write_json_atomic(&self.path, &CollectionFile { items })
    }

    pub fn get(&self, id: T::Id) -> Result<Option<T>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All records in listing order
    pub fn get_all(&self) -> Result<Vec<T>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut items: Vec<_> = data.values().cloned().collect();
        items.sort_by(T::listing_order);
        Ok(items)
    }

    /// Records matching a predicate, in listing order
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>, SpendwiseError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.get_all()?.into_iter().filter(|t| predicate(t)).collect())
    }

    /// First record (in listing order) matching a predicate
    pub fn find<F>(&self, predicate: F) -> Result<Option<T>, SpendwiseError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.get_all()?.into_iter().find(|t| predicate(t)))
    }

    pub fn upsert(&self, item: T) -> Result<(), SpendwiseError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(item.id(), item);
        Ok(())
    }

    pub fn delete(&self, id: T::Id) -> Result<bool, SpendwiseError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

impl Record for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }

    fn listing_order(a: &Self, b: &Self) -> Ordering {
        a.kind()
            .cmp(&b.kind())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    }
}

impl Record for Budget {
    type Id = BudgetId;

    fn id(&self) -> BudgetId {
        self.id
    }

    fn listing_order(a: &Self, b: &Self) -> Ordering {
        a.category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then(a.created_at.cmp(&b.created_at))
    }
}

impl Record for Goal {
    type Id = GoalId;

    fn id(&self) -> GoalId {
        self.id
    }

    fn listing_order(a: &Self, b: &Self) -> Ordering {
        // Dated goals first, soonest deadline first
        match (a.target_date, b.target_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then(a.created_at.cmp(&b.created_at))
    }
}

impl Record for Alert {
    type Id = AlertId;

    fn id(&self) -> AlertId {
        self.id
    }

    fn listing_order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }
}

impl Record for CategoryRule {
    type Id = RuleId;

    fn id(&self) -> RuleId {
        self.id
    }

    fn listing_order(a: &Self, b: &Self) -> Ordering {
        a.priority
            .cmp(&b.priority)
            .then(a.created_at.cmp(&b.created_at))
    }
}

pub type AccountRepository = Collection<Account>;
pub type BudgetRepository = Collection<Budget>;
pub type GoalRepository = Collection<Goal>;
pub type AlertRepository = Collection<Alert>;
pub type RuleRepository = Collection<CategoryRule>;
