//! Merchant history repository
//!
//! Merchant profiles are keyed by their normalized pattern.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendwiseError;
use crate::models::MerchantProfile;

use super::collection::lock_error;
use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MerchantData {
    merchants: Vec<MerchantProfile>,
}

fn key(pattern: &str) -> String {
    pattern.trim().to_uppercase()
}

/// Repository for learned merchant history
pub struct MerchantRepository {
    path: PathBuf,
    data: RwLock<HashMap<String, MerchantProfile>>,
}

impl MerchantRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SpendwiseError> {
        let file_data: MerchantData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_error)?;

        data.clear();
        for profile in file_data.merchants {
            data.insert(key(&profile.pattern), profile);
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendwiseError> {
        let merchants = self.get_all()?;
        write_json_atomic(&self.path, &MerchantData { merchants })
    }

    /// Profile for an exact merchant pattern
    pub fn get(&self, pattern: &str) -> Result<Option<MerchantProfile>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&key(pattern)).cloned())
    }

    /// All profiles sorted by pattern
    pub fn get_all(&self) -> Result<Vec<MerchantProfile>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut list: Vec<_> = data.values().cloned().collect();
        list.sort_by(|a, b| a.pattern.cmp(&b.pattern));
        Ok(list)
    }

    /// The existing profile for a pattern, or a fresh one (not yet stored)
    pub fn get_or_new(&self, pattern: &str) -> Result<MerchantProfile, SpendwiseError> {
        Ok(self
            .get(pattern)?
            .unwrap_or_else(|| MerchantProfile::new(key(pattern))))
    }

    pub fn upsert(&self, profile: MerchantProfile) -> Result<(), SpendwiseError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(key(&profile.pattern), profile);
        Ok(())
    }

    pub fn delete(&self, pattern: &str) -> Result<bool, SpendwiseError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&key(pattern)).is_some())
    }

    pub fn count(&self) -> Result<usize, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}
