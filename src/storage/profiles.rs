use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::Profile;

static PROFILE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").unwrap());

/// Profile ids appear in URLs and webhook payloads, so they are restricted
/// to alphanumerics, hyphens and underscores, at most 64 characters.
pub fn is_valid_profile_id(id: &str) -> bool {
    PROFILE_ID_PATTERN.is_match(id)
}

/// In-memory profile registry. Upserts replace the stored profile whole.
pub struct ProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    pub async fn upsert(&self, profile: Profile) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id.clone(), profile);
    }

    pub async fn get(&self, id: &str) -> Option<Profile> {
        self.profiles.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.profiles.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}
