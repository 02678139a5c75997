//! Storage seam for streak state.
//!
//! The engine never owns streak state; hosts inject a repository and keep
//! writes to one key serialized. [`InMemoryStreakRepository`] backs tests and
//! short-lived hosts, `storage::Database` the CLI.

use std::collections::BTreeMap;

use super::state::{StreakKey, StreakState};
use crate::error::Result;

/// Load-one / save-one / load-all access to streak state.
pub trait StreakRepository {
    /// State for `key`, if a completion was ever recorded.
    fn load(&self, key: &StreakKey) -> Result<Option<StreakState>>;

    /// Insert or replace the state for its key.
    fn save(&mut self, state: &StreakState) -> Result<()>;

    /// Every stored state, ordered by key.
    fn load_all(&self) -> Result<Vec<StreakState>>;

    /// Every stored state of one user, ordered by goal.
    fn load_for_user(&self, user_id: &str) -> Result<Vec<StreakState>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|state| state.user_id == user_id)
            .collect())
    }
}

/// Map-backed repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStreakRepository {
    states: BTreeMap<StreakKey, StreakState>,
}

impl InMemoryStreakRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StreakRepository for InMemoryStreakRepository {
    fn load(&self, key: &StreakKey) -> Result<Option<StreakState>> {
        Ok(self.states.get(key).cloned())
    }

    fn save(&mut self, state: &StreakState) -> Result<()> {
        self.states.insert(state.key(), state.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<StreakState>> {
        Ok(self.states.values().cloned().collect())
    }
}
