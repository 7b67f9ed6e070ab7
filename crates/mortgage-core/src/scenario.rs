//! Bounded, named collection of computed results used for side-by-side
//! comparison. The store is the only shared mutable state in the engine;
//! every operation takes the inner lock so the capacity check and insert
//! are atomic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::MortgageError;
use crate::valuation::LoanResult;
use crate::MortgageResult;

/// Maximum number of concurrently held scenarios.
pub const MAX_SCENARIOS: usize = 3;

#[derive(Debug, Default)]
pub struct ScenarioStore {
    inner: Mutex<HashMap<String, LoanResult>>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, LoanResult>> {
        // A panic while holding the lock leaves the map consistent (every
        // mutation is a single insert/remove), so recover from poisoning.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a result under `name`. Overwriting an existing name is always
    /// allowed; a new name fails once the store holds `MAX_SCENARIOS`.
    pub fn put(&self, name: &str, result: LoanResult) -> MortgageResult<()> {
        let mut scenarios = self.lock();
        if !scenarios.contains_key(name) && scenarios.len() >= MAX_SCENARIOS {
            return Err(MortgageError::CapacityExceeded {
                name: name.to_string(),
                capacity: MAX_SCENARIOS,
            });
        }
        scenarios.insert(name.to_string(), result);
        Ok(())
    }

    /// Remove and return the named scenario. Deleting an absent name is an
    /// error, not a no-op.
    pub fn delete(&self, name: &str) -> MortgageResult<LoanResult> {
        self.lock()
            .remove(name)
            .ok_or_else(|| MortgageError::ScenarioNotFound {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<LoanResult> {
        self.lock().get(name).cloned()
    }

    /// Snapshot of all current entries, keyed by scenario name.
    pub fn list(&self) -> HashMap<String, LoanResult> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
