//! Target registry
//!
//! Maps target names to targets. Prior state is handed over once at
//! construction and consulted as each target is registered.

use crate::error::{KilnError, KilnResult};
use crate::state::PersistedState;
use crate::target::{outdate_target_name, target_name, OutdatePredicate, Recipe, Target};
use std::collections::BTreeMap;
use tracing::debug;

/// Handle returned by registration, naming the registered target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHandle {
    name: String,
}

impl TargetHandle {
    /// Name of the registered target
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// All targets known to one build process
#[derive(Debug, Default)]
pub struct Registry {
    targets: BTreeMap<String, Target>,
    prior: PersistedState,
}

impl Registry {
    /// Create a registry seeded with previously persisted state
    pub fn new(prior: PersistedState) -> Self {
        Self {
            targets: BTreeMap::new(),
            prior,
        }
    }

    /// Register a recipe under the name derived from `identity`
    ///
    /// `dependency_names` are the targets whose values the recipe receives,
    /// in order. They are resolved lazily at build time.
    pub fn register(
        &mut self,
        identity: &str,
        dependency_names: Vec<String>,
        recipe: Recipe,
    ) -> KilnResult<TargetHandle> {
        let name = target_name(identity).to_string();
        if self.targets.contains_key(&name) {
            return Err(KilnError::DuplicateTarget(name));
        }

        let target = Target::new(name.clone(), dependency_names, recipe, self.prior.get(&name));
        debug!("Registered {:?}", target);
        self.targets.insert(name.clone(), target);

        Ok(TargetHandle { name })
    }

    /// Attach an outdate predicate to an already registered target
    pub fn register_outdate_predicate(
        &mut self,
        identity: &str,
        predicate: OutdatePredicate,
    ) -> KilnResult<()> {
        let name = outdate_target_name(identity);
        let target = self.lookup_mut(name)?;
        target.set_outdate_predicate(predicate);
        debug!("Registered outdate predicate for {}", name);
        Ok(())
    }

    /// Look up a target by name
    pub fn lookup(&self, name: &str) -> KilnResult<&Target> {
        self.targets
            .get(name)
            .ok_or_else(|| KilnError::UnknownTarget(name.to_string()))
    }

    /// Look up a target by name for mutation
    pub fn lookup_mut(&mut self, name: &str) -> KilnResult<&mut Target> {
        self.targets
            .get_mut(name)
            .ok_or_else(|| KilnError::UnknownTarget(name.to_string()))
    }

    /// Whether a target with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Registered target names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Number of registered targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are registered
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Persisted form of every registered target
    pub fn to_state(&self) -> PersistedState {
        self.targets
            .iter()
            .map(|(name, target)| (name.clone(), target.to_record()))
            .collect()
    }
}
