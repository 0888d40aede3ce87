//! Persisted record shape

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Whole state file: target name to record
pub type PersistedState = BTreeMap<String, TargetRecord>;

/// What survives between runs for one target
///
/// Recipes and predicates are process-local and re-supplied by registration,
/// so only the value and the dependency snapshot are stored. Absent values
/// are written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Last value produced by the target's recipe
    #[serde(default)]
    pub value: Option<Value>,

    /// Dependency values observed when the value was produced
    #[serde(default)]
    pub dependency_build_info: BTreeMap<String, Option<Value>>,
}

impl TargetRecord {
    /// Recorded value of `dependency`, absent if it was never observed
    pub fn dependency_value(&self, dependency: &str) -> Option<&Value> {
        self.dependency_build_info
            .get(dependency)
            .and_then(|value| value.as_ref())
    }
}
