//! Target model
//!
//! A target is one build unit: a recipe, the dependency names whose values
//! the recipe consumes, the value it last produced and the dependency values
//! that value was built against.

use crate::error::{BoxError, KilnError, KilnResult};
use crate::state::TargetRecord;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Prefix stripped from a recipe identity to form its target name
pub const BUILD_PREFIX: &str = "build_";

/// Prefix stripped from a predicate identity to form its target name
pub const OUTDATE_PREFIX: &str = "outdate_";

/// Produces a target value from its dependency values, in declared order
///
/// An absent dependency value is passed as `Value::Null`.
pub type Recipe = Box<dyn Fn(&[Value]) -> Result<Value, BoxError>>;

/// Forces a rebuild when it returns `true`
pub type OutdatePredicate = Box<dyn Fn() -> Result<bool, BoxError>>;

/// Derive a target name from a recipe identity (`build_image` -> `image`)
pub fn target_name(identity: &str) -> &str {
    identity.strip_prefix(BUILD_PREFIX).unwrap_or(identity)
}

/// Derive a target name from a predicate identity (`outdate_image` -> `image`)
pub fn outdate_target_name(identity: &str) -> &str {
    identity.strip_prefix(OUTDATE_PREFIX).unwrap_or(identity)
}

/// One registered build unit
pub struct Target {
    name: String,
    dependency_names: Vec<String>,
    recipe: Recipe,
    value: Option<Value>,
    dependency_build_info: BTreeMap<String, Option<Value>>,
    outdate_predicate: Option<OutdatePredicate>,
}

impl Target {
    /// Create a target, seeding value and snapshot from a prior record
    ///
    /// The snapshot holds exactly one entry per dependency name; entries
    /// missing from the record are absent.
    pub fn new(
        name: impl Into<String>,
        dependency_names: Vec<String>,
        recipe: Recipe,
        prior: Option<&TargetRecord>,
    ) -> Self {
        let value = prior.and_then(|record| normalize(record.value.clone()));
        let dependency_build_info = dependency_names
            .iter()
            .map(|dep| {
                let observed = prior.and_then(|record| record.dependency_value(dep).cloned());
                (dep.clone(), normalize(observed))
            })
            .collect();

        Self {
            name: name.into(),
            dependency_names,
            recipe,
            value,
            dependency_build_info,
            outdate_predicate: None,
        }
    }

    /// Target name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dependency names in declared order
    pub fn dependency_names(&self) -> &[String] {
        &self.dependency_names
    }

    /// Most recently produced value
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Dependency values recorded at the last successful build
    pub fn dependency_build_info(&self) -> &BTreeMap<String, Option<Value>> {
        &self.dependency_build_info
    }

    /// Whether an outdate predicate is attached
    pub fn has_outdate_predicate(&self) -> bool {
        self.outdate_predicate.is_some()
    }

    pub(crate) fn set_outdate_predicate(&mut self, predicate: OutdatePredicate) {
        self.outdate_predicate = Some(predicate);
    }

    /// Whether this target's own freshness is in question
    ///
    /// The predicate, when attached, decides alone. Otherwise a target is
    /// outdated only while it has no value.
    pub fn is_outdated(&self) -> KilnResult<bool> {
        match &self.outdate_predicate {
            Some(predicate) => {
                info!("checking {}", self.name);
                let result = predicate().map_err(|e| KilnError::predicate(&self.name, e))?;
                info!("finished checking {} with result: {}", self.name, result);
                Ok(result)
            }
            None => Ok(self.value.is_none()),
        }
    }

    /// Whether any current dependency value differs from the snapshot
    ///
    /// `current` holds the dependency values in declared order.
    pub fn dependency_mismatch(&self, current: &[Option<Value>]) -> bool {
        self.dependency_names
            .iter()
            .zip(current)
            .any(|(dep, value)| {
                let recorded = self.dependency_build_info.get(dep).and_then(Option::as_ref);
                recorded != value.as_ref()
            })
    }

    /// Run the recipe and, on success, record the value and a fresh snapshot
    ///
    /// On failure the previous value and snapshot are kept.
    pub fn rebuild(&mut self, current: Vec<Option<Value>>) -> KilnResult<()> {
        let args: Vec<Value> = current
            .iter()
            .map(|value| value.clone().unwrap_or(Value::Null))
            .collect();

        info!("building {} with {}", self.name, format_args_list(&args));
        let result = (self.recipe)(&args).map_err(|e| KilnError::recipe(&self.name, e))?;

        self.value = normalize(Some(result));
        self.dependency_build_info = self
            .dependency_names
            .iter()
            .cloned()
            .zip(current)
            .collect();

        let built = self.value.as_ref().unwrap_or(&Value::Null);
        info!("finished building {} with result: {}", self.name, built);
        Ok(())
    }

    /// Persisted form of this target
    pub fn to_record(&self) -> TargetRecord {
        TargetRecord {
            value: self.value.clone(),
            dependency_build_info: self.dependency_build_info.clone(),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("dependency_names", &self.dependency_names)
            .field("value", &self.value)
            .field("dependency_build_info", &self.dependency_build_info)
            .field("has_outdate_predicate", &self.has_outdate_predicate())
            .finish()
    }
}

/// `null` is how absence is persisted, so it is absence in memory too
fn normalize(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

fn format_args_list(args: &[Value]) -> String {
    let parts: Vec<String> = args.iter().map(Value::to_string).collect();
    format!("[{}]", parts.join(", "))
}
