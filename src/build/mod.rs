//! Build orchestration
//!
//! Depth-first, post-order walk over a target's dependencies. Each target
//! decides for itself whether to rebuild: its own outdate check, or a
//! dependency value that differs from the snapshot taken at its last build.
//!
//! With [`Propagation::Direct`] a dependency is only visited when its own
//! outdate check fires, so a change deep in a chain reaches the requested
//! target one level per build. [`Propagation::Transitive`] visits every
//! dependency and carries changes through every level in one build.

mod report;

pub use report::BuildReport;

use crate::error::KilnResult;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// How far a single build looks for staleness below the requested target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Propagation {
    /// Descend into a dependency only when it is itself outdated
    #[default]
    Direct,
    /// Descend into every dependency
    Transitive,
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Transitive => write!(f, "transitive"),
        }
    }
}

/// Drives one build walk over a registry
pub struct Orchestrator<'r> {
    registry: &'r mut Registry,
    propagation: Propagation,
    report: BuildReport,
}

impl<'r> Orchestrator<'r> {
    /// Create an orchestrator with direct propagation
    pub fn new(registry: &'r mut Registry) -> Self {
        Self::with_propagation(registry, Propagation::default())
    }

    /// Create an orchestrator with the given propagation mode
    pub fn with_propagation(registry: &'r mut Registry, propagation: Propagation) -> Self {
        Self {
            registry,
            propagation,
            report: BuildReport::default(),
        }
    }

    /// Bring `name` up to date, refreshing its dependencies first
    ///
    /// Recipe and predicate errors propagate immediately. Targets rebuilt
    /// before the failure keep their new values in memory.
    pub fn build_target(&mut self, name: &str) -> KilnResult<()> {
        let dependency_names = self.registry.lookup(name)?.dependency_names().to_vec();

        for dependency in &dependency_names {
            let descend = match self.propagation {
                Propagation::Direct => self.registry.lookup(dependency)?.is_outdated()?,
                Propagation::Transitive => true,
            };
            if descend {
                self.build_target(dependency)?;
            }
        }

        let current = self.current_values(&dependency_names)?;
        let target = self.registry.lookup(name)?;
        let rebuild = target.is_outdated()? || target.dependency_mismatch(&current);

        if !rebuild {
            debug!("{} is up to date", name);
            return Ok(());
        }

        self.registry.lookup_mut(name)?.rebuild(current)?;
        self.report.record(name);
        Ok(())
    }

    /// Consume the orchestrator, returning what was rebuilt
    pub fn finish(self) -> BuildReport {
        self.report
    }

    fn current_values(&self, names: &[String]) -> KilnResult<Vec<Option<Value>>> {
        names
            .iter()
            .map(|name| Ok(self.registry.lookup(name)?.value().cloned()))
            .collect()
    }
}
