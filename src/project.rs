//! Top-level build entry point
//!
//! A `Project` owns the registry and the state store for one process. State
//! is loaded once when the project is opened and saved once after each
//! successful build.

use crate::build::{BuildReport, Orchestrator, Propagation};
use crate::error::{BoxError, KilnResult};
use crate::registry::{Registry, TargetHandle};
use crate::state::StateStore;
use serde_json::Value;
use tracing::info;

/// Registered targets plus the state file they persist to
pub struct Project {
    store: StateStore,
    registry: Registry,
    propagation: Propagation,
}

impl Project {
    /// Open a project, loading prior state from `store`
    pub fn open(store: StateStore) -> KilnResult<Self> {
        let prior = store.load()?;
        Ok(Self {
            store,
            registry: Registry::new(prior),
            propagation: Propagation::default(),
        })
    }

    /// Set how far builds look for staleness
    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    /// Register a recipe; see [`Registry::register`]
    pub fn target<F>(
        &mut self,
        identity: &str,
        dependency_names: &[&str],
        recipe: F,
    ) -> KilnResult<TargetHandle>
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + 'static,
    {
        let dependency_names = dependency_names.iter().map(|n| n.to_string()).collect();
        self.registry
            .register(identity, dependency_names, Box::new(recipe))
    }

    /// Attach an outdate predicate; see [`Registry::register_outdate_predicate`]
    pub fn outdate<F>(&mut self, identity: &str, predicate: F) -> KilnResult<()>
    where
        F: Fn() -> Result<bool, BoxError> + 'static,
    {
        self.registry
            .register_outdate_predicate(identity, Box::new(predicate))
    }

    /// Build `name` and its stale dependencies, then persist every target
    ///
    /// Nothing is persisted when the build fails.
    pub fn build(&mut self, name: &str) -> KilnResult<BuildReport> {
        self.registry.lookup(name)?;

        let mut orchestrator = Orchestrator::with_propagation(&mut self.registry, self.propagation);
        orchestrator.build_target(name)?;
        let report = orchestrator.finish();

        self.store.save(&self.registry)?;
        info!(
            "{} finished, {} recipe run(s)",
            name,
            report.rebuilt().len()
        );
        Ok(report)
    }

    /// Registered targets
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the registry for direct registration
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Backing state store
    pub fn store(&self) -> &StateStore {
        &self.store
    }
}

impl TargetHandle {
    /// Build the target this handle names
    pub fn build(&self, project: &mut Project) -> KilnResult<BuildReport> {
        project.build(self.name())
    }
}
