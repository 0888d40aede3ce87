//! Kiln - minimal incremental build orchestrator
//!
//! Targets are produced by recipes that consume the current values of other
//! targets. Values are memoized in a state file between runs; a target is
//! rebuilt when it has no value, when its outdate predicate fires, or when a
//! dependency's value differs from the one it was last built against.
//!
//! ```no_run
//! use kiln::{Project, StateStore};
//! use serde_json::json;
//!
//! let mut project = Project::open(StateStore::new("state.json"))?;
//! project.target("build_image", &[], |_| Ok(json!("id-42")))?;
//! project.outdate("outdate_image", || Ok(true))?;
//! let container = project.target("build_container", &["image"], |deps| {
//!     Ok(json!(format!("container-of-{}", deps[0])))
//! })?;
//! container.build(&mut project)?;
//! # Ok::<(), kiln::KilnError>(())
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod project;
pub mod recipe;
pub mod registry;
pub mod state;
pub mod target;

pub use build::{BuildReport, Orchestrator, Propagation};
pub use error::{BoxError, KilnError, KilnResult};
pub use project::Project;
pub use registry::{Registry, TargetHandle};
pub use state::{PersistedState, StateStore, TargetRecord};
pub use target::Target;
