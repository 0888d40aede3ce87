//! Persisted build state
//!
//! One JSON file maps each target name to the value it last produced and the
//! dependency values it was built against. It is read once when a project is
//! opened and rewritten once after every successful build.

pub mod record;
pub mod store;

pub use record::{PersistedState, TargetRecord};
pub use store::StateStore;
