//! Script-backed resources.
//!
//! # Submodules
//!
//! - [`lifecycle`] - The engine that runs create, read, update and delete
//! - [`transition`] - Plans what reconciliation has to do
//! - `types` - Configuration, persisted records and errors

pub mod lifecycle;
pub mod transition;
mod types;

pub use lifecycle::Lifecycle;
pub use transition::{Step, Transition, plan_transition, update_steps};
pub use types::{
  DataSourceConfig, LifecycleCommands, LifecycleError, ReadOutcome, ResourceConfig, ResourceRecord, ResourceState,
};
