pub mod config;
pub mod domain;
pub mod error;
pub mod hashing;
pub mod infra;
pub mod planners;
pub mod policy;
pub mod state;

// Re-export commonly used types for convenience
pub use error::{PlanningError, Result};
pub use hashing::{HashableState, HashableStateFactory, StateHashFactory};
pub use planners::{Planner, QProvider, ValueFunction};
pub use state::OOState;
