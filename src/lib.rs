//! Routine planner core: recurrence resolution, edit/delete eligibility,
//! validation and whole-collection persistence.
//!
//! The terminal front end in `main.rs` is a thin adapter over this crate.

pub mod config;
pub mod error;
pub mod logging;
pub mod routine;

pub use config::Config;
pub use error::{MutationNotPermitted, RoutineError, RoutineResult, StoreError, ValidationError};
