//! Builder API for ergonomic state machine construction.
//!
//! This module provides the declaration macros ([`state_set!`] and
//! [`transition!`]) and a fluent builder that picks the allocation
//! strategy from code or from a serialized [`MachineConfig`].
//!
//! [`state_set!`]: crate::state_set
//! [`transition!`]: crate::transition

pub mod config;
pub mod error;
pub mod machine;
pub mod macros;

pub use config::MachineConfig;
pub use error::BuildError;
pub use machine::StateMachineBuilder;
