//! Stator: a finite state machine engine for embedding
//!
//! The set of states and the legal transitions between them are fixed at
//! build time. Requesting a transition that was never registered does not
//! compile; requesting one from the wrong current state fails without
//! running a single hook.
//!
//! # Core Concepts
//!
//! - **State**: a type with entry and exit hooks, via the `State` trait
//! - **State set**: the closed list of states a machine may use, declared with `state_set!`
//! - **Transition**: an effect registered for an ordered pair of states with `transition!`
//! - **Allocation strategy**: how instances are obtained (lazy, external pool, internal pool)
//! - **Hand-off**: moving the current state between machines with `save` and `load`
//!
//! # Example
//!
//! ```rust
//! use stator::core::State;
//! use stator::machine::LazyMachine;
//! use stator::{state_set, transition};
//!
//! #[derive(Default)]
//! struct Log(Vec<&'static str>);
//!
//! #[derive(Default)]
//! struct Queued;
//! #[derive(Default)]
//! struct Running;
//! #[derive(Default)]
//! struct Finished;
//!
//! impl State<Log> for Queued {
//!     fn on_enter(&self, log: &mut Log) { log.0.push("queued"); }
//!     fn on_exit(&self, _: &mut Log) {}
//! }
//!
//! impl State<Log> for Running {
//!     fn on_enter(&self, log: &mut Log) { log.0.push("running"); }
//!     fn on_exit(&self, _: &mut Log) {}
//! }
//!
//! impl State<Log> for Finished {
//!     fn on_enter(&self, log: &mut Log) { log.0.push("finished"); }
//!     fn on_exit(&self, _: &mut Log) {}
//! }
//!
//! transition!(Queued => Running for Log, |log| log.0.push("dispatch"));
//! transition!(Running => Finished for Log);
//!
//! state_set! {
//!     struct Job: Log {
//!         Queued,
//!         Running,
//!         Finished,
//!     }
//! }
//!
//! let mut log = Log::default();
//! let mut machine = LazyMachine::<Job>::lazy();
//!
//! machine.start::<Queued>(&mut log).unwrap();
//! machine.transition::<Queued, Running>(&mut log).unwrap();
//! machine.transition::<Running, Finished>(&mut log).unwrap();
//! machine.stop(&mut log);
//!
//! assert_eq!(log.0, vec!["queued", "dispatch", "running", "finished"]);
//! ```

pub mod alloc;
pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use alloc::{AllocationStrategy, Allocator, ExternalPool, InternalPool, Lazy, SharedPool};
pub use builder::{BuildError, MachineConfig, StateMachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{Member, State, StateId, StateSet, Transition};
pub use machine::{HandoffBuffer, Lifecycle, MachineError, StateMachine};
