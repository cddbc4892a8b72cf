//! Core engine types.
//!
//! This module contains the building blocks every machine is made of:
//! - The `State` capability and closed `StateSet` declarations
//! - The transition registry, checked at compile time
//! - Dense type identifiers used to index state pools
//!
//! Nothing here allocates state instances or drives hooks; that is the
//! job of the `alloc` and `machine` modules.

mod ids;
mod state;
mod transition;

pub use ids::{IdAllocator, StateId, StateIds};
pub use state::{AsAny, Member, State, StateInfo, StateSet};
pub use transition::{Transition, TransitionEdge};
