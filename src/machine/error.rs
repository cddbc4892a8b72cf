//! Machine error types.

use crate::alloc::AllocationStrategy;
use crate::checkpoint::CheckpointError;
use crate::core::StateId;
use thiserror::Error;

/// Errors returned by [`StateMachine`](super::StateMachine) operations.
#[derive(Debug, Error)]
pub enum MachineError {
    /// `start` or `restore` on a machine that already holds a state
    #[error("Machine over '{set}' is already running in state '{state}'")]
    AlreadyRunning {
        set: &'static str,
        state: &'static str,
    },

    /// Operation needs a current state and there is none
    #[error("Machine over '{set}' has no current state")]
    NotRunning { set: &'static str },

    /// A hook or effect panicked; the machine needs `stop` or `reset`
    #[error("Machine over '{set}' was interrupted inside a hook or effect; stop or reset it")]
    Interrupted { set: &'static str },

    /// Current state is not the requested source
    #[error("Cannot transition from '{from}' to '{to}': machine is in '{current}'")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
        current: &'static str,
    },

    /// No transition is registered for the pair
    #[error("No transition from '{from}' to '{to}' is registered in '{set}'")]
    UnregisteredTransition {
        set: &'static str,
        from: &'static str,
        to: &'static str,
    },

    /// Identifier does not belong to any declared member
    #[error("State {id} is not declared in '{set}'")]
    UnknownState { set: &'static str, id: StateId },

    /// The allocator could not produce an instance
    #[error("The {strategy} allocator could not produce state '{state}' ({id})")]
    AllocationFailed {
        state: &'static str,
        id: StateId,
        strategy: AllocationStrategy,
    },

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

impl MachineError {
    /// Whether the failed request left the machine exactly as it was and
    /// ready for further use.
    ///
    /// Rejected requests are recoverable. Allocation failures, interrupted
    /// machines and checkpoint problems are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRunning { .. }
                | Self::NotRunning { .. }
                | Self::InvalidTransition { .. }
                | Self::UnregisteredTransition { .. }
                | Self::UnknownState { .. }
        )
    }
}
