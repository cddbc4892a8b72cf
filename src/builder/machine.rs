//! Builder for constructing state machines.

use crate::alloc::{AllocationStrategy, Allocator, DynAllocator, ExternalPool, InternalPool, Lazy, SharedPool};
use crate::builder::config::MachineConfig;
use crate::builder::error::BuildError;
use crate::core::{State, StateSet};
use crate::machine::StateMachine;
use std::sync::Arc;
use tracing::debug;

/// Builder for machines whose allocation strategy is chosen at runtime.
///
/// Supply the resources each strategy needs and pick the strategy either
/// directly or through a [`MachineConfig`]; the last selection wins.
///
/// # Example
///
/// ```rust
/// use stator::alloc::{AllocationStrategy, SharedPool};
/// use stator::builder::{MachineConfig, StateMachineBuilder};
/// use stator::core::State;
/// use stator::state_set;
///
/// #[derive(Default)]
/// struct Waiting;
///
/// impl State<()> for Waiting {
///     fn on_enter(&self, _: &mut ()) {}
///     fn on_exit(&self, _: &mut ()) {}
/// }
///
/// state_set! {
///     struct Queue: () {
///         Waiting,
///     }
/// }
///
/// let config = MachineConfig::from_json(r#"{ "strategy": "internal_pool" }"#).unwrap();
/// let mut machine = StateMachineBuilder::<Queue>::new()
///     .internal(SharedPool::shared())
///     .config(config)
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.strategy(), AllocationStrategy::InternalPool);
/// machine.start::<Waiting>(&mut ()).unwrap();
/// ```
pub struct StateMachineBuilder<S: StateSet> {
    strategy: AllocationStrategy,
    external: Option<ExternalPool<S::Context>>,
    shared: Option<Arc<SharedPool<S>>>,
    validate_pool: bool,
}

impl<S: StateSet> StateMachineBuilder<S> {
    /// Create a new builder selecting lazy allocation.
    pub fn new() -> Self {
        let defaults = MachineConfig::default();
        Self {
            strategy: defaults.strategy,
            external: None,
            shared: None,
            validate_pool: defaults.validate_pool,
        }
    }

    /// Allocate a fresh instance per transition.
    pub fn lazy(mut self) -> Self {
        self.strategy = AllocationStrategy::Lazy;
        self
    }

    /// Read instances from caller-owned `slots`.
    pub fn external(mut self, slots: impl Into<Arc<[Arc<dyn State<S::Context>>]>>) -> Self {
        self.external = Some(ExternalPool::new(slots));
        self.strategy = AllocationStrategy::ExternalPool;
        self
    }

    /// Share the engine-built instances of `pool`.
    pub fn internal(mut self, pool: Arc<SharedPool<S>>) -> Self {
        self.shared = Some(pool);
        self.strategy = AllocationStrategy::InternalPool;
        self
    }

    /// Take strategy and validation settings from `config`.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.strategy = config.strategy;
        self.validate_pool = config.validate_pool;
        self
    }

    /// Whether an external pool is checked against the set on build.
    pub fn validate_pool(mut self, validate: bool) -> Self {
        self.validate_pool = validate;
        self
    }

    /// Build the state machine.
    /// Returns an error if the selected strategy lacks its pool, or the
    /// external pool fails validation.
    pub fn build(self) -> Result<StateMachine<S, DynAllocator<S>>, BuildError> {
        let allocator = match self.strategy {
            AllocationStrategy::Lazy => DynAllocator::Lazy(Lazy),
            AllocationStrategy::ExternalPool => {
                let pool = self.external.ok_or(BuildError::MissingExternalPool)?;
                let pool = if self.validate_pool {
                    ExternalPool::validated::<S>(Arc::clone(pool.slots()))?
                } else {
                    pool
                };
                DynAllocator::External(pool)
            }
            AllocationStrategy::InternalPool => {
                let shared = self.shared.ok_or(BuildError::MissingSharedPool)?;
                DynAllocator::Internal(InternalPool::new(shared))
            }
        };

        debug!(set = S::NAME, strategy = %allocator.strategy(), "state machine built");
        Ok(StateMachine::new(allocator))
    }
}

impl<S: StateSet> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
