//! State capability and declared state sets.
//!
//! A state is a unit of behavior with entry and exit hooks. States are
//! grouped into a closed [`StateSet`]; only members of the set can be
//! started, transitioned to or pooled by a machine over that set.

use super::ids::{StateId, StateIds};
use super::transition::TransitionEdge;
use std::any::{Any, TypeId};
use std::fmt;

/// Upcast helper so `dyn State` objects can be downcast to their
/// concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Trait for state machine states.
///
/// Hooks are invoked by the engine only, never by the state itself. They
/// receive the caller-owned context for the duration of the call and must
/// not retain it. Hooks are expected not to block.
///
/// # Example
///
/// ```rust
/// use stator::core::State;
///
/// struct Counters {
///     entered: usize,
///     exited: usize,
/// }
///
/// #[derive(Default)]
/// struct Idle;
///
/// impl State<Counters> for Idle {
///     fn on_enter(&self, ctx: &mut Counters) {
///         ctx.entered += 1;
///     }
///
///     fn on_exit(&self, ctx: &mut Counters) {
///         ctx.exited += 1;
///     }
/// }
///
/// let mut ctx = Counters { entered: 0, exited: 0 };
/// Idle.on_enter(&mut ctx);
/// assert_eq!(ctx.entered, 1);
/// assert_eq!(Idle.name(), "Idle");
/// ```
pub trait State<Ctx>: AsAny + Send + Sync {
    /// Called when the machine enters this state.
    fn on_enter(&self, ctx: &mut Ctx);

    /// Called when the machine leaves this state.
    fn on_exit(&self, ctx: &mut Ctx);

    /// Name for display and logging.
    ///
    /// Default implementation returns the unqualified type name.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

impl<Ctx: 'static> dyn State<Ctx> {
    /// Whether the concrete type behind this object is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// View this object as its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Catalog entry describing one declared member of a [`StateSet`].
pub struct StateInfo<Ctx> {
    name: &'static str,
    type_id: TypeId,
    construct: fn() -> Box<dyn State<Ctx>>,
}

impl<Ctx: 'static> StateInfo<Ctx> {
    /// Describe member `T` of set `S`.
    pub fn of<S, T>(name: &'static str) -> Self
    where
        S: StateSet<Context = Ctx>,
        T: Member<S>,
    {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            construct: construct_boxed::<S, T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Build a fresh instance of the described type.
    pub fn construct(&self) -> Box<dyn State<Ctx>> {
        (self.construct)()
    }
}

fn construct_boxed<S, T>() -> Box<dyn State<S::Context>>
where
    S: StateSet,
    T: Member<S>,
{
    Box::new(T::construct())
}

impl<Ctx> Clone for StateInfo<Ctx> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Ctx> Copy for StateInfo<Ctx> {}

impl<Ctx> fmt::Debug for StateInfo<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateInfo")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .finish()
    }
}

/// A closed, declared list of state types sharing one context type.
///
/// Usually implemented through the [`state_set!`](crate::state_set)
/// macro, which also implements [`Member`] for every listed type and
/// keeps the identifier table, catalog and transition table in
/// process-wide `OnceLock`s.
pub trait StateSet: Sized + 'static {
    /// Caller-owned value passed to every hook and effect.
    type Context: 'static;

    /// Name of the set, recorded in checkpoints.
    const NAME: &'static str;

    /// Identifier table, generated on first reference.
    fn ids() -> &'static StateIds;

    /// Members in declaration order.
    fn catalog() -> &'static [StateInfo<Self::Context>];

    /// Transitions available to id-based dispatch.
    fn transitions() -> &'static [TransitionEdge<Self::Context>] {
        &[]
    }

    /// Number of declared members.
    fn len() -> usize {
        Self::catalog().len()
    }

    /// Catalog entry for the member holding `id`.
    fn info(id: StateId) -> Option<&'static StateInfo<Self::Context>> {
        Self::ids()
            .position(id)
            .and_then(|position| Self::catalog().get(position))
    }

    /// Whether `id` belongs to a declared member.
    fn contains(id: StateId) -> bool {
        Self::info(id).is_some()
    }

    fn name_of(id: StateId) -> &'static str {
        Self::info(id).map_or("<undeclared>", |info| info.name())
    }

    fn find_transition(from: StateId, to: StateId) -> Option<&'static TransitionEdge<Self::Context>> {
        Self::transitions()
            .iter()
            .find(|edge| edge.from() == from && edge.to() == to)
    }

    /// Existence flag of the `(from, to)` registration.
    fn has_transition(from: StateId, to: StateId) -> bool {
        Self::find_transition(from, to).is_some()
    }
}

/// Declared member of state set `S`.
///
/// The trait bound is what rejects undeclared types at compile time: every
/// typed machine operation requires `T: Member<S>`.
pub trait Member<S: StateSet>: State<S::Context> + Sized {
    /// Position of this type in the set's declaration list.
    const POSITION: usize;

    /// Build an instance for lazy and internally pooled allocation.
    fn construct() -> Self;

    /// Identifier of this type within `S`.
    fn state_id() -> StateId {
        S::ids()
            .id_at(Self::POSITION)
            .unwrap_or(StateId::new(usize::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        events: Vec<&'static str>,
    }

    #[derive(Default)]
    struct Open;

    impl State<Log> for Open {
        fn on_enter(&self, ctx: &mut Log) {
            ctx.events.push("enter open");
        }

        fn on_exit(&self, ctx: &mut Log) {
            ctx.events.push("exit open");
        }
    }

    #[derive(Default)]
    struct Closed;

    impl State<Log> for Closed {
        fn on_enter(&self, ctx: &mut Log) {
            ctx.events.push("enter closed");
        }

        fn on_exit(&self, ctx: &mut Log) {
            ctx.events.push("exit closed");
        }

        fn name(&self) -> &'static str {
            "closed"
        }
    }

    crate::state_set! {
        struct Door: Log {
            Open,
            Closed,
        }
    }

    #[test]
    fn default_name_is_unqualified_type_name() {
        assert_eq!(Open.name(), "Open");
        assert_eq!(Closed.name(), "closed");
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name("a::b::Thing"), "Thing");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn dyn_state_downcasts_to_concrete_type() {
        let boxed: Box<dyn State<Log>> = Box::new(Open);
        assert!(boxed.is::<Open>());
        assert!(!boxed.is::<Closed>());
        assert!(boxed.downcast_ref::<Open>().is_some());
        assert!(boxed.downcast_ref::<Closed>().is_none());
    }

    #[test]
    fn hooks_mutate_context() {
        let mut log = Log::default();
        Open.on_enter(&mut log);
        Open.on_exit(&mut log);
        assert_eq!(log.events, vec!["enter open", "exit open"]);
    }

    #[test]
    fn members_receive_declaration_positions() {
        assert_eq!(<Open as Member<Door>>::POSITION, 0);
        assert_eq!(<Closed as Member<Door>>::POSITION, 1);
        assert_eq!(Door::len(), 2);
    }

    #[test]
    fn catalog_constructs_each_member() {
        let catalog = Door::catalog();
        assert_eq!(catalog[0].name(), "Open");
        assert_eq!(catalog[1].name(), "Closed");
        assert!(catalog[0].construct().is::<Open>());
        assert!(catalog[1].construct().is::<Closed>());
        assert_eq!(catalog[1].type_id(), TypeId::of::<Closed>());
    }

    #[test]
    fn ids_are_dense_and_resolvable() {
        let open = <Open as Member<Door>>::state_id();
        let closed = <Closed as Member<Door>>::state_id();

        assert_eq!(open.index(), 0);
        assert_eq!(closed.index(), 1);
        assert_eq!(Door::name_of(closed), "Closed");
        assert!(Door::contains(open));
        assert!(!Door::contains(StateId::new(9)));
        assert_eq!(Door::name_of(StateId::new(9)), "<undeclared>");
    }

    #[test]
    fn set_without_transitions_reports_none() {
        let open = <Open as Member<Door>>::state_id();
        let closed = <Closed as Member<Door>>::state_id();
        assert!(!Door::has_transition(open, closed));
    }
}
