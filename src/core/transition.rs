//! Transition registry.
//!
//! A transition is a static fact keyed by the ordered pair of source and
//! target state types. Registering one means implementing [`Transition`]
//! on the source type; a pair without an impl cannot be requested through
//! the typed machine API at all. Sets can additionally list their edges so
//! a host can dispatch transitions from runtime identifiers.

use super::ids::StateId;
use super::state::{Member, StateSet};
use std::fmt;

/// Effect run when moving from `Self` to `To`.
///
/// The effect runs exactly once per successful transition, after the
/// source's exit hook and before the target's entry hook. Panics raised
/// inside it are not caught by the engine.
///
/// # Example
///
/// ```rust
/// use stator::core::{State, Transition};
///
/// #[derive(Default)]
/// struct Locked;
/// #[derive(Default)]
/// struct Unlocked;
///
/// impl State<u32> for Locked {
///     fn on_enter(&self, _: &mut u32) {}
///     fn on_exit(&self, _: &mut u32) {}
/// }
///
/// impl State<u32> for Unlocked {
///     fn on_enter(&self, _: &mut u32) {}
///     fn on_exit(&self, _: &mut u32) {}
/// }
///
/// impl Transition<Unlocked, u32> for Locked {
///     fn on_transition(coins: &mut u32) {
///         *coins += 1;
///     }
/// }
///
/// let mut coins = 0;
/// <Locked as Transition<Unlocked, u32>>::on_transition(&mut coins);
/// assert_eq!(coins, 1);
/// ```
pub trait Transition<To, Ctx> {
    fn on_transition(ctx: &mut Ctx);
}

/// Runtime record of a registered transition.
pub struct TransitionEdge<Ctx> {
    from: StateId,
    to: StateId,
    from_name: &'static str,
    to_name: &'static str,
    effect: fn(&mut Ctx),
}

impl<Ctx: 'static> TransitionEdge<Ctx> {
    /// Record the `From -> To` registration of set `S`.
    ///
    /// Only compiles when `From` implements `Transition<To, _>`.
    pub fn of<S, From, To>() -> Self
    where
        S: StateSet<Context = Ctx>,
        From: Member<S> + Transition<To, Ctx>,
        To: Member<S>,
    {
        let from = From::state_id();
        let to = To::state_id();
        Self {
            from,
            to,
            from_name: S::name_of(from),
            to_name: S::name_of(to),
            effect: <From as Transition<To, Ctx>>::on_transition,
        }
    }
}

impl<Ctx> TransitionEdge<Ctx> {
    pub fn from(&self) -> StateId {
        self.from
    }

    pub fn to(&self) -> StateId {
        self.to
    }

    pub fn from_name(&self) -> &'static str {
        self.from_name
    }

    pub fn to_name(&self) -> &'static str {
        self.to_name
    }

    /// Run the registered effect.
    pub fn run(&self, ctx: &mut Ctx) {
        (self.effect)(ctx)
    }

    pub(crate) fn effect(&self) -> fn(&mut Ctx) {
        self.effect
    }
}

impl<Ctx> fmt::Debug for TransitionEdge<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEdge")
            .field("from", &self.from_name)
            .field("to", &self.to_name)
            .finish()
    }
}
