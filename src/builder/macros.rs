//! Macros for declaring state sets and transitions.

/// Declare a closed state set.
///
/// Generates a unit marker type implementing
/// [`StateSet`](crate::core::StateSet), and implements
/// [`Member`](crate::core::Member) for every listed type. Members must be
/// plain identifiers, implement [`State`](crate::core::State) over the
/// context type, and implement `Default`.
///
/// Identifiers are drawn from a private counter the first time the set is
/// referenced, in declaration order. `ids = PATH` draws them from a shared
/// [`IdAllocator`](crate::core::IdAllocator) instead.
///
/// The optional `transitions` list mirrors registered pairs into the
/// runtime table used by `transition_by_id`; each listed pair must have a
/// [`Transition`](crate::core::Transition) impl.
///
/// # Example
///
/// ```
/// use stator::core::{Member, State, StateSet};
/// use stator::{state_set, transition};
///
/// #[derive(Default)]
/// struct Idle;
/// #[derive(Default)]
/// struct Busy;
///
/// impl State<()> for Idle {
///     fn on_enter(&self, _: &mut ()) {}
///     fn on_exit(&self, _: &mut ()) {}
/// }
///
/// impl State<()> for Busy {
///     fn on_enter(&self, _: &mut ()) {}
///     fn on_exit(&self, _: &mut ()) {}
/// }
///
/// transition!(Idle => Busy for ());
///
/// state_set! {
///     pub struct Worker: () {
///         Idle,
///         Busy,
///     }
///     transitions {
///         Idle => Busy,
///     }
/// }
///
/// assert_eq!(Worker::len(), 2);
/// assert!(Worker::has_transition(
///     <Idle as Member<Worker>>::state_id(),
///     <Busy as Member<Worker>>::state_id(),
/// ));
/// ```
#[macro_export]
macro_rules! state_set {
    (@allocator) => {{
        static ALLOCATOR: $crate::core::IdAllocator = $crate::core::IdAllocator::new();
        &ALLOCATOR
    }};
    (@allocator $alloc:path) => {
        &$alloc
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $ctx:ty $(, ids = $alloc:path)? {
            $($member:ident),+ $(,)?
        }
        $(transitions {
            $($from:ident => $to:ident),* $(,)?
        })?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        const _: () = {
            #[allow(non_camel_case_types, dead_code)]
            enum Position {
                $($member),+
            }

            impl $crate::core::StateSet for $name {
                type Context = $ctx;

                const NAME: &'static str = stringify!($name);

                fn ids() -> &'static $crate::core::StateIds {
                    static IDS: ::std::sync::OnceLock<$crate::core::StateIds> =
                        ::std::sync::OnceLock::new();
                    IDS.get_or_init(|| {
                        $crate::core::StateIds::generate(
                            $crate::state_set!(@allocator $($alloc)?),
                            [$(stringify!($member)),+].len(),
                        )
                    })
                }

                fn catalog() -> &'static [$crate::core::StateInfo<$ctx>] {
                    static CATALOG: ::std::sync::OnceLock<::std::vec::Vec<$crate::core::StateInfo<$ctx>>> =
                        ::std::sync::OnceLock::new();
                    CATALOG.get_or_init(|| {
                        ::std::vec![
                            $($crate::core::StateInfo::of::<$name, $member>(stringify!($member))),+
                        ]
                    })
                }

                fn transitions() -> &'static [$crate::core::TransitionEdge<$ctx>] {
                    static EDGES: ::std::sync::OnceLock<::std::vec::Vec<$crate::core::TransitionEdge<$ctx>>> =
                        ::std::sync::OnceLock::new();
                    EDGES.get_or_init(|| {
                        ::std::vec![
                            $($($crate::core::TransitionEdge::of::<$name, $from, $to>()),*)?
                        ]
                    })
                }
            }

            $(
                impl $crate::core::Member<$name> for $member {
                    const POSITION: usize = Position::$member as usize;

                    fn construct() -> Self {
                        <Self as ::std::default::Default>::default()
                    }
                }
            )+
        };
    };
}

/// Register the effect of a transition.
///
/// `transition!(A => B for Ctx)` registers the pair with an empty effect;
/// `transition!(A => B for Ctx, |ctx| ...)` runs the closure, which must
/// not capture anything.
///
/// # Example
///
/// ```
/// use stator::core::{State, Transition};
/// use stator::transition;
///
/// #[derive(Default)]
/// struct Red;
/// #[derive(Default)]
/// struct Green;
///
/// impl State<Vec<&'static str>> for Red {
///     fn on_enter(&self, _: &mut Vec<&'static str>) {}
///     fn on_exit(&self, _: &mut Vec<&'static str>) {}
/// }
///
/// impl State<Vec<&'static str>> for Green {
///     fn on_enter(&self, _: &mut Vec<&'static str>) {}
///     fn on_exit(&self, _: &mut Vec<&'static str>) {}
/// }
///
/// transition!(Red => Green for Vec<&'static str>, |log| log.push("go"));
///
/// let mut log = Vec::new();
/// <Red as Transition<Green, _>>::on_transition(&mut log);
/// assert_eq!(log, vec!["go"]);
/// ```
#[macro_export]
macro_rules! transition {
    ($from:ident => $to:ident for $ctx:ty) => {
        impl $crate::core::Transition<$to, $ctx> for $from {
            fn on_transition(_: &mut $ctx) {}
        }
    };
    ($from:ident => $to:ident for $ctx:ty, $effect:expr) => {
        impl $crate::core::Transition<$to, $ctx> for $from {
            fn on_transition(ctx: &mut $ctx) {
                let effect: fn(&mut $ctx) = $effect;
                effect(ctx)
            }
        }
    };
}
