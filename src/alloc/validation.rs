//! Validation of caller-supplied state pools.
//!
//! Uses Stillwater's `Validation` so that every problem with a pool is
//! reported at once instead of stopping at the first bad slot.

use crate::core::{State, StateSet};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single problem found in a pool.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolViolation {
    #[error("pool holds {found} slots but set '{set}' declares {expected} states")]
    LengthMismatch {
        set: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("state '{state}' has identifier {id} outside a pool of {len} slots")]
    IdOutOfRange {
        state: &'static str,
        id: usize,
        len: usize,
    },

    #[error("slot {index} holds '{found}' but set '{set}' expects '{expected}'")]
    WrongType {
        set: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Every violation found while validating a pool.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("state pool rejected with {} violation(s)", .violations.len())]
pub struct PoolError {
    pub violations: Vec<PoolViolation>,
}

/// Check `slots` against the declared members of `S`.
///
/// A valid pool has exactly one slot per member, and the slot at each
/// member's identifier holds an instance of that member's type.
pub fn validate_slots<S: StateSet>(
    slots: &[Arc<dyn State<S::Context>>],
) -> Validation<(), NonEmptyVec<PoolViolation>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<PoolViolation>>> = Vec::new();

    let expected = S::len();
    if slots.len() != expected {
        checks.push(Validation::fail(PoolViolation::LengthMismatch {
            set: S::NAME,
            expected,
            found: slots.len(),
        }));
    }

    for (position, info) in S::catalog().iter().enumerate() {
        let Some(id) = S::ids().id_at(position) else {
            continue;
        };

        let check = match slots.get(id.index()) {
            None => Validation::fail(PoolViolation::IdOutOfRange {
                state: info.name(),
                id: id.index(),
                len: slots.len(),
            }),
            Some(slot) if (**slot).as_any().type_id() != info.type_id() => {
                Validation::fail(PoolViolation::WrongType {
                    set: S::NAME,
                    index: id.index(),
                    expected: info.name(),
                    found: slot.name(),
                })
            }
            Some(_) => Validation::success(()),
        };
        checks.push(check);
    }

    Validation::all_vec(checks).map(|_| ())
}

impl PoolError {
    pub(crate) fn from_violations(violations: &NonEmptyVec<PoolViolation>) -> Self {
        Self {
            violations: violations.iter().cloned().collect(),
        }
    }
}
