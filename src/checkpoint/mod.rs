//! Portable checkpoints of a running machine.
//!
//! `save`/`load` hand a live state instance from one machine to another
//! inside a single process. A [`Checkpoint`] instead records *which* state
//! a machine is in as plain data, so it can be written to disk or sent
//! over the wire and restored after a process restart. Restoring builds a
//! fresh instance through the receiving machine's allocator and does not
//! run its entry hook.

use crate::alloc::AllocationStrategy;
use crate::core::{StateId, StateSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable record of a machine's current state.
///
/// Does NOT include state instance data or the context: states are
/// rebuilt from their declared constructors on restore.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the declared state set
    pub set: String,

    /// Identifier of the current state within the set
    pub state_id: StateId,

    /// Declared name of the current state
    pub state_name: String,

    /// Allocation strategy of the machine that was checkpointed
    pub strategy: AllocationStrategy,
}

impl Checkpoint {
    pub(crate) fn capture<S: StateSet>(state_id: StateId, strategy: AllocationStrategy) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            set: S::NAME.to_string(),
            state_id,
            state_name: S::name_of(state_id).to_string(),
            strategy,
        }
    }

    /// Check that this checkpoint can be restored into a machine over `S`.
    ///
    /// The version is checked first. Set name, identifier and state name
    /// are then checked together and every mismatch is reported.
    pub fn validate<S: StateSet>(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let set_check: Validation<(), NonEmptyVec<String>> = if self.set == S::NAME {
            Validation::success(())
        } else {
            Validation::fail(format!(
                "checkpoint is for set '{}', not '{}'",
                self.set,
                S::NAME
            ))
        };

        let state_check: Validation<(), NonEmptyVec<String>> = match S::info(self.state_id) {
            None => Validation::fail(format!(
                "state {} is not declared in '{}'",
                self.state_id,
                S::NAME
            )),
            Some(info) if info.name() != self.state_name => Validation::fail(format!(
                "state {} is '{}' in '{}', checkpoint says '{}'",
                self.state_id,
                info.name(),
                S::NAME,
                self.state_name
            )),
            Some(_) => Validation::success(()),
        };

        match Validation::all_vec(vec![set_check, state_check]) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(problems) => Err(CheckpointError::Mismatch {
                set: S::NAME,
                reason: problems.iter().cloned().collect::<Vec<_>>().join("; "),
            }),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::Encode {
            format: "json",
            reason: e.to_string(),
        })
    }

    /// Deserialize from JSON, rejecting unsupported versions.
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json).map_err(|e| CheckpointError::Decode {
            format: "json",
            reason: e.to_string(),
        })?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    /// Serialize to a compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode {
            format: "bincode",
            reason: e.to_string(),
        })
    }

    /// Deserialize from the binary form, rejecting unsupported versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes).map_err(|e| CheckpointError::Decode {
            format: "bincode",
            reason: e.to_string(),
        })?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version == CHECKPOINT_VERSION {
            Ok(())
        } else {
            Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        }
    }
}
