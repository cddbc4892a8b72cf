//! Errors raised while saving or restoring a machine checkpoint.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Writing the checkpoint in `format` failed.
    #[error("Could not encode checkpoint as {format}: {reason}")]
    Encode { format: &'static str, reason: String },

    /// The input is not a checkpoint in `format`.
    #[error("Could not decode {format} checkpoint: {reason}")]
    Decode { format: &'static str, reason: String },

    #[error("Checkpoint format version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The recorded state is not a member of `set` as declared now.
    #[error("Checkpoint does not match set '{set}': {reason}")]
    Mismatch { set: &'static str, reason: String },
}
