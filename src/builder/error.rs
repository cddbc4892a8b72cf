//! Build errors for the machine builder.

use crate::alloc::PoolError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("External pool strategy selected but no pool supplied. Call .external(slots) before .build()")]
    MissingExternalPool,

    #[error("Internal pool strategy selected but no shared pool supplied. Call .internal(pool) before .build()")]
    MissingSharedPool,

    #[error("External pool rejected: {0}")]
    InvalidPool(#[from] PoolError),

    #[error("Invalid machine configuration: {0}")]
    InvalidConfig(String),
}
