//! Top-level error type for host operations.

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::registry::RegistryError;
use crate::types::Address;

/// Errors surfaced by [`ModularCore`](super::ModularCore) operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The caller may not manage extensions or roles on this host.
    #[error("caller {0} is not authorized for this operation")]
    Unauthorized(Address),

    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A dispatch operation failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Result type for host operations.
pub type CoreResult<T> = Result<T, CoreError>;
