//! Error types for the dispatch engine.

use thiserror::Error;

use crate::extension::render_revert;
use crate::types::{Address, Selector};

/// Errors that can occur while routing calls or triggering callbacks.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No installed extension owns the function selector.
    #[error("no installed extension owns function {0}")]
    FunctionNotInstalled(Selector),

    /// The caller lacks the role bits the routed function requires.
    #[error("caller {caller} is not authorized to call function {selector}")]
    UnauthorizedFunctionCall {
        /// The routed function.
        selector: Selector,

        /// The rejected caller.
        caller: Address,
    },

    /// A callback the host declares as required has no owning extension.
    #[error("required callback {0} has no installed extension")]
    CallbackFunctionRequired(Selector),

    /// The extension's code reverted; the payload passes through verbatim.
    #[error("extension call reverted{}", render_revert(.data))]
    ExecutionReverted {
        /// Raw revert payload from the extension; may be empty.
        data: Vec<u8>,
    },
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
