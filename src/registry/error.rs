//! Error types for the extension registry.

use thiserror::Error;

use crate::extension::render_revert;
use crate::types::{Address, InterfaceId, Selector};

/// Errors that can occur during install, uninstall, and update operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The implementation is already installed on this host.
    #[error("extension {0} is already installed")]
    AlreadyInstalled(Address),

    /// The implementation is not installed on this host.
    #[error("extension {0} is not installed")]
    NotInstalled(Address),

    /// Another installed extension already owns the callback selector.
    #[error("callback function {0} is already installed")]
    CallbackAlreadyInstalled(Selector),

    /// The callback selector is not part of the host's static manifest
    /// (strict validation only).
    #[error("callback function {0} is not supported by this host")]
    CallbackFunctionNotSupported(Selector),

    /// Another installed extension already owns the routed-function selector.
    #[error("fallback function {0} is already installed")]
    FunctionAlreadyInstalled(Selector),

    /// The extension requires an interface no installed extension grants.
    #[error("required interface {0} is not supported by this host")]
    InterfaceNotCompatible(InterfaceId),

    /// The host uses the deterministic identity scheme; swap implementations
    /// with an explicit uninstall followed by an install.
    #[error("extension update is not supported by this host")]
    UpdateNotSupported,

    /// An install/uninstall lifecycle hook reverted. Carries the extension's
    /// original revert payload when one was provided.
    #[error("installation callback reverted{}", render_revert(.data))]
    CallbackExecutionReverted {
        /// Raw revert payload from the extension; empty when the hook failed
        /// without one.
        data: Vec<u8>,
    },

    /// The interface reference counter would go negative: the extension's
    /// config changed between install and uninstall, violating the
    /// config-purity contract.
    #[error("interface counter underflow for {0}: extension config changed between install and uninstall")]
    InterfaceCounterUnderflow(InterfaceId),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
