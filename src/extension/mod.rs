//! Extension capability surface.
//!
//! An extension is a pluggable module that provides lifecycle-callback
//! participation and/or externally routed functions to a host contract.
//! Extensions are polymorphic over exactly one capability: a pure
//! [`ExtensionContract::extension_config`] describing what they plug into
//! the host. The registry never inspects concrete extension types.
//!
//! # Config purity
//!
//! The registry re-fetches the config at both install and uninstall time and
//! uses the *value* to clean up its tables. An extension whose config differs
//! between the two calls can underflow the interface reference counter or
//! leave selectors dangling; config stability across an extension's installed
//! lifetime is a caller obligation, not something the registry enforces.

mod config;
mod context;

pub use config::{CallType, CallbackFunction, ExtensionConfig, FallbackFunction};
pub use context::{CallContext, Revert, Storage};

pub(crate) use context::render_revert;

#[cfg(test)]
pub(crate) mod testing;

/// The capability interface an extension must implement to be installable.
pub trait ExtensionContract: Send + Sync {
    /// Describe what this extension plugs into the host.
    ///
    /// Must be pure: no side effects, and identical between the install-time
    /// and uninstall-time fetch.
    fn extension_config(&self) -> ExtensionConfig;

    /// Install lifecycle hook.
    ///
    /// Invoked by the registry as the last step of install, only when the
    /// config sets `register_installation_callback`. Runs against the
    /// extension proxy's storage and receives the installer's opaque data.
    fn on_install(&self, _ctx: &mut CallContext<'_>, _data: &[u8]) -> Result<(), Revert> {
        Ok(())
    }

    /// Uninstall lifecycle hook; mirror of [`on_install`](Self::on_install).
    fn on_uninstall(&self, _ctx: &mut CallContext<'_>, _data: &[u8]) -> Result<(), Revert> {
        Ok(())
    }

    /// Entry point for routed functions and lifecycle callbacks.
    ///
    /// The dispatcher passes the selector and raw input payload unchanged and
    /// forwards the returned bytes (or the revert payload) verbatim.
    fn call(
        &self,
        ctx: &mut CallContext<'_>,
        selector: crate::types::Selector,
        input: &[u8],
    ) -> Result<Vec<u8>, Revert>;
}
