//! Events emitted by the host.

use serde::{Deserialize, Serialize};

use crate::types::{Address, ExtensionId};

/// One observable state change of the host.
///
/// Events accumulate in an in-memory log readable through
/// [`ModularCore::events`](super::ModularCore::events) and are mirrored as
/// `tracing` structured events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoreEvent {
    /// An extension was installed.
    ExtensionInstalled {
        /// Account that performed the install.
        caller: Address,

        /// Installed implementation address.
        implementation: Address,

        /// Identity of the extension's proxy.
        proxy: ExtensionId,
    },

    /// An extension was uninstalled.
    ExtensionUninstalled {
        /// Account that performed the uninstall.
        caller: Address,

        /// Uninstalled implementation address.
        implementation: Address,

        /// Identity of the extension's proxy.
        proxy: ExtensionId,
    },

    /// An installed extension's implementation was swapped in place.
    ExtensionUpdated {
        /// Account that performed the update.
        caller: Address,

        /// Implementation address before the update.
        previous_implementation: Address,

        /// Implementation address after the update.
        implementation: Address,

        /// Identity of the extension's proxy (unchanged by the update).
        proxy: ExtensionId,
    },

    /// An account's role bitmask changed.
    RolesUpdated {
        /// Affected account.
        account: Address,

        /// The account's full role bitmask after the change.
        roles: u64,
    },
}
