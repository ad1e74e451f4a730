//! # modcore
//!
//! A modular smart-contract core: a host contract that delegates behavior
//! to installable extensions at runtime.
//!
//! The host keeps four pieces of bookkeeping: the set of installed
//! extensions, a routing table mapping function selectors to owning
//! extensions, a callback table mapping lifecycle hooks to the single
//! extension allowed to handle each, and reference counts for the
//! interfaces extensions claim to support. Unrecognized calls on the host
//! route through the fallback table with per-function permission bits;
//! lifecycle hooks the host triggers route through the callback table.
//!
//! Each extension executes behind a proxy with its own persistent storage,
//! so extension state survives uninstall and reinstall (and, on
//! upgradeable hosts, in-place implementation updates).
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use modcore::extension::{
//!     CallContext, CallType, ExtensionConfig, ExtensionContract, Revert,
//! };
//! use modcore::host::ModularCore;
//! use modcore::types::{Address, Selector};
//!
//! struct Greeter;
//!
//! impl ExtensionContract for Greeter {
//!     fn extension_config(&self) -> ExtensionConfig {
//!         ExtensionConfig::new().with_fallback(
//!             Selector::from_signature("greet()"),
//!             CallType::Call,
//!             0,
//!         )
//!     }
//!
//!     fn call(
//!         &self,
//!         _ctx: &mut CallContext<'_>,
//!         _selector: Selector,
//!         _input: &[u8],
//!     ) -> Result<Vec<u8>, Revert> {
//!         Ok(b"hello".to_vec())
//!     }
//! }
//!
//! let owner = Address::derive("owner");
//! let core = ModularCore::new(Address::derive("core"), owner, Vec::new());
//!
//! core.install_extension(owner, Address::derive("greeter"), Arc::new(Greeter), b"")
//!     .unwrap();
//!
//! let out = core
//!     .call(owner, Selector::from_signature("greet()"), b"")
//!     .unwrap();
//! assert_eq!(out, b"hello");
//! ```

#![warn(missing_docs)]

pub mod access;
pub mod dispatch;
pub mod extension;
pub mod host;
pub mod identity;
pub mod registry;
pub mod types;

/// Commonly used items, re-exported for convenience.
pub mod prelude {
    pub use crate::access::{AccessControl, ROLE_INSTALLER};
    pub use crate::dispatch::{DispatchError, DispatchResult};
    pub use crate::extension::{
        CallContext, CallType, CallbackFunction, ExtensionConfig, ExtensionContract,
        FallbackFunction, Revert, Storage,
    };
    pub use crate::host::{CoreConfig, CoreError, CoreEvent, CoreResult, ModularCore};
    pub use crate::identity::{ExtensionProxy, IdentityScheme};
    pub use crate::registry::{
        CallbackManifest, CallbackMode, CallbackValidation, ExtensionRegistry,
        InstalledExtension, RegistryError, RegistryResult, SupportedCallback,
    };
    pub use crate::types::{Address, ExtensionId, InterfaceId, Selector};
}
