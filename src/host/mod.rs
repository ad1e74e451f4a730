//! The modular host contract.
//!
//! [`ModularCore`] is the access-control gate wrapping install, uninstall,
//! and update, the catch-all entry point routing unrecognized calls to
//! installed extensions, and the introspection surface over the registry
//! state.
//!
//! All mutable state lives behind one `RwLock`; one write-lock acquisition
//! per operation is the transaction boundary, and external extension code
//! only ever runs after the registry tables for the operation have been
//! committed.

mod error;
mod events;

pub use error::{CoreError, CoreResult};
pub use events::CoreEvent;

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::access::{AccessControl, ROLE_INSTALLER};
use crate::dispatch;
use crate::extension::{ExtensionContract, Storage};
use crate::identity::IdentityScheme;
use crate::registry::{
    CallbackManifest, CallbackValidation, ExtensionRegistry, InstalledExtension,
    SupportedCallback,
};
use crate::types::{Address, ExtensionId, InterfaceId, Selector};

/// Construction parameters for a host with a non-default shape.
///
/// [`ModularCore::new`] and [`ModularCore::upgradeable`] cover the two
/// standard variants; use this for custom combinations such as an
/// upgradeable host with strict callback validation.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Address of the host itself.
    pub address: Address,

    /// Owner account.
    pub owner: Address,

    /// Static manifest of callbacks the host triggers.
    pub callbacks: Vec<SupportedCallback>,

    /// Install-time validation policy for callback claims.
    pub validation: CallbackValidation,

    /// Whether extensions get hash-chained identities and in-place updates.
    pub upgradeable: bool,
}

impl CoreConfig {
    /// Config for a non-upgradeable host with strict callback validation.
    pub fn new(address: Address, owner: Address) -> Self {
        CoreConfig {
            address,
            owner,
            callbacks: Vec::new(),
            validation: CallbackValidation::Strict,
            upgradeable: false,
        }
    }

    /// Declare a callback in the host manifest.
    pub fn with_callback(mut self, callback: SupportedCallback) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Set the callback validation policy.
    pub fn with_validation(mut self, validation: CallbackValidation) -> Self {
        self.validation = validation;
        self
    }

    /// Enable hash-chained identities and in-place updates.
    pub fn upgradeable(mut self) -> Self {
        self.upgradeable = true;
        self
    }
}

struct Inner {
    registry: ExtensionRegistry,
    storage: Storage,
    access: AccessControl,
    events: Vec<CoreEvent>,
}

/// A modular host: extension registry, call routing, and access gate.
///
/// Cloning shares the underlying state, mirroring the single on-chain
/// instance the host models.
#[derive(Clone)]
pub struct ModularCore {
    address: Address,
    inner: Arc<RwLock<Inner>>,
}

impl ModularCore {
    /// Create a non-upgradeable host.
    ///
    /// Extensions get deterministic identities (reinstalling an
    /// implementation reuses its proxy) and callback claims are validated
    /// strictly against the manifest.
    pub fn new(address: Address, owner: Address, callbacks: Vec<SupportedCallback>) -> Self {
        Self::from_config(CoreConfig {
            address,
            owner,
            callbacks,
            validation: CallbackValidation::Strict,
            upgradeable: false,
        })
    }

    /// Create an upgradeable host.
    ///
    /// Extensions get hash-chained identities, support in-place
    /// implementation updates, and callback claims are validated
    /// permissively.
    pub fn upgradeable(
        address: Address,
        owner: Address,
        callbacks: Vec<SupportedCallback>,
    ) -> Self {
        Self::from_config(CoreConfig {
            address,
            owner,
            callbacks,
            validation: CallbackValidation::Permissive,
            upgradeable: true,
        })
    }

    /// Create a host from explicit construction parameters.
    pub fn from_config(config: CoreConfig) -> Self {
        let scheme = if config.upgradeable {
            IdentityScheme::hash_chain(config.address)
        } else {
            IdentityScheme::deterministic()
        };
        let manifest = CallbackManifest::new(config.callbacks, config.validation);
        ModularCore {
            address: config.address,
            inner: Arc::new(RwLock::new(Inner {
                registry: ExtensionRegistry::new(config.address, scheme, manifest),
                storage: Storage::new(),
                access: AccessControl::new(config.owner),
                events: Vec::new(),
            })),
        }
    }

    /// Address of the host.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Owner account of the host.
    pub fn owner(&self) -> Address {
        self.inner.read().unwrap().access.owner()
    }

    /// Whether this host supports in-place extension updates.
    pub fn is_upgradeable(&self) -> bool {
        self.inner.read().unwrap().registry.is_upgradeable()
    }

    /// Grant role bits to an account. Owner only.
    pub fn grant_roles(&self, caller: Address, account: Address, bits: u64) -> CoreResult<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.access.is_owner(caller) {
            return Err(CoreError::Unauthorized(caller));
        }
        let roles = inner.access.grant(account, bits);
        inner.events.push(CoreEvent::RolesUpdated { account, roles });
        debug!(%account, roles, "roles granted");
        Ok(())
    }

    /// Revoke role bits from an account. Owner only.
    pub fn revoke_roles(&self, caller: Address, account: Address, bits: u64) -> CoreResult<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.access.is_owner(caller) {
            return Err(CoreError::Unauthorized(caller));
        }
        let roles = inner.access.revoke(account, bits);
        inner.events.push(CoreEvent::RolesUpdated { account, roles });
        debug!(%account, roles, "roles revoked");
        Ok(())
    }

    /// Check if an account holds at least one bit of `bits`.
    pub fn has_role(&self, account: Address, bits: u64) -> bool {
        self.inner.read().unwrap().access.has_any(account, bits)
    }

    /// Install an extension. Caller must be the owner or hold
    /// [`ROLE_INSTALLER`].
    pub fn install_extension(
        &self,
        caller: Address,
        implementation: Address,
        code: Arc<dyn ExtensionContract>,
        data: &[u8],
    ) -> CoreResult<ExtensionId> {
        self.install_extension_with_value(caller, implementation, code, 0, data)
    }

    /// Install an extension, forwarding an attached value to its install
    /// hook.
    pub fn install_extension_with_value(
        &self,
        caller: Address,
        implementation: Address,
        code: Arc<dyn ExtensionContract>,
        value: u128,
        data: &[u8],
    ) -> CoreResult<ExtensionId> {
        let mut inner = self.inner.write().unwrap();
        if !inner.access.authorized(caller, ROLE_INSTALLER) {
            return Err(CoreError::Unauthorized(caller));
        }
        let id = inner
            .registry
            .install(caller, implementation, code, value, data)?;
        inner.events.push(CoreEvent::ExtensionInstalled {
            caller,
            implementation,
            proxy: id,
        });
        info!(%caller, %implementation, proxy = %id, "extension installed");
        Ok(id)
    }

    /// Uninstall an extension. Caller must be the owner or hold
    /// [`ROLE_INSTALLER`].
    pub fn uninstall_extension(
        &self,
        caller: Address,
        implementation: Address,
        data: &[u8],
    ) -> CoreResult<ExtensionId> {
        let mut inner = self.inner.write().unwrap();
        if !inner.access.authorized(caller, ROLE_INSTALLER) {
            return Err(CoreError::Unauthorized(caller));
        }
        let id = inner.registry.uninstall(caller, implementation, data)?;
        inner.events.push(CoreEvent::ExtensionUninstalled {
            caller,
            implementation,
            proxy: id,
        });
        info!(%caller, %implementation, proxy = %id, "extension uninstalled");
        Ok(id)
    }

    /// Swap an installed extension's implementation in place, preserving its
    /// identity, proxy, and storage. Caller must be the owner or hold
    /// [`ROLE_INSTALLER`]; upgradeable hosts only.
    pub fn update_extension(
        &self,
        caller: Address,
        current_implementation: Address,
        new_implementation: Address,
        code: Arc<dyn ExtensionContract>,
    ) -> CoreResult<ExtensionId> {
        let mut inner = self.inner.write().unwrap();
        if !inner.access.authorized(caller, ROLE_INSTALLER) {
            return Err(CoreError::Unauthorized(caller));
        }
        let id = inner
            .registry
            .update(current_implementation, new_implementation, code)?;
        inner.events.push(CoreEvent::ExtensionUpdated {
            caller,
            previous_implementation: current_implementation,
            implementation: new_implementation,
            proxy: id,
        });
        info!(
            %caller,
            previous = %current_implementation,
            %new_implementation,
            proxy = %id,
            "extension updated"
        );
        Ok(id)
    }

    /// Catch-all entry point: route a call that matches no host-defined
    /// function to the owning extension.
    pub fn call(&self, caller: Address, selector: Selector, data: &[u8]) -> CoreResult<Vec<u8>> {
        self.call_with_value(caller, selector, 0, data)
    }

    /// Catch-all entry point with an attached value.
    pub fn call_with_value(
        &self,
        caller: Address,
        selector: Selector,
        value: u128,
        data: &[u8],
    ) -> CoreResult<Vec<u8>> {
        let mut guard = self.inner.write().unwrap();
        let inner = &mut *guard;
        Ok(dispatch::route_external(
            &mut inner.registry,
            &mut inner.storage,
            &inner.access,
            caller,
            selector,
            value,
            data,
        )?)
    }

    /// Trigger one of the host's lifecycle callbacks.
    pub fn execute_callback(&self, selector: Selector, data: &[u8]) -> CoreResult<Vec<u8>> {
        let mut guard = self.inner.write().unwrap();
        let inner = &mut *guard;
        Ok(dispatch::execute_callback(
            &mut inner.registry,
            &mut inner.storage,
            self.address,
            selector,
            data,
            false,
        )?)
    }

    /// Trigger a lifecycle callback from a view context: the extension runs
    /// against a read-only storage view.
    pub fn execute_callback_view(&self, selector: Selector, data: &[u8]) -> CoreResult<Vec<u8>> {
        let mut guard = self.inner.write().unwrap();
        let inner = &mut *guard;
        Ok(dispatch::execute_callback(
            &mut inner.registry,
            &mut inner.storage,
            self.address,
            selector,
            data,
            true,
        )?)
    }

    /// Snapshot of all installed extensions with their live configs.
    pub fn installed_extensions(&self) -> Vec<InstalledExtension> {
        self.inner.read().unwrap().registry.installed()
    }

    /// Number of installed extensions.
    pub fn extension_count(&self) -> usize {
        self.inner.read().unwrap().registry.count()
    }

    /// True iff at least one installed extension grants the interface.
    pub fn supports_interface(&self, interface: InterfaceId) -> bool {
        self.inner.read().unwrap().registry.supports_interface(interface)
    }

    /// Number of installed extensions granting the interface.
    pub fn interface_count(&self, interface: InterfaceId) -> u64 {
        self.inner.read().unwrap().registry.interface_count(interface)
    }

    /// Read one slot of an installed extension's proxy storage.
    pub fn proxy_storage(&self, implementation: Address, key: &[u8]) -> Option<Vec<u8>> {
        let inner = self.inner.read().unwrap();
        let id = inner.registry.extension_id(implementation)?;
        inner.registry.proxy_storage_value(id, key)
    }

    /// Read one slot of the host's own storage (the delegate-call target).
    pub fn storage_value(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner
            .read()
            .unwrap()
            .storage
            .get(key)
            .map(<[u8]>::to_vec)
    }

    /// The accumulated event log.
    pub fn events(&self) -> Vec<CoreEvent> {
        self.inner.read().unwrap().events.clone()
    }
}
