//! The extension registry: installed set, table bookkeeping, and the
//! install/uninstall/update state machine.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::extension::{CallContext, ExtensionConfig, ExtensionContract};
use crate::identity::{ExtensionProxy, IdentityScheme};
use crate::types::{Address, ExtensionId, InterfaceId, Selector};

use super::error::{RegistryError, RegistryResult};
use super::manifest::{CallbackManifest, CallbackMode};
use super::tables::{CallbackEntry, FallbackEntry, RegistryTables};

/// Introspection record for one installed extension.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InstalledExtension {
    /// Stable identity of the installed instance.
    pub id: ExtensionId,

    /// Current backing implementation address.
    pub implementation: Address,

    /// Live-fetched config of the extension.
    pub config: ExtensionConfig,
}

/// Registry of installed extensions for one host.
///
/// Owns the four tables (installed set, routing table, callback table,
/// interface counter) plus the proxy store and the identity scheme. Every
/// operation either completes fully or leaves the tables untouched; the one
/// exception is a lifecycle hook that reverts after commit, which the
/// registry compensates for by explicitly undoing the commit before
/// re-raising the failure.
pub struct ExtensionRegistry {
    core: Address,
    scheme: IdentityScheme,
    manifest: CallbackManifest,
    tables: RegistryTables,
    proxies: HashMap<ExtensionId, ExtensionProxy>,
}

impl ExtensionRegistry {
    /// Create an empty registry for a host.
    pub fn new(core: Address, scheme: IdentityScheme, manifest: CallbackManifest) -> Self {
        ExtensionRegistry {
            core,
            scheme,
            manifest,
            tables: RegistryTables::default(),
            proxies: HashMap::new(),
        }
    }

    /// Address of the host this registry belongs to.
    pub fn core(&self) -> Address {
        self.core
    }

    /// Whether in-place implementation updates are supported.
    pub fn is_upgradeable(&self) -> bool {
        self.scheme.is_upgradeable()
    }

    /// Install an extension implementation.
    ///
    /// Validates every claim against the current tables before mutating
    /// anything, commits all four tables as one unit, then (last) invokes the
    /// extension's `on_install` hook when registered, forwarding the caller,
    /// attached value, and opaque data. A reverting hook rolls the commit
    /// back and re-raises the revert payload.
    pub fn install(
        &mut self,
        caller: Address,
        implementation: Address,
        code: Arc<dyn ExtensionContract>,
        value: u128,
        data: &[u8],
    ) -> RegistryResult<ExtensionId> {
        if self.tables.extension_ids.contains_key(&implementation) {
            return Err(RegistryError::AlreadyInstalled(implementation));
        }

        let id = self.scheme.peek_id(self.core, implementation);
        let config = code.extension_config();
        self.tables.validate_claims(&config, &self.manifest)?;

        // Commit point: all table mutations land before any external call.
        self.tables.extension_ids.insert(implementation, id);
        self.tables.claim(id, &config);

        let created = !self.proxies.contains_key(&id);
        let proxy = self
            .proxies
            .entry(id)
            .or_insert_with(|| ExtensionProxy::new(id, implementation, Arc::clone(&code)));
        proxy.upgrade(implementation, Arc::clone(&code));

        if config.register_installation_callback {
            let snapshot = proxy.storage().clone();
            let hook = {
                let mut ctx = CallContext::new(caller, value, proxy.storage_mut());
                code.on_install(&mut ctx, data)
            };
            if let Err(revert) = hook {
                *proxy.storage_mut() = snapshot;
                if created {
                    self.proxies.remove(&id);
                }
                self.tables.extension_ids.remove(&implementation);
                self.tables.release(id, &config)?;
                return Err(RegistryError::CallbackExecutionReverted { data: revert.data });
            }
        }

        self.scheme.advance(id);
        debug!(%implementation, proxy = %id, "extension installed");
        Ok(id)
    }

    /// Uninstall an extension implementation.
    ///
    /// Re-fetches the config live and uses its value to unwind the tables,
    /// then (last) invokes `on_uninstall` when registered. A reverting hook
    /// restores the installed state and re-raises the revert payload.
    pub fn uninstall(
        &mut self,
        caller: Address,
        implementation: Address,
        data: &[u8],
    ) -> RegistryResult<ExtensionId> {
        let id = match self.tables.extension_ids.get(&implementation) {
            Some(&id) => id,
            None => return Err(RegistryError::NotInstalled(implementation)),
        };
        let proxy = self
            .proxies
            .get_mut(&id)
            .ok_or(RegistryError::NotInstalled(implementation))?;
        let code = Arc::clone(proxy.code());
        let config = code.extension_config();

        self.tables.extension_ids.remove(&implementation);
        self.tables.release(id, &config)?;

        if config.register_installation_callback {
            let snapshot = proxy.storage().clone();
            let hook = {
                let mut ctx = CallContext::new(caller, 0, proxy.storage_mut());
                code.on_uninstall(&mut ctx, data)
            };
            if let Err(revert) = hook {
                *proxy.storage_mut() = snapshot;
                self.tables.extension_ids.insert(implementation, id);
                self.tables.claim(id, &config);
                return Err(RegistryError::CallbackExecutionReverted { data: revert.data });
            }
        }

        debug!(%implementation, proxy = %id, "extension uninstalled");
        Ok(id)
    }

    /// Swap the implementation behind an installed extension in place.
    ///
    /// Unmaps the old config from the tables, re-points the identity to the
    /// new implementation, and maps the new config onto the same proxy, so
    /// the tables reflect the post-upgrade config exactly and the proxy's
    /// storage survives. Only supported under the hash-chain scheme.
    pub fn update(
        &mut self,
        current: Address,
        new_implementation: Address,
        code: Arc<dyn ExtensionContract>,
    ) -> RegistryResult<ExtensionId> {
        if !self.scheme.is_upgradeable() {
            return Err(RegistryError::UpdateNotSupported);
        }
        let id = match self.tables.extension_ids.get(&current) {
            Some(&id) => id,
            None => return Err(RegistryError::NotInstalled(current)),
        };
        if self.tables.extension_ids.contains_key(&new_implementation) {
            return Err(RegistryError::AlreadyInstalled(new_implementation));
        }
        let proxy = self
            .proxies
            .get_mut(&id)
            .ok_or(RegistryError::NotInstalled(current))?;
        let old_config = proxy.code().extension_config();
        let new_config = code.extension_config();

        self.tables.release(id, &old_config)?;
        if let Err(err) = self.tables.validate_claims(&new_config, &self.manifest) {
            // Restore the old mapping so a rejected update mutates nothing.
            self.tables.claim(id, &old_config);
            return Err(err);
        }

        self.tables.extension_ids.remove(&current);
        self.tables.extension_ids.insert(new_implementation, id);
        self.tables.claim(id, &new_config);
        proxy.upgrade(new_implementation, code);

        debug!(
            previous = %current,
            %new_implementation,
            proxy = %id,
            "extension updated"
        );
        Ok(id)
    }

    /// Identity of an installed implementation, `None` if not installed.
    pub fn extension_id(&self, implementation: Address) -> Option<ExtensionId> {
        self.tables.extension_ids.get(&implementation).copied()
    }

    /// Check if an implementation is installed.
    pub fn is_installed(&self, implementation: Address) -> bool {
        self.tables.extension_ids.contains_key(&implementation)
    }

    /// Number of installed extensions.
    pub fn count(&self) -> usize {
        self.tables.extension_ids.len()
    }

    /// Snapshot of all installed extensions with their live configs,
    /// ordered by implementation address.
    pub fn installed(&self) -> Vec<InstalledExtension> {
        let mut records: Vec<InstalledExtension> = self
            .tables
            .extension_ids
            .iter()
            .map(|(implementation, id)| InstalledExtension {
                id: *id,
                implementation: *implementation,
                config: self
                    .proxies
                    .get(id)
                    .map(|proxy| proxy.code().extension_config())
                    .unwrap_or_default(),
            })
            .collect();
        records.sort_by_key(|record| record.implementation);
        records
    }

    /// True iff at least one installed extension grants the interface.
    pub fn supports_interface(&self, interface: InterfaceId) -> bool {
        self.tables.interface_count(interface) > 0
    }

    /// Number of installed extensions granting the interface.
    pub fn interface_count(&self, interface: InterfaceId) -> u64 {
        self.tables.interface_count(interface)
    }

    /// Read one slot of a proxy's persistent storage.
    pub fn proxy_storage_value(&self, id: ExtensionId, key: &[u8]) -> Option<Vec<u8>> {
        self.proxies
            .get(&id)
            .and_then(|proxy| proxy.storage().get(key).map(<[u8]>::to_vec))
    }

    /// Participation mode of a callback per the host manifest.
    pub fn callback_mode(&self, selector: Selector) -> Option<CallbackMode> {
        self.manifest.mode(selector)
    }

    pub(crate) fn fallback_entry(&self, selector: Selector) -> Option<FallbackEntry> {
        self.tables.fallbacks.get(&selector).copied()
    }

    pub(crate) fn callback_entry(&self, selector: Selector) -> Option<CallbackEntry> {
        self.tables.callbacks.get(&selector).copied()
    }

    pub(crate) fn proxy(&self, id: ExtensionId) -> Option<&ExtensionProxy> {
        self.proxies.get(&id)
    }

    pub(crate) fn proxy_mut(&mut self, id: ExtensionId) -> Option<&mut ExtensionProxy> {
        self.proxies.get_mut(&id)
    }

    #[cfg(test)]
    pub(crate) fn tables(&self) -> &RegistryTables {
        &self.tables
    }
}
