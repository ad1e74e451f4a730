//! The registry's routing, callback, and interface tables.
//!
//! All four tables mutate together: an extension's claims are validated
//! against the current tables first, then committed as one unit (`claim`),
//! and removed as one unit on uninstall (`release`). Install failures
//! therefore never leave partially claimed selectors behind.

use std::collections::{HashMap, HashSet};

use crate::extension::{CallType, ExtensionConfig};
use crate::types::{Address, ExtensionId, InterfaceId, Selector};

use super::error::{RegistryError, RegistryResult};
use super::manifest::CallbackManifest;

/// Routing-table entry for one externally callable function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FallbackEntry {
    /// Owning extension's proxy identity.
    pub(crate) proxy: ExtensionId,

    /// Call semantics for the dispatch.
    pub(crate) call_type: CallType,

    /// Required role bitmask; zero means public.
    pub(crate) permission_bits: u64,
}

/// Callback-table entry for one lifecycle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallbackEntry {
    /// Owning extension's proxy identity.
    pub(crate) proxy: ExtensionId,

    /// Call semantics for the dispatch.
    pub(crate) call_type: CallType,
}

/// The mutable bookkeeping behind one host.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RegistryTables {
    /// Installed set: implementation address to extension identity.
    pub(crate) extension_ids: HashMap<Address, ExtensionId>,

    /// Selector to routed-function entry.
    pub(crate) fallbacks: HashMap<Selector, FallbackEntry>,

    /// Selector to callback entry.
    pub(crate) callbacks: HashMap<Selector, CallbackEntry>,

    /// Interface reference counter.
    pub(crate) interfaces: HashMap<InterfaceId, u64>,
}

impl RegistryTables {
    /// Reference count of an interface.
    pub(crate) fn interface_count(&self, interface: InterfaceId) -> u64 {
        self.interfaces.get(&interface).copied().unwrap_or(0)
    }

    /// Check every claim in `config` against the current tables without
    /// mutating anything.
    ///
    /// Check order mirrors the install algorithm: interface precondition,
    /// then callback claims, then routed-function claims. Duplicate selectors
    /// within one config count as conflicts too.
    pub(crate) fn validate_claims(
        &self,
        config: &ExtensionConfig,
        manifest: &CallbackManifest,
    ) -> RegistryResult<()> {
        if let Some(required) = config.required_interface {
            if self.interface_count(required) == 0 {
                return Err(RegistryError::InterfaceNotCompatible(required));
            }
        }

        let mut claimed = HashSet::new();
        for callback in &config.callback_functions {
            if self.callbacks.contains_key(&callback.selector) || !claimed.insert(callback.selector)
            {
                return Err(RegistryError::CallbackAlreadyInstalled(callback.selector));
            }
            if !manifest.allows(callback.selector) {
                return Err(RegistryError::CallbackFunctionNotSupported(
                    callback.selector,
                ));
            }
        }

        let mut claimed = HashSet::new();
        for fallback in &config.fallback_functions {
            if self.fallbacks.contains_key(&fallback.selector) || !claimed.insert(fallback.selector)
            {
                return Err(RegistryError::FunctionAlreadyInstalled(fallback.selector));
            }
        }

        Ok(())
    }

    /// Commit every claim in `config` under the given identity.
    ///
    /// Callers must have run `validate_claims` against the same tables first.
    pub(crate) fn claim(&mut self, id: ExtensionId, config: &ExtensionConfig) {
        for interface in &config.supported_interfaces {
            *self.interfaces.entry(*interface).or_insert(0) += 1;
        }
        for callback in &config.callback_functions {
            self.callbacks.insert(
                callback.selector,
                CallbackEntry {
                    proxy: id,
                    call_type: callback.call_type,
                },
            );
        }
        for fallback in &config.fallback_functions {
            self.fallbacks.insert(
                fallback.selector,
                FallbackEntry {
                    proxy: id,
                    call_type: fallback.call_type,
                    permission_bits: fallback.permission_bits,
                },
            );
        }
    }

    /// Remove every claim in `config` for the given identity.
    ///
    /// Selectors are only deleted when the identity actually owns them, so a
    /// drifted config cannot evict another extension's entries. An interface
    /// decrement past zero reports the config-purity violation.
    pub(crate) fn release(&mut self, id: ExtensionId, config: &ExtensionConfig) -> RegistryResult<()> {
        for interface in &config.supported_interfaces {
            match self.interfaces.get_mut(interface) {
                Some(count) if *count > 1 => *count -= 1,
                Some(_) => {
                    self.interfaces.remove(interface);
                }
                None => {
                    tracing::error!(
                        interface = %interface,
                        "interface counter underflow; extension config drifted since install"
                    );
                    return Err(RegistryError::InterfaceCounterUnderflow(*interface));
                }
            }
        }
        for callback in &config.callback_functions {
            if self
                .callbacks
                .get(&callback.selector)
                .is_some_and(|entry| entry.proxy == id)
            {
                self.callbacks.remove(&callback.selector);
            }
        }
        for fallback in &config.fallback_functions {
            if self
                .fallbacks
                .get(&fallback.selector)
                .is_some_and(|entry| entry.proxy == id)
            {
                self.fallbacks.remove(&fallback.selector);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::manifest::{CallbackValidation, SupportedCallback};

    fn manifest_allowing_all() -> CallbackManifest {
        CallbackManifest::new(Vec::new(), CallbackValidation::Permissive)
    }

    fn sample_id(label: &str) -> ExtensionId {
        crate::identity::predict_id(Address::derive("core"), Address::derive(label))
    }

    fn sample_config() -> ExtensionConfig {
        ExtensionConfig::new()
            .supports_interface(InterfaceId::from_name("Mintable"))
            .with_callback(Selector::from_signature("beforeMint()"), CallType::Call)
            .with_fallback(Selector::from_signature("mint()"), CallType::Call, 0)
    }

    #[test]
    fn test_claim_release_is_inverse() {
        let mut tables = RegistryTables::default();
        let before = tables.clone();
        let id = sample_id("ext");
        let config = sample_config();

        tables.claim(id, &config);
        assert_eq!(
            tables.interface_count(InterfaceId::from_name("Mintable")),
            1
        );
        assert_eq!(tables.callbacks.len(), 1);
        assert_eq!(tables.fallbacks.len(), 1);

        tables.release(id, &config).unwrap();
        assert_eq!(tables, before);
    }

    #[test]
    fn test_validate_detects_fallback_conflict() {
        let mut tables = RegistryTables::default();
        let config = sample_config();
        tables.claim(sample_id("first"), &config);

        let conflicting = ExtensionConfig::new().with_fallback(
            Selector::from_signature("mint()"),
            CallType::DelegateCall,
            0,
        );
        let err = tables
            .validate_claims(&conflicting, &manifest_allowing_all())
            .unwrap_err();
        assert!(matches!(err, RegistryError::FunctionAlreadyInstalled(_)));
    }

    #[test]
    fn test_validate_detects_callback_conflict() {
        let mut tables = RegistryTables::default();
        tables.claim(sample_id("first"), &sample_config());

        let conflicting = ExtensionConfig::new()
            .with_callback(Selector::from_signature("beforeMint()"), CallType::Call);
        let err = tables
            .validate_claims(&conflicting, &manifest_allowing_all())
            .unwrap_err();
        assert!(matches!(err, RegistryError::CallbackAlreadyInstalled(_)));
    }

    #[test]
    fn test_validate_detects_duplicates_within_one_config() {
        let tables = RegistryTables::default();
        let selector = Selector::from_signature("mint()");
        let config = ExtensionConfig::new()
            .with_fallback(selector, CallType::Call, 0)
            .with_fallback(selector, CallType::StaticCall, 0);

        let err = tables
            .validate_claims(&config, &manifest_allowing_all())
            .unwrap_err();
        assert!(matches!(err, RegistryError::FunctionAlreadyInstalled(_)));
    }

    #[test]
    fn test_validate_requires_granted_interface() {
        let mut tables = RegistryTables::default();
        let royalty = InterfaceId::from_name("Royalty");
        let requiring = ExtensionConfig::new().requires_interface(royalty);

        let err = tables
            .validate_claims(&requiring, &manifest_allowing_all())
            .unwrap_err();
        assert!(matches!(err, RegistryError::InterfaceNotCompatible(_)));

        // Once some extension grants the interface, the precondition holds.
        tables.claim(
            sample_id("granting"),
            &ExtensionConfig::new().supports_interface(royalty),
        );
        assert!(tables
            .validate_claims(&requiring, &manifest_allowing_all())
            .is_ok());
    }

    #[test]
    fn test_strict_manifest_rejects_undeclared_callback() {
        let tables = RegistryTables::default();
        let declared = Selector::from_signature("beforeMint()");
        let undeclared = Selector::from_signature("beforeBurn()");
        let manifest = CallbackManifest::new(
            vec![SupportedCallback::optional(declared)],
            CallbackValidation::Strict,
        );

        let allowed = ExtensionConfig::new().with_callback(declared, CallType::Call);
        assert!(tables.validate_claims(&allowed, &manifest).is_ok());

        let rejected = ExtensionConfig::new().with_callback(undeclared, CallType::Call);
        let err = tables.validate_claims(&rejected, &manifest).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::CallbackFunctionNotSupported(_)
        ));
    }

    #[test]
    fn test_release_reports_interface_underflow() {
        let mut tables = RegistryTables::default();
        let id = sample_id("ext");
        // Released config claims an interface that was never counted.
        let drifted =
            ExtensionConfig::new().supports_interface(InterfaceId::from_name("Phantom"));

        let err = tables.release(id, &drifted).unwrap_err();
        assert!(matches!(err, RegistryError::InterfaceCounterUnderflow(_)));
    }

    #[test]
    fn test_release_spares_entries_owned_by_others() {
        let mut tables = RegistryTables::default();
        let owner_id = sample_id("owner");
        let other_id = sample_id("other");
        let config = sample_config();
        tables.claim(owner_id, &config);

        // A drifted config claiming the same selectors under a different
        // identity must not evict the real owner's entries.
        let drifted = ExtensionConfig::new()
            .with_callback(Selector::from_signature("beforeMint()"), CallType::Call)
            .with_fallback(Selector::from_signature("mint()"), CallType::Call, 0);
        tables.release(other_id, &drifted).unwrap();

        assert_eq!(tables.callbacks.len(), 1);
        assert_eq!(tables.fallbacks.len(), 1);
    }

    #[test]
    fn test_shared_interface_counts_down_one_at_a_time() {
        let mut tables = RegistryTables::default();
        let mintable = InterfaceId::from_name("Mintable");
        let config = ExtensionConfig::new().supports_interface(mintable);

        tables.claim(sample_id("a"), &config);
        tables.claim(sample_id("b"), &config);
        assert_eq!(tables.interface_count(mintable), 2);

        tables.release(sample_id("a"), &config).unwrap();
        assert_eq!(tables.interface_count(mintable), 1);

        tables.release(sample_id("b"), &config).unwrap();
        assert_eq!(tables.interface_count(mintable), 0);
    }
}
