//! End-to-end tests driving [`ModularCore`] through its public API only.

use std::sync::Arc;

use anyhow::Result;

use modcore::prelude::*;

/// Stores a number in its proxy storage and reports it back, plus a
/// required hook the host triggers before minting.
struct NumberExtension;

const NUMBER_KEY: &[u8] = b"number";

fn set_number() -> Selector {
    Selector::from_signature("setNumber(uint256)")
}

fn get_number() -> Selector {
    Selector::from_signature("getNumber()")
}

fn before_mint() -> Selector {
    Selector::from_signature("beforeMint(address)")
}

impl ExtensionContract for NumberExtension {
    fn extension_config(&self) -> ExtensionConfig {
        ExtensionConfig::new()
            .with_installation_callback()
            .supports_interface(InterfaceId::from_name("NumberStore"))
            .with_fallback(set_number(), CallType::Call, 0)
            .with_fallback(get_number(), CallType::StaticCall, 0)
            .with_callback(before_mint(), CallType::Call)
    }

    fn on_install(&self, ctx: &mut CallContext<'_>, data: &[u8]) -> Result<(), Revert> {
        // A non-empty install payload seeds the initial number.
        if !data.is_empty() {
            ctx.store(NUMBER_KEY.to_vec(), data.to_vec())?;
        }
        Ok(())
    }

    fn call(
        &self,
        ctx: &mut CallContext<'_>,
        selector: Selector,
        input: &[u8],
    ) -> Result<Vec<u8>, Revert> {
        if selector == set_number() {
            ctx.store(NUMBER_KEY.to_vec(), input.to_vec())?;
            Ok(Vec::new())
        } else if selector == get_number() {
            Ok(ctx.load(NUMBER_KEY).unwrap_or_default())
        } else if selector == before_mint() {
            if ctx.load(NUMBER_KEY).map_or(true, |n| n.is_empty()) {
                return Err(Revert::msg("number not set"));
            }
            Ok(Vec::new())
        } else {
            Err(Revert::msg("unknown selector"))
        }
    }
}

/// Counter used by the update tests. `step` is the only difference between
/// versions; the count itself lives in proxy storage and must survive an
/// in-place update.
struct CounterExtension {
    step: u64,
}

fn increment() -> Selector {
    Selector::from_signature("increment()")
}

fn count() -> Selector {
    Selector::from_signature("count()")
}

impl ExtensionContract for CounterExtension {
    fn extension_config(&self) -> ExtensionConfig {
        ExtensionConfig::new()
            .with_fallback(increment(), CallType::Call, 0)
            .with_fallback(count(), CallType::StaticCall, 0)
    }

    fn call(
        &self,
        ctx: &mut CallContext<'_>,
        selector: Selector,
        _input: &[u8],
    ) -> Result<Vec<u8>, Revert> {
        let current = ctx
            .load(b"count")
            .and_then(|raw| raw.try_into().ok())
            .map(u64::from_le_bytes)
            .unwrap_or(0);
        if selector == increment() {
            let next = current + self.step;
            ctx.store(b"count".to_vec(), next.to_le_bytes().to_vec())?;
            Ok(Vec::new())
        } else if selector == count() {
            Ok(current.to_le_bytes().to_vec())
        } else {
            Err(Revert::msg("unknown selector"))
        }
    }
}

fn owner() -> Address {
    Address::derive("owner")
}

fn minting_host() -> ModularCore {
    ModularCore::new(
        Address::derive("core"),
        owner(),
        vec![SupportedCallback::required(before_mint())],
    )
}

#[test]
fn test_extension_lifecycle() -> Result<()> {
    let core = minting_host();
    let implementation = Address::derive("number-ext");

    // Minting is blocked until an extension owns the required hook.
    let err = core.execute_callback(before_mint(), b"").unwrap_err();
    assert!(matches!(
        err,
        CoreError::Dispatch(DispatchError::CallbackFunctionRequired(_))
    ));

    core.install_extension(owner(), implementation, Arc::new(NumberExtension), b"1")?;

    // Routed functions work, and the hook now passes.
    core.call(owner(), set_number(), b"42")?;
    assert_eq!(core.call(owner(), get_number(), b"")?, b"42".to_vec());
    core.execute_callback(before_mint(), b"")?;

    // The install hook's seed is visible through proxy storage.
    assert_eq!(
        core.proxy_storage(implementation, NUMBER_KEY),
        Some(b"42".to_vec())
    );

    core.uninstall_extension(owner(), implementation, b"")?;

    // Everything the extension provided is gone again.
    let err = core.execute_callback(before_mint(), b"").unwrap_err();
    assert!(matches!(
        err,
        CoreError::Dispatch(DispatchError::CallbackFunctionRequired(_))
    ));
    let err = core.call(owner(), get_number(), b"").unwrap_err();
    assert!(matches!(
        err,
        CoreError::Dispatch(DispatchError::FunctionNotInstalled(_))
    ));
    assert!(!core.supports_interface(InterfaceId::from_name("NumberStore")));

    Ok(())
}

#[test]
fn test_install_gate_and_roles() {
    let core = minting_host();
    let installer = Address::derive("installer");

    let err = core
        .install_extension(
            installer,
            Address::derive("number-ext"),
            Arc::new(NumberExtension),
            b"1",
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    core.grant_roles(owner(), installer, ROLE_INSTALLER).unwrap();
    core.install_extension(
        installer,
        Address::derive("number-ext"),
        Arc::new(NumberExtension),
        b"1",
    )
    .unwrap();
    assert_eq!(core.extension_count(), 1);
}

#[test]
fn test_reinstall_reuses_proxy_storage() -> Result<()> {
    // On a deterministic host the proxy identity is a pure function of the
    // implementation address, so reinstalling lands on the old storage.
    let core = minting_host();
    let implementation = Address::derive("number-ext");

    let first = core.install_extension(owner(), implementation, Arc::new(NumberExtension), b"1")?;
    core.call(owner(), set_number(), b"42")?;
    core.uninstall_extension(owner(), implementation, b"")?;

    let second =
        core.install_extension(owner(), implementation, Arc::new(NumberExtension), b"")?;
    assert_eq!(first, second);
    assert_eq!(core.call(owner(), get_number(), b"")?, b"42".to_vec());

    Ok(())
}

#[test]
fn test_update_preserves_identity_and_storage() -> Result<()> {
    let core = ModularCore::upgradeable(Address::derive("core"), owner(), Vec::new());
    let v1 = Address::derive("counter-v1");
    let v2 = Address::derive("counter-v2");

    let id = core.install_extension(owner(), v1, Arc::new(CounterExtension { step: 1 }), b"")?;
    core.call(owner(), increment(), b"")?;
    assert_eq!(core.call(owner(), count(), b"")?, 1u64.to_le_bytes().to_vec());

    let updated = core.update_extension(owner(), v1, v2, Arc::new(CounterExtension { step: 2 }))?;
    assert_eq!(updated, id);

    // The count carried over and the new code is live.
    core.call(owner(), increment(), b"")?;
    assert_eq!(core.call(owner(), count(), b"")?, 3u64.to_le_bytes().to_vec());

    // The routing table now resolves to the new implementation.
    assert!(!core.installed_extensions().iter().any(|e| e.implementation == v1));
    assert!(core.installed_extensions().iter().any(|e| e.implementation == v2));

    Ok(())
}

#[test]
fn test_upgradeable_host_gives_fresh_identities() -> Result<()> {
    // Hash-chained identities: uninstalling and reinstalling the same
    // implementation yields a new proxy with empty storage.
    let core = ModularCore::upgradeable(Address::derive("core"), owner(), Vec::new());
    let implementation = Address::derive("counter-v1");

    let first =
        core.install_extension(owner(), implementation, Arc::new(CounterExtension { step: 1 }), b"")?;
    core.call(owner(), increment(), b"")?;
    core.uninstall_extension(owner(), implementation, b"")?;

    let second =
        core.install_extension(owner(), implementation, Arc::new(CounterExtension { step: 1 }), b"")?;
    assert_ne!(first, second);
    assert_eq!(core.call(owner(), count(), b"")?, 0u64.to_le_bytes().to_vec());

    Ok(())
}

#[test]
fn test_event_log_serializes() -> Result<()> {
    let core = minting_host();
    let implementation = Address::derive("number-ext");

    core.install_extension(owner(), implementation, Arc::new(NumberExtension), b"1")?;
    core.uninstall_extension(owner(), implementation, b"")?;

    let events = core.events();
    assert_eq!(events.len(), 2);

    let json = serde_json::to_value(&events)?;
    assert_eq!(json[0]["event"], "extension_installed");
    assert_eq!(json[1]["event"], "extension_uninstalled");
    assert_eq!(json[0]["implementation"], serde_json::to_value(implementation)?);

    Ok(())
}

#[test]
fn test_static_route_rejects_writes() {
    // A StaticCall route hands the extension a read-only context, so a
    // selector wired to write through it reverts instead of mutating state.
    struct Sneaky;

    impl ExtensionContract for Sneaky {
        fn extension_config(&self) -> ExtensionConfig {
            ExtensionConfig::new().with_fallback(
                Selector::from_signature("peek()"),
                CallType::StaticCall,
                0,
            )
        }

        fn call(
            &self,
            ctx: &mut CallContext<'_>,
            _selector: Selector,
            input: &[u8],
        ) -> Result<Vec<u8>, Revert> {
            ctx.store(b"slot".to_vec(), input.to_vec())?;
            Ok(Vec::new())
        }
    }

    let core = minting_host();
    core.install_extension(owner(), Address::derive("sneaky"), Arc::new(Sneaky), b"")
        .unwrap();

    let err = core
        .call(owner(), Selector::from_signature("peek()"), b"x")
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Dispatch(DispatchError::ExecutionReverted { .. })
    ));
    assert_eq!(core.proxy_storage(Address::derive("sneaky"), b"slot"), None);
}
