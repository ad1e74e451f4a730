//! Dispatch engine.
//!
//! Two dispatch paths share the routing state:
//!
//! - **External routing** ([`route_external`]): an inbound call whose
//!   selector matches no host-defined function is looked up in the routing
//!   table, permission-checked, and forwarded to the owning extension with
//!   one of three call semantics. Return data and revert payloads pass
//!   through verbatim.
//! - **Internal callbacks** ([`execute_callback`]): the host triggers one of
//!   its own lifecycle points. A missing owner is a silent no-op for
//!   optional callbacks and a hard failure for required ones.

mod error;

pub use error::{DispatchError, DispatchResult};

use std::sync::Arc;

use tracing::debug;

use crate::access::AccessControl;
use crate::extension::{CallContext, CallType, Storage};
use crate::registry::{CallbackMode, ExtensionRegistry};
use crate::types::{Address, Selector};

/// Route an external call that matched no host-defined function.
///
/// Performs the routing-table lookup, the permission gate, and exactly one of
/// the three call semantics against the owning extension's proxy. This is
/// always the last action of the enclosing call: the callee's return bytes or
/// revert payload are forwarded unchanged.
pub fn route_external(
    registry: &mut ExtensionRegistry,
    host_storage: &mut Storage,
    access: &AccessControl,
    caller: Address,
    selector: Selector,
    value: u128,
    input: &[u8],
) -> DispatchResult<Vec<u8>> {
    let entry = registry
        .fallback_entry(selector)
        .ok_or(DispatchError::FunctionNotInstalled(selector))?;

    if entry.permission_bits != 0 && !access.authorized(caller, entry.permission_bits) {
        return Err(DispatchError::UnauthorizedFunctionCall { selector, caller });
    }

    debug!(%selector, %caller, call_type = %entry.call_type, "routing external call");

    let code = registry
        .proxy(entry.proxy)
        .map(|proxy| Arc::clone(proxy.code()))
        .ok_or(DispatchError::FunctionNotInstalled(selector))?;

    let result = match entry.call_type {
        CallType::DelegateCall => {
            let mut ctx = CallContext::new(caller, value, host_storage);
            code.call(&mut ctx, selector, input)
        }
        CallType::Call => {
            let proxy = registry
                .proxy_mut(entry.proxy)
                .ok_or(DispatchError::FunctionNotInstalled(selector))?;
            let mut ctx = CallContext::new(caller, value, proxy.storage_mut());
            code.call(&mut ctx, selector, input)
        }
        CallType::StaticCall => {
            let proxy = registry
                .proxy_mut(entry.proxy)
                .ok_or(DispatchError::FunctionNotInstalled(selector))?;
            let mut ctx = CallContext::read_only(caller, proxy.storage_mut());
            code.call(&mut ctx, selector, input)
        }
    };

    result.map_err(|revert| DispatchError::ExecutionReverted { data: revert.data })
}

/// Trigger one of the host's lifecycle callbacks.
///
/// `core` is the host's own address and becomes the caller the extension
/// observes. With `read_only` set the extension runs against a read-only
/// context regardless of the registered call type, matching a view caller's
/// mutability expectations.
pub fn execute_callback(
    registry: &mut ExtensionRegistry,
    host_storage: &mut Storage,
    core: Address,
    selector: Selector,
    input: &[u8],
    read_only: bool,
) -> DispatchResult<Vec<u8>> {
    let Some(entry) = registry.callback_entry(selector) else {
        return match registry.callback_mode(selector) {
            Some(CallbackMode::Required) => {
                Err(DispatchError::CallbackFunctionRequired(selector))
            }
            _ => Ok(Vec::new()),
        };
    };

    debug!(%selector, call_type = %entry.call_type, read_only, "executing callback");

    let code = registry
        .proxy(entry.proxy)
        .map(|proxy| Arc::clone(proxy.code()))
        .ok_or(DispatchError::FunctionNotInstalled(selector))?;

    let result = match entry.call_type {
        CallType::DelegateCall => {
            let mut ctx = if read_only {
                CallContext::read_only(core, host_storage)
            } else {
                CallContext::new(core, 0, host_storage)
            };
            code.call(&mut ctx, selector, input)
        }
        call_type => {
            let proxy = registry
                .proxy_mut(entry.proxy)
                .ok_or(DispatchError::FunctionNotInstalled(selector))?;
            let mut ctx = if read_only || call_type.is_static() {
                CallContext::read_only(core, proxy.storage_mut())
            } else {
                CallContext::new(core, 0, proxy.storage_mut())
            };
            code.call(&mut ctx, selector, input)
        }
    };

    result.map_err(|revert| DispatchError::ExecutionReverted { data: revert.data })
}
