//! Extension config descriptor.
//!
//! Every installable extension exposes one declarative [`ExtensionConfig`]
//! describing the lifecycle callbacks it participates in, the externally
//! routed functions it owns, and the interfaces it requires or grants. The
//! registry drives all of its table bookkeeping off this value and never
//! inspects concrete extension types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{InterfaceId, Selector};

/// Call semantics for one routed function or callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// Ordinary call: executes against the extension proxy's own storage.
    Call,

    /// Delegated call: executes against the host's storage.
    DelegateCall,

    /// Read-only call: executes against the proxy's storage but any write
    /// attempt reverts.
    StaticCall,
}

impl CallType {
    /// Get the string representation of the call type.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Call => "call",
            CallType::DelegateCall => "delegatecall",
            CallType::StaticCall => "staticcall",
        }
    }

    /// Check if this call type forbids state mutation.
    pub fn is_static(&self) -> bool {
        matches!(self, CallType::StaticCall)
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One lifecycle-callback participation declared by an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackFunction {
    /// Callback selector.
    pub selector: Selector,

    /// Call semantics used when the host triggers the callback.
    pub call_type: CallType,
}

/// One externally routed function declared by an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackFunction {
    /// Function selector.
    pub selector: Selector,

    /// Call semantics used when the host routes a call to the function.
    pub call_type: CallType,

    /// Role bitmask the caller must hold. Zero means the function is public;
    /// a non-zero mask admits the host owner or any caller holding at least
    /// one of the bits.
    pub permission_bits: u64,
}

/// Declarative manifest of what an extension plugs into the host.
///
/// The registry queries this fresh from the extension at both install and
/// uninstall time and relies on the value being identical across the
/// extension's lifetime; see the crate docs for the purity obligation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Whether the extension wants `on_install` / `on_uninstall` invoked.
    #[serde(default)]
    pub register_installation_callback: bool,

    /// Interface the host must already support for this extension to
    /// install. `None` means no precondition.
    #[serde(default)]
    pub required_interface: Option<InterfaceId>,

    /// Interfaces this extension grants while installed.
    #[serde(default)]
    pub supported_interfaces: Vec<InterfaceId>,

    /// Lifecycle callbacks the extension participates in.
    #[serde(default)]
    pub callback_functions: Vec<CallbackFunction>,

    /// Externally routed functions the extension owns.
    #[serde(default)]
    pub fallback_functions: Vec<FallbackFunction>,
}

impl ExtensionConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the install/uninstall lifecycle hooks.
    pub fn with_installation_callback(mut self) -> Self {
        self.register_installation_callback = true;
        self
    }

    /// Declare an interface the host must support before install.
    pub fn requires_interface(mut self, interface: InterfaceId) -> Self {
        self.required_interface = Some(interface);
        self
    }

    /// Declare an interface this extension grants while installed.
    pub fn supports_interface(mut self, interface: InterfaceId) -> Self {
        self.supported_interfaces.push(interface);
        self
    }

    /// Declare a lifecycle-callback participation.
    pub fn with_callback(mut self, selector: Selector, call_type: CallType) -> Self {
        self.callback_functions.push(CallbackFunction {
            selector,
            call_type,
        });
        self
    }

    /// Declare an externally routed function.
    pub fn with_fallback(
        mut self,
        selector: Selector,
        call_type: CallType,
        permission_bits: u64,
    ) -> Self {
        self.fallback_functions.push(FallbackFunction {
            selector,
            call_type,
            permission_bits,
        });
        self
    }
}
