//! Primitive identifiers shared across the core.
//!
//! Addresses, function selectors, interface ids and extension identities are
//! all small fixed-width byte values so they can key the registry tables,
//! compare cheaply, and round-trip through serialized introspection output.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hash a sequence of byte slices into one 32-byte digest.
pub(crate) fn digest(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "0x")?;
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

/// Opaque 20-byte account or contract identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Derive a stable address from a label.
    ///
    /// Handy for tests and tooling that need reproducible addresses
    /// without tracking raw byte constants.
    pub fn derive(label: &str) -> Self {
        let hash = digest(&[b"modcore.address", label.as_bytes()]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[..20]);
        Address(bytes)
    }

    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// 4-byte function selector.
///
/// Selectors key both the routing table (externally callable functions) and
/// the callback table (host-triggered lifecycle hooks). A selector is owned
/// by at most one installed extension at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector([u8; 4]);

impl Selector {
    /// Derive a selector from a function signature string,
    /// e.g. `"setNumber(uint256)"`.
    pub fn from_signature(signature: &str) -> Self {
        let hash = digest(&[signature.as_bytes()]);
        Selector([hash[0], hash[1], hash[2], hash[3]])
    }

    /// Create a selector from raw bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Selector(bytes)
    }

    /// Raw bytes of the selector.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// 4-byte interface identifier.
///
/// Extensions grant interfaces through their config; the registry keeps a
/// reference count per interface so `supports_interface` reflects the
/// currently installed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceId([u8; 4]);

impl InterfaceId {
    /// Derive an interface id from a name, e.g. `"ERC721Mintable"`.
    pub fn from_name(name: &str) -> Self {
        let hash = digest(&[b"modcore.interface", name.as_bytes()]);
        InterfaceId([hash[0], hash[1], hash[2], hash[3]])
    }

    /// Create an interface id from raw bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        InterfaceId(bytes)
    }

    /// Raw bytes of the interface id.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// 32-byte stable identity of one installed extension instance.
///
/// The identity stays fixed across implementation upgrades of the extension;
/// it is the key under which the extension's proxy (and therefore its
/// persistent storage) lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtensionId([u8; 32]);

impl ExtensionId {
    /// Create an extension id from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ExtensionId(bytes)
    }

    /// Raw bytes of the id.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}
