//! Call context and storage handed to extension code.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Address;

/// Byte-keyed key/value storage owned by a proxy or by the host.
///
/// Extensions see storage only through a [`CallContext`]; which storage a
/// context wraps is decided by the dispatcher from the routed entry's call
/// type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Storage {
    slots: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Storage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.slots.get(key).map(Vec::as_slice)
    }

    /// Write a slot.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.slots.insert(key.into(), value.into());
    }

    /// Delete a slot, returning its previous value.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.slots.remove(key)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Failure payload raised by extension code.
///
/// The dispatcher forwards the payload verbatim to the original caller; it
/// never wraps or rewrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revert {
    /// Raw revert payload. May be empty.
    pub data: Vec<u8>,
}

impl Revert {
    /// A revert with no payload.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A revert carrying a UTF-8 message as its payload.
    pub fn msg(message: impl Into<String>) -> Self {
        Revert {
            data: message.into().into_bytes(),
        }
    }

    /// A revert carrying raw payload bytes.
    pub fn with_data(data: Vec<u8>) -> Self {
        Revert { data }
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for Revert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "execution reverted")
        } else {
            write!(f, "{}", String::from_utf8_lossy(&self.data))
        }
    }
}

/// Render a revert payload as an error-message suffix.
pub(crate) fn render_revert(data: &[u8]) -> String {
    if data.is_empty() {
        String::new()
    } else {
        format!(": {}", String::from_utf8_lossy(data))
    }
}

/// Execution context passed into an extension for one call.
///
/// Carries the original caller, any attached value, and a storage handle.
/// A read-only context rejects writes, which is what gives
/// [`CallType::StaticCall`](super::CallType::StaticCall) its semantics.
pub struct CallContext<'a> {
    caller: Address,
    value: u128,
    storage: &'a mut Storage,
    read_only: bool,
}

impl<'a> CallContext<'a> {
    /// Create a writable context.
    pub fn new(caller: Address, value: u128, storage: &'a mut Storage) -> Self {
        CallContext {
            caller,
            value,
            storage,
            read_only: false,
        }
    }

    /// Create a read-only context. Carries no value.
    pub fn read_only(caller: Address, storage: &'a mut Storage) -> Self {
        CallContext {
            caller,
            value: 0,
            storage,
            read_only: true,
        }
    }

    /// The original caller of the enclosing operation.
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Value attached to the call.
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Check if this context forbids writes.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Read a storage slot.
    pub fn load(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.storage.get(key).map(<[u8]>::to_vec)
    }

    /// Write a storage slot. Reverts on a read-only context.
    pub fn store(
        &mut self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Result<(), Revert> {
        if self.read_only {
            return Err(Revert::msg("write attempted in read-only call"));
        }
        self.storage.set(key, value);
        Ok(())
    }

    /// Delete a storage slot. Reverts on a read-only context.
    pub fn erase(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, Revert> {
        if self.read_only {
            return Err(Revert::msg("write attempted in read-only call"));
        }
        Ok(self.storage.remove(key))
    }
}
