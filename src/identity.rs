//! Extension proxy identity.
//!
//! Every installed extension lives behind a stable [`ExtensionId`] that binds
//! one core instance to one extension slot. Two schemes exist:
//!
//! - **Deterministic** (non-upgradeable hosts): the id is a content hash of
//!   the core address and the implementation address. Reinstalling the same
//!   implementation predicts the same id, so the proxy (and any storage the
//!   extension kept in it) is reused.
//! - **Hash chain** (upgradeable hosts): each install mints
//!   `H(seed, core)` and replaces the seed with the minted id. Every install
//!   gets a fresh identity even for a previously installed implementation,
//!   while `update` re-points an existing identity to a new implementation
//!   without touching the proxy or its storage.
//!
//! The proxy itself is a plain indirection entry: identity, current
//! implementation address, the implementation's code, and persistent storage.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::extension::{ExtensionContract, Storage};
use crate::types::{digest, Address, ExtensionId};

/// Predict the deterministic id for an implementation installed into a core.
///
/// Pure: the same `(core, implementation)` pair always yields the same id,
/// which is what lets the registry answer "is this already installed" and
/// reuse a previously materialized proxy.
pub fn predict_id(core: Address, implementation: Address) -> ExtensionId {
    ExtensionId::from_bytes(digest(&[
        b"modcore.extension",
        core.as_bytes(),
        implementation.as_bytes(),
    ]))
}

/// Derive the next id in a hash chain from the current seed.
pub fn chain_next(seed: ExtensionId, core: Address) -> ExtensionId {
    ExtensionId::from_bytes(digest(&[b"modcore.chain", seed.as_bytes(), core.as_bytes()]))
}

/// Identity-generation scheme used by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityScheme {
    /// `id = H(core, implementation)`; reinstalls reuse the same proxy.
    Deterministic,

    /// Hash-chained ids; every install mints a fresh identity and the
    /// id-to-implementation association can be re-pointed in place.
    HashChain {
        /// Current chain seed, replaced by each newly minted id.
        seed: ExtensionId,
    },
}

impl IdentityScheme {
    /// The deterministic scheme.
    pub fn deterministic() -> Self {
        IdentityScheme::Deterministic
    }

    /// A hash-chain scheme seeded from the core address.
    pub fn hash_chain(core: Address) -> Self {
        IdentityScheme::HashChain {
            seed: ExtensionId::from_bytes(digest(&[b"modcore.chain.genesis", core.as_bytes()])),
        }
    }

    /// Whether this scheme supports in-place implementation updates.
    pub fn is_upgradeable(&self) -> bool {
        matches!(self, IdentityScheme::HashChain { .. })
    }

    /// Compute the id the next install would receive, without committing it.
    pub fn peek_id(&self, core: Address, implementation: Address) -> ExtensionId {
        match self {
            IdentityScheme::Deterministic => predict_id(core, implementation),
            IdentityScheme::HashChain { seed } => chain_next(*seed, core),
        }
    }

    /// Commit a minted id, advancing the chain seed.
    ///
    /// No-op for the deterministic scheme. Called only after an install has
    /// fully validated, so a failed install never burns a seed.
    pub fn advance(&mut self, id: ExtensionId) {
        if let IdentityScheme::HashChain { seed } = self {
            *seed = id;
        }
    }
}

/// Indirection entry for one installed extension.
///
/// The id is the stable lookup key, the implementation behind it can change,
/// and the storage persists for as long as the proxy does.
pub struct ExtensionProxy {
    id: ExtensionId,
    implementation: Address,
    code: Arc<dyn ExtensionContract>,
    storage: Storage,
}

impl ExtensionProxy {
    /// Materialize a proxy with empty storage.
    pub fn new(id: ExtensionId, implementation: Address, code: Arc<dyn ExtensionContract>) -> Self {
        ExtensionProxy {
            id,
            implementation,
            code,
            storage: Storage::new(),
        }
    }

    /// Identity of the proxy.
    pub fn id(&self) -> ExtensionId {
        self.id
    }

    /// Address of the current backing implementation.
    pub fn implementation(&self) -> Address {
        self.implementation
    }

    /// Current backing code.
    pub fn code(&self) -> &Arc<dyn ExtensionContract> {
        &self.code
    }

    /// Read access to the proxy's persistent storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Write access to the proxy's persistent storage.
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Swap the backing implementation. Identity and storage are untouched.
    pub fn upgrade(&mut self, implementation: Address, code: Arc<dyn ExtensionContract>) {
        self.implementation = implementation;
        self.code = code;
    }
}

impl fmt::Debug for ExtensionProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionProxy")
            .field("id", &self.id)
            .field("implementation", &self.implementation)
            .field("storage_slots", &self.storage.len())
            .finish_non_exhaustive()
    }
}
