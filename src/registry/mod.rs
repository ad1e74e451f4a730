//! Extension registry.
//!
//! The mutable bookkeeping of a modular host: which extensions are installed,
//! which selectors they own (routed functions and lifecycle callbacks), and
//! which interfaces the installed set currently grants. Install, uninstall,
//! and update keep all four tables mutually consistent; conflicting claims
//! fail atomically with no partial mutation.

mod error;
mod manifest;
mod registry;
mod tables;

pub use error::{RegistryError, RegistryResult};
pub use manifest::{CallbackManifest, CallbackMode, CallbackValidation, SupportedCallback};
pub use registry::{ExtensionRegistry, InstalledExtension};
