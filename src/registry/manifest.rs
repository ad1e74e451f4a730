//! Host callback manifest.
//!
//! A host statically declares which lifecycle callbacks it will ever trigger
//! and whether each is best-effort or must always have an owning extension.
//! Install-time validation checks extension callback claims against this
//! manifest; dispatch-time lookup decides whether a missing owner is a
//! silent no-op or a hard failure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Selector;

/// Participation policy for one host callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackMode {
    /// Triggering the callback with no owning extension is a no-op.
    Optional,

    /// Some installed extension must own the callback; triggering it without
    /// an owner fails.
    Required,
}

/// One entry of the host's static callback manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedCallback {
    /// Callback selector.
    pub selector: Selector,

    /// Whether an owning extension is required.
    pub mode: CallbackMode,
}

impl SupportedCallback {
    /// An optional callback entry.
    pub fn optional(selector: Selector) -> Self {
        SupportedCallback {
            selector,
            mode: CallbackMode::Optional,
        }
    }

    /// A required callback entry.
    pub fn required(selector: Selector) -> Self {
        SupportedCallback {
            selector,
            mode: CallbackMode::Required,
        }
    }
}

/// Install-time validation policy for callback claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackValidation {
    /// Reject callback claims outside the manifest.
    Strict,

    /// Accept any callback claim; selectors outside the manifest simply
    /// never get triggered by the host.
    Permissive,
}

/// The host's static callback manifest plus its validation policy.
#[derive(Debug, Clone)]
pub struct CallbackManifest {
    entries: HashMap<Selector, CallbackMode>,
    validation: CallbackValidation,
}

impl CallbackManifest {
    /// Build a manifest from its entries.
    pub fn new(entries: Vec<SupportedCallback>, validation: CallbackValidation) -> Self {
        CallbackManifest {
            entries: entries
                .into_iter()
                .map(|entry| (entry.selector, entry.mode))
                .collect(),
            validation,
        }
    }

    /// Participation mode of a declared callback, `None` if undeclared.
    pub fn mode(&self, selector: Selector) -> Option<CallbackMode> {
        self.entries.get(&selector).copied()
    }

    /// Whether an extension may claim this callback selector at install time.
    pub fn allows(&self, selector: Selector) -> bool {
        match self.validation {
            CallbackValidation::Permissive => true,
            CallbackValidation::Strict => self.entries.contains_key(&selector),
        }
    }

    /// The validation policy.
    pub fn validation(&self) -> CallbackValidation {
        self.validation
    }

    /// Number of declared callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no callback is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
