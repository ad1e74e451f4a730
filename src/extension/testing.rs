//! Scripted extensions shared by the registry, dispatch, and host unit tests.

use std::sync::Arc;

use super::{CallContext, ExtensionConfig, ExtensionContract, Revert};
use crate::types::Selector;

/// Extension driven entirely by its declared config.
///
/// `call` stores the input under the selector's bytes on a writable context
/// and echoes it back; on a read-only context it returns the current value of
/// that slot. The lifecycle hooks record markers in proxy storage, or revert
/// when scripted to fail.
pub(crate) struct ScriptedExtension {
    config: ExtensionConfig,
    fail_install: Option<Revert>,
    fail_uninstall: Option<Revert>,
}

impl ScriptedExtension {
    pub(crate) fn new(config: ExtensionConfig) -> Self {
        ScriptedExtension {
            config,
            fail_install: None,
            fail_uninstall: None,
        }
    }

    pub(crate) fn shared(config: ExtensionConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    pub(crate) fn failing_install(config: ExtensionConfig, revert: Revert) -> Arc<Self> {
        Arc::new(ScriptedExtension {
            config,
            fail_install: Some(revert),
            fail_uninstall: None,
        })
    }

    pub(crate) fn failing_uninstall(config: ExtensionConfig, revert: Revert) -> Arc<Self> {
        Arc::new(ScriptedExtension {
            config,
            fail_install: None,
            fail_uninstall: Some(revert),
        })
    }
}

impl ExtensionContract for ScriptedExtension {
    fn extension_config(&self) -> ExtensionConfig {
        self.config.clone()
    }

    fn on_install(&self, ctx: &mut CallContext<'_>, data: &[u8]) -> Result<(), Revert> {
        if let Some(revert) = &self.fail_install {
            return Err(revert.clone());
        }
        ctx.store(b"installed".to_vec(), data.to_vec())?;
        Ok(())
    }

    fn on_uninstall(&self, ctx: &mut CallContext<'_>, data: &[u8]) -> Result<(), Revert> {
        if let Some(revert) = &self.fail_uninstall {
            return Err(revert.clone());
        }
        ctx.store(b"uninstalled".to_vec(), data.to_vec())?;
        Ok(())
    }

    fn call(
        &self,
        ctx: &mut CallContext<'_>,
        selector: Selector,
        input: &[u8],
    ) -> Result<Vec<u8>, Revert> {
        let key = selector.as_bytes().to_vec();
        if ctx.is_read_only() {
            Ok(ctx.load(&key).unwrap_or_default())
        } else {
            ctx.store(key, input.to_vec())?;
            Ok(input.to_vec())
        }
    }
}

/// Extension whose routed calls always revert with the given payload.
pub(crate) struct RevertingExtension {
    config: ExtensionConfig,
    revert: Revert,
}

impl RevertingExtension {
    pub(crate) fn shared(config: ExtensionConfig, revert: Revert) -> Arc<Self> {
        Arc::new(RevertingExtension { config, revert })
    }
}

impl ExtensionContract for RevertingExtension {
    fn extension_config(&self) -> ExtensionConfig {
        self.config.clone()
    }

    fn call(
        &self,
        _ctx: &mut CallContext<'_>,
        _selector: Selector,
        _input: &[u8],
    ) -> Result<Vec<u8>, Revert> {
        Err(self.revert.clone())
    }
}
