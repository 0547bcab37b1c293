//! What this crate needs from the hosting plugin framework

use anyhow::Result;

/// Plugin activation state, owned by the host.
pub trait PluginHost {
    /// Whether the plugin identified by `plugin` (its basename) is enabled.
    fn is_active(&self, plugin: &str) -> bool;

    /// Enable the plugin at `plugin`. Errors are shown to the admin by the host.
    fn activate(&self, plugin: &str) -> Result<()>;
}
