//! HutchX site overrides
//!
//! Typed site-override settings plus a self-hosted updater that polls GitHub
//! releases and plugs into a host framework's update extension points.
//!
//! The host owns settings storage, rendering, downloading, and activation.
//! This crate decides whether an update exists, describes it, and puts the
//! extracted package back where the host expects it.

pub mod config;
pub mod error;
pub mod host;
pub mod install;
pub mod plugin;
pub mod release;
pub mod settings;
pub mod updater;

// Public exports
pub use config::{UpdaterConfig, default_config_path};
pub use error::{FeedError, InstallError};
pub use host::PluginHost;
pub use install::{FileMover, InstallResult, LocalFileMover, PackageInstaller};
pub use plugin::{PluginHeader, PluginProfile, PluginRef};
pub use release::{PluginInformation, ReleaseChecker, ReleaseInfo, UpdateDescriptor};
pub use settings::{MemorySettings, SettingValue, SettingsStore, SiteSettings, seed_defaults};
pub use updater::{GithubUpdater, PLUGIN_INFORMATION, UpdateCheck, UpdateSource};
