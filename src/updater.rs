//! Host extension points, wired to the release checker and package installer
//!
//! The host calls into an [`UpdateSource`] from three places: its periodic
//! update check, its "more info" request, and the end of package extraction.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::config::UpdaterConfig;
use crate::error::{FeedError, InstallError};
use crate::host::PluginHost;
use crate::install::{FileMover, InstallResult, LocalFileMover, PackageInstaller};
use crate::plugin::PluginProfile;
use crate::release::github::{GithubReleaseFeed, ReleaseFeed};
use crate::release::{PluginInformation, ReleaseChecker, UpdateDescriptor};

/// Host action name for plugin detail requests.
pub const PLUGIN_INFORMATION: &str = "plugin_information";

/// The host's periodic update-check result set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCheck {
    /// Basename to installed version, filled in by the host before it asks
    pub checked: BTreeMap<String, String>,
    /// Basename to available update
    pub response: BTreeMap<String, UpdateDescriptor>,
}

/// Callbacks a host framework invokes for one updatable plugin.
#[allow(async_fn_in_trait)]
pub trait UpdateSource {
    /// Contribute an update to the host's result set, if one exists.
    async fn check(&self, update_check: &mut UpdateCheck);

    /// Answer a detail request. `None` leaves the host's own answer in place.
    async fn describe(&self, action: &str, slug: &str) -> Option<PluginInformation>;

    /// Relocate a freshly extracted package and restore activation.
    fn finalize(&self, destination: &Path) -> Result<InstallResult, InstallError>;
}

/// GitHub-release backed [`UpdateSource`].
pub struct GithubUpdater<H, F = GithubReleaseFeed, M = LocalFileMover> {
    repository: String,
    installed_version: String,
    checker: ReleaseChecker<F>,
    installer: PackageInstaller<M>,
    host: H,
}

impl<H: PluginHost> GithubUpdater<H> {
    /// Build the production updater: reqwest feed, std filesystem mover.
    ///
    /// The installed version is read from the main plugin file header.
    pub fn from_config(config: &UpdaterConfig, host: H) -> Result<Self, FeedError> {
        let profile = PluginProfile::from_config(config);
        let installed_version = profile.plugin.installed_version(&config.plugins_dir);
        let feed = GithubReleaseFeed::new(&config.api_base, &config.user_agent(&installed_version))?;

        Ok(Self::new(
            config.repository.clone(),
            installed_version,
            ReleaseChecker::new(feed, profile),
            PackageInstaller::from_config(config, LocalFileMover),
            host,
        ))
    }
}

impl<H, F, M> GithubUpdater<H, F, M>
where
    H: PluginHost,
    F: ReleaseFeed,
    M: FileMover,
{
    pub fn new(
        repository: String,
        installed_version: String,
        checker: ReleaseChecker<F>,
        installer: PackageInstaller<M>,
        host: H,
    ) -> Self {
        Self {
            repository,
            installed_version,
            checker,
            installer,
            host,
        }
    }

    pub fn installed_version(&self) -> &str {
        &self.installed_version
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn basename(&self) -> &str {
        self.checker.profile().plugin.basename()
    }
}

impl<H, F, M> UpdateSource for GithubUpdater<H, F, M>
where
    H: PluginHost,
    F: ReleaseFeed,
    M: FileMover,
{
    async fn check(&self, update_check: &mut UpdateCheck) {
        // The host fills `checked` on its real check; an empty set is a pre-save pass
        if update_check.checked.is_empty() {
            debug!("Host update check has no checked plugins, skipping release check");
            return;
        }

        if let Some(update) = self
            .checker
            .check_for_update(&self.repository, &self.installed_version)
            .await
        {
            update_check
                .response
                .insert(self.basename().to_string(), update);
        }
    }

    async fn describe(&self, action: &str, slug: &str) -> Option<PluginInformation> {
        if action != PLUGIN_INFORMATION || slug != self.checker.profile().slug() {
            return None;
        }
        self.checker.describe(&self.repository).await
    }

    fn finalize(&self, destination: &Path) -> Result<InstallResult, InstallError> {
        let was_active = self.host.is_active(self.basename());
        let slug = self.checker.profile().slug();
        self.installer
            .finalize_install(&self.host, destination, &slug, was_active)
    }
}
