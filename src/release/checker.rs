//! Best-effort update check against the release feed
//!
//! Every failure on this path collapses into "no update". The check runs on
//! top of the host's own scheduled check, so it must never break page
//! rendering or an admin action.

use log::{debug, info, warn};

use super::github::{ReleaseFeed, RepoId};
use super::sanitize::sanitize_notes;
use super::types::{InfoSections, PluginInformation, ReleaseInfo, UpdateDescriptor, UpdateMetadata};
use super::version::{is_newer, normalize_tag};
use crate::plugin::PluginProfile;

/// Compares the latest release of a repository against the installed version.
#[derive(Debug, Clone)]
pub struct ReleaseChecker<F> {
    feed: F,
    profile: PluginProfile,
}

impl<F: ReleaseFeed> ReleaseChecker<F> {
    pub fn new(feed: F, profile: PluginProfile) -> Self {
        Self { feed, profile }
    }

    pub fn profile(&self) -> &PluginProfile {
        &self.profile
    }

    /// Describe an update when `repo_id` has a strictly newer, installable release.
    pub async fn check_for_update(
        &self,
        repo_id: &str,
        current_version: &str,
    ) -> Option<UpdateDescriptor> {
        let repo = configured_repo(repo_id)?;
        let release = self.fetch(&repo).await?;

        if release.normalized_version.is_empty() {
            debug!("Latest release of {} has no usable tag", repo);
            return None;
        }

        if !is_newer(&release.normalized_version, current_version) {
            debug!(
                "{} is up to date ({} >= {})",
                self.profile.slug(),
                current_version,
                release.normalized_version
            );
            return None;
        }

        if release.download_url.is_empty() {
            warn!(
                "Release {} of {} has no package URL, not offering it",
                release.tag, repo
            );
            return None;
        }

        info!(
            "Update available for {}: {} -> {}",
            self.profile.slug(),
            current_version,
            release.normalized_version
        );

        Some(UpdateDescriptor {
            slug: self.profile.slug(),
            plugin: self.profile.plugin.basename().to_string(),
            current_version: current_version.to_string(),
            new_version: release.normalized_version,
            package_url: release.download_url,
            metadata: UpdateMetadata {
                homepage_url: repo.homepage(),
                tested_against: self.profile.tested_against.clone(),
                minimum_host_version: self.profile.requires_host.clone(),
                notes: sanitize_notes(&release.notes),
            },
        })
    }

    /// Latest release details for the "more info" view.
    pub async fn fetch_release_details(&self, repo_id: &str) -> Option<ReleaseInfo> {
        let repo = configured_repo(repo_id)?;
        self.fetch(&repo).await
    }

    /// Build the "more info" payload from the latest release.
    pub async fn describe(&self, repo_id: &str) -> Option<PluginInformation> {
        let repo = configured_repo(repo_id)?;
        let release = self.fetch(&repo).await?;

        let description = if release.notes.is_empty() {
            self.profile.fallback_description.clone()
        } else {
            release.notes.clone()
        };

        Some(PluginInformation {
            name: self.profile.name.clone(),
            slug: self.profile.slug(),
            version: release.normalized_version,
            author: format!(
                "<a href=\"{}\">{}</a>",
                self.profile.author_url, self.profile.author
            ),
            homepage: repo.homepage(),
            download_link: release.download_url,
            sections: InfoSections {
                description: sanitize_notes(&description),
                changelog: sanitize_notes(&release.notes),
            },
        })
    }

    async fn fetch(&self, repo: &RepoId) -> Option<ReleaseInfo> {
        let release = match self.feed.latest_release(repo).await {
            Ok(release) => release,
            Err(e) => {
                warn!("Update check for {} skipped: {}", repo, e);
                return None;
            }
        };

        let tag = release.tag_name.unwrap_or_default();
        let normalized_version = normalize_tag(tag.trim());
        Some(ReleaseInfo {
            name: release.name.filter(|n| !n.is_empty()).unwrap_or_else(|| tag.clone()),
            normalized_version,
            download_url: release.zipball_url.unwrap_or_default(),
            notes: release.body.unwrap_or_default(),
            tag,
        })
    }
}

/// Empty means "updates disabled", which is not an error.
fn configured_repo(repo_id: &str) -> Option<RepoId> {
    if repo_id.trim().is_empty() {
        return None;
    }
    let repo = RepoId::parse(repo_id);
    if repo.is_none() {
        warn!("Ignoring malformed release repository '{}', expected owner/name", repo_id);
    }
    repo
}
