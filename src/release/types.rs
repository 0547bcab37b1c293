//! Values handed from the release checker to the host

use serde::Serialize;

/// Latest published release, as seen on one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseInfo {
    pub tag: String,
    pub normalized_version: String,
    /// Zipball URL, empty when the release has none
    pub download_url: String,
    /// Raw release body
    pub notes: String,
    /// Release title, falls back to the tag
    pub name: String,
}

/// An installable update, only ever built for a strictly newer release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateDescriptor {
    pub slug: String,
    pub plugin: String,
    pub current_version: String,
    pub new_version: String,
    pub package_url: String,
    pub metadata: UpdateMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateMetadata {
    pub homepage_url: String,
    pub tested_against: String,
    pub minimum_host_version: String,
    /// Sanitized release notes
    pub notes: String,
}

/// Payload for the host's "more info" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInformation {
    pub name: String,
    pub slug: String,
    pub version: String,
    /// Author markup, a link to the author's site
    pub author: String,
    pub homepage: String,
    pub download_link: String,
    pub sections: InfoSections,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoSections {
    pub description: String,
    pub changelog: String,
}
