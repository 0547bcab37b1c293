//! GitHub release discovery and version comparison
//!
//! ## Module Organization
//!
//! - `github` - Release feed client and repository identifiers
//! - `version` - Tag normalization and version ordering
//! - `sanitize` - Allow-list filter for release notes
//! - `types` - Values handed to the host
//! - `checker` - Update check with the swallow-all failure policy

pub mod github;
pub mod sanitize;
pub mod version;
mod checker;
mod types;

// Re-export public API
pub use checker::ReleaseChecker;
pub use types::{InfoSections, PluginInformation, ReleaseInfo, UpdateDescriptor, UpdateMetadata};
