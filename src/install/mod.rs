//! Package finalization after the host has downloaded and extracted an update
//!
//! - `file_ops` - Directory relocation with rollback of the previous install
//! - `finalize` - Canonical install path and activation restore

mod file_ops;
mod finalize;

pub use file_ops::{FileMover, LocalFileMover};
pub use finalize::{InstallResult, PackageInstaller};
