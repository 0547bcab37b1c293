//! Directory relocation for freshly extracted packages.
//!
//! The destination is moved aside before the new tree is renamed into place,
//! so a failed move leaves the previous install where it was.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

/// Host-provided primitive that moves a directory tree.
pub trait FileMover {
    /// Move `from` to `to`. With `overwrite`, an existing `to` is replaced.
    fn move_dir(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()>;
}

/// `std::fs` mover: rename when possible, copy + remove across filesystems.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileMover;

impl FileMover for LocalFileMover {
    fn move_dir(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()> {
        move_dir_with(from, to, overwrite, |from, to| fs::rename(from, to))
    }
}

/// `rename` moves `from` onto `to`; its failure switches to copy + remove.
fn move_dir_with<R>(from: &Path, to: &Path, overwrite: bool, rename: R) -> io::Result<()>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    if !from.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", from.display()),
        ));
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    let backup = if to.exists() {
        if !overwrite {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        let backup = backup_path(to);
        fs::rename(to, &backup)?;
        Some(backup)
    } else {
        None
    };

    match relocate(from, to, rename) {
        Ok(()) => {
            if let Some(backup) = backup
                && let Err(e) = remove_path(&backup)
            {
                warn!("Failed to remove previous install {}: {}", backup.display(), e);
            }
            Ok(())
        }
        Err(e) => {
            if to.exists()
                && let Err(cleanup) = remove_path(to)
            {
                warn!("Failed to remove partial install {}: {}", to.display(), cleanup);
            }
            if let Some(backup) = backup
                && let Err(restore) = fs::rename(&backup, to)
            {
                warn!(
                    "Failed to restore previous install {} from {}: {}",
                    to.display(),
                    backup.display(),
                    restore
                );
            }
            Err(e)
        }
    }
}

fn relocate<R>(from: &Path, to: &Path, rename: R) -> io::Result<()>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    match rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(
                "rename {} -> {} failed ({}), falling back to copy",
                from.display(),
                to.display(),
                e
            );
            if let Err(copy_err) = copy_tree(from, to) {
                let _ = remove_path(to);
                return Err(copy_err);
            }
            // The new tree is in place; a leftover source is only clutter
            if let Err(cleanup) = fs::remove_dir_all(from) {
                warn!("Copied {} but could not remove it: {}", from.display(), cleanup);
            }
            Ok(())
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(from).map_err(io::Error::other)?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.previous-{}", name, std::process::id()))
}
