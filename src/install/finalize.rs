//! Post-extraction step: canonical install location and activation state

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use super::file_ops::FileMover;
use crate::config::UpdaterConfig;
use crate::error::InstallError;
use crate::host::PluginHost;
use crate::plugin::PluginRef;

/// Where the package ended up and what was done to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    pub final_path: PathBuf,
    pub was_moved: bool,
    pub reactivated: bool,
}

/// Moves an extracted package to `{plugins_dir}/{slug}` and re-enables it.
#[derive(Debug, Clone)]
pub struct PackageInstaller<M> {
    plugins_dir: PathBuf,
    plugin: PluginRef,
    default_slug: String,
    mover: M,
}

impl<M: FileMover> PackageInstaller<M> {
    pub fn new(plugins_dir: PathBuf, plugin: PluginRef, default_slug: String, mover: M) -> Self {
        Self {
            plugins_dir,
            plugin,
            default_slug,
            mover,
        }
    }

    pub fn from_config(config: &UpdaterConfig, mover: M) -> Self {
        Self::new(
            config.plugins_dir.clone(),
            PluginRef::new(&config.plugin_basename),
            config.default_slug.clone(),
            mover,
        )
    }

    /// Install directory for `slug`, falling back to the default slug.
    pub fn canonical_path(&self, slug: &str) -> PathBuf {
        let slug = slug.trim_matches('/');
        if slug.is_empty() || slug == "." {
            self.plugins_dir.join(&self.default_slug)
        } else {
            self.plugins_dir.join(slug)
        }
    }

    /// Relocate `extracted_path` to the canonical directory for `canonical_slug`.
    ///
    /// A failed move is logged and the package stays where the host extracted
    /// it. Only a failed re-activation is returned as an error.
    pub fn finalize_install<H: PluginHost + ?Sized>(
        &self,
        host: &H,
        extracted_path: &Path,
        canonical_slug: &str,
        was_active_before_update: bool,
    ) -> Result<InstallResult, InstallError> {
        let destination = self.canonical_path(canonical_slug);

        let (final_path, was_moved) = if extracted_path == destination {
            (destination, false)
        } else {
            match self.mover.move_dir(extracted_path, &destination, true) {
                Ok(()) => {
                    info!(
                        "Moved update package {} -> {}",
                        extracted_path.display(),
                        destination.display()
                    );
                    (destination, true)
                }
                Err(e) => {
                    warn!(
                        "Could not move update package {} -> {}: {}; keeping host destination",
                        extracted_path.display(),
                        destination.display(),
                        e
                    );
                    (extracted_path.to_path_buf(), false)
                }
            }
        };

        let mut reactivated = false;
        if was_active_before_update {
            let plugin = self.plugin.basename();
            host.activate(plugin)
                .map_err(|reason| InstallError::Reactivation {
                    plugin: plugin.to_string(),
                    final_path: final_path.clone(),
                    reason,
                })?;
            info!("Reactivated {}", plugin);
            reactivated = true;
        }

        Ok(InstallResult {
            final_path,
            was_moved,
            reactivated,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;

    use anyhow::anyhow;

    use super::*;

    #[derive(Default)]
    struct RecordingMover {
        fail: bool,
        moves: RefCell<Vec<(PathBuf, PathBuf, bool)>>,
    }

    impl FileMover for &RecordingMover {
        fn move_dir(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()> {
            self.moves
                .borrow_mut()
                .push((from.to_path_buf(), to.to_path_buf(), overwrite));
            if self.fail {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct FakeHost {
        refuse: bool,
        activated: RefCell<Vec<String>>,
    }

    impl PluginHost for FakeHost {
        fn is_active(&self, _plugin: &str) -> bool {
            true
        }

        fn activate(&self, plugin: &str) -> anyhow::Result<()> {
            self.activated.borrow_mut().push(plugin.to_string());
            if self.refuse {
                Err(anyhow!("Plugin file does not exist."))
            } else {
                Ok(())
            }
        }
    }

    fn installer(mover: &RecordingMover) -> PackageInstaller<&RecordingMover> {
        PackageInstaller::new(
            PathBuf::from("/srv/plugins"),
            PluginRef::new("widget/widget.php"),
            "widget".to_string(),
            mover,
        )
    }

    #[test]
    fn test_canonical_path_falls_back_to_default_slug() {
        let mover = RecordingMover::default();
        let installer = installer(&mover);
        assert_eq!(installer.canonical_path("widget"), PathBuf::from("/srv/plugins/widget"));
        assert_eq!(installer.canonical_path("."), PathBuf::from("/srv/plugins/widget"));
        assert_eq!(installer.canonical_path(""), PathBuf::from("/srv/plugins/widget"));
    }

    #[test]
    fn test_already_canonical_is_not_moved() {
        let mover = RecordingMover::default();
        let host = FakeHost::default();

        let result = installer(&mover)
            .finalize_install(&host, Path::new("/srv/plugins/widget/"), "widget", false)
            .unwrap();

        assert_eq!(
            result,
            InstallResult {
                final_path: PathBuf::from("/srv/plugins/widget"),
                was_moved: false,
                reactivated: false,
            }
        );
        assert!(mover.moves.borrow().is_empty());
        assert!(host.activated.borrow().is_empty());
    }

    #[test]
    fn test_generated_directory_is_moved_with_overwrite() {
        let mover = RecordingMover::default();
        let host = FakeHost::default();

        let result = installer(&mover)
            .finalize_install(&host, Path::new("/srv/plugins/acme-widget-1a2b3c"), "widget", true)
            .unwrap();

        assert_eq!(result.final_path, PathBuf::from("/srv/plugins/widget"));
        assert!(result.was_moved);
        assert!(result.reactivated);
        assert_eq!(
            *mover.moves.borrow(),
            vec![(
                PathBuf::from("/srv/plugins/acme-widget-1a2b3c"),
                PathBuf::from("/srv/plugins/widget"),
                true
            )]
        );
        assert_eq!(*host.activated.borrow(), vec!["widget/widget.php".to_string()]);
    }

    #[test]
    fn test_failed_move_keeps_host_destination() {
        let mover = RecordingMover {
            fail: true,
            ..Default::default()
        };
        let host = FakeHost::default();

        let result = installer(&mover)
            .finalize_install(&host, Path::new("/tmp/upgrade/acme-widget-1a2b3c"), "widget", false)
            .unwrap();

        assert_eq!(result.final_path, PathBuf::from("/tmp/upgrade/acme-widget-1a2b3c"));
        assert!(!result.was_moved);
        assert!(!result.reactivated);
    }

    #[test]
    fn test_reactivation_failure_is_reported() {
        let mover = RecordingMover::default();
        let host = FakeHost {
            refuse: true,
            ..Default::default()
        };

        let err = installer(&mover)
            .finalize_install(&host, Path::new("/srv/plugins/acme-widget-1a2b3c"), "widget", true)
            .unwrap_err();

        let InstallError::Reactivation { plugin, final_path, .. } = &err;
        assert_eq!(plugin, "widget/widget.php");
        assert_eq!(final_path, &PathBuf::from("/srv/plugins/widget"));
        assert!(err.to_string().contains("Plugin file does not exist."));
        assert_eq!(host.activated.borrow().len(), 1);
    }
}
