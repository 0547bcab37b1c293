//! The plugin's own identity: basename, slug, and header fields

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use regex::Regex;

use crate::config::UpdaterConfig;

/// Version reported when the main plugin file has no usable header.
pub const UNKNOWN_VERSION: &str = "0.0.0";

/// Only the start of the main file is scanned for header fields.
const HEADER_SCAN_BYTES: u64 = 8 * 1024;

/// Main plugin file, relative to the plugins directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRef {
    basename: String,
}

impl PluginRef {
    pub fn new(basename: impl Into<String>) -> Self {
        Self {
            basename: basename.into().trim_matches('/').to_string(),
        }
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Directory part of the basename, or the file stem for a single-file plugin.
    pub fn slug(&self) -> String {
        let path = Path::new(&self.basename);
        match path.parent().and_then(|p| p.to_str()) {
            Some(dir) if !dir.is_empty() && dir != "." => dir.to_string(),
            _ => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Absolute path of the main file under `plugins_dir`.
    pub fn main_file(&self, plugins_dir: &Path) -> PathBuf {
        plugins_dir.join(&self.basename)
    }

    /// Installed version from the main file header.
    pub fn installed_version(&self, plugins_dir: &Path) -> String {
        let path = self.main_file(plugins_dir);
        match PluginHeader::read(&path) {
            Ok(header) => header.version.unwrap_or_else(|| {
                debug!("No Version header in {}", path.display());
                UNKNOWN_VERSION.to_string()
            }),
            Err(e) => {
                warn!("Could not read plugin header {}: {e:#}", path.display());
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}

/// Header fields declared in the comment block at the top of the main file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginHeader {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

impl PluginHeader {
    /// Read and parse the header of the file at `path`.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let mut head = Vec::new();
        file.take(HEADER_SCAN_BYTES).read_to_end(&mut head)?;
        Ok(Self::parse(&String::from_utf8_lossy(&head)))
    }

    pub fn parse(text: &str) -> Self {
        Self {
            name: header_field(text, "Plugin Name"),
            version: header_field(text, "Version"),
            author: header_field(text, "Author"),
            description: header_field(text, "Description"),
        }
    }
}

fn header_field(text: &str, field: &str) -> Option<String> {
    let pattern = format!(r"(?mi)^[ \t/*#@]*{}:(.*)$", regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(text)?.get(1)?.as_str();

    // a header on the comment's last line carries the closer with it
    let value = [raw.find("*/"), raw.find("?>")]
        .into_iter()
        .flatten()
        .min()
        .map_or(raw, |end| &raw[..end])
        .trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Everything the checker needs to describe this plugin to the host.
#[derive(Debug, Clone)]
pub struct PluginProfile {
    pub plugin: PluginRef,
    pub name: String,
    pub author: String,
    pub author_url: String,
    pub fallback_description: String,
    pub tested_against: String,
    pub requires_host: String,
}

impl PluginProfile {
    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self {
            plugin: PluginRef::new(&config.plugin_basename),
            name: config.plugin_name.clone(),
            author: config.author.clone(),
            author_url: config.author_url.clone(),
            fallback_description: config.description.clone(),
            tested_against: config.host_version.clone(),
            requires_host: config.requires_host.clone(),
        }
    }

    pub fn slug(&self) -> String {
        self.plugin.slug()
    }
}
