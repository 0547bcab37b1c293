use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::release::github::GITHUB_API_BASE;

/// Updater configuration (mirrors the shipped plugin's defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// `owner/name` of the release repository; empty disables update checks
    pub repository: String,
    /// Main plugin file relative to `plugins_dir`
    pub plugin_basename: String,
    /// Install directory name used when the basename has no directory part
    pub default_slug: String,
    pub plugin_name: String,
    pub author: String,
    pub author_url: String,
    /// "More info" description shown when a release has no body
    pub description: String,
    pub plugins_dir: PathBuf,
    pub site_url: String,
    /// Host platform version, reported as the "tested against" field
    pub host_version: String,
    pub requires_host: String,
    pub api_base: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            repository: "hutchmedia/hutchx-css-override".into(),
            plugin_basename: "hutchx-css-override/hutchx-css-override.php".into(),
            default_slug: "hutchx-css-override".into(),
            plugin_name: "HutchX CSS Override".into(),
            author: "HutchX".into(),
            author_url: "https://hutchx.com/".into(),
            description: "Managed CSS, header scripts, external-link behaviour, and login logo."
                .into(),
            plugins_dir: PathBuf::from("/var/www/html/wp-content/plugins"),
            site_url: "http://localhost/".into(),
            host_version: "6.6".into(),
            requires_host: "5.0".into(),
            api_base: GITHUB_API_BASE.into(),
        }
    }
}

impl UpdaterConfig {
    /// Load config from `path`, writing the defaults there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config not found at {}, creating default configuration", path.display());

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }

            let default_toml = toml::to_string_pretty(&Self::default())
                .context("Failed to serialize default config")?;
            fs::write(path, default_toml).context("Failed to write config file")?;
        }

        let cfg_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: Self = toml::from_str(&cfg_str)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        info!("Using updater config from: {}", path.display());
        Ok(cfg)
    }

    /// User agent sent to the release feed.
    pub fn user_agent(&self, installed_version: &str) -> String {
        format!(
            "{}/{}; {}",
            self.plugin_name.replace(' ', "-"),
            installed_version,
            self.site_url
        )
    }
}

/// `<config dir>/hutchx-override/updater.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("hutchx-override").join("updater.toml"))
}
