//! Site override settings and their once-only defaults
//!
//! Persistence belongs to the host; this module only names the keys, knows
//! their defaults, and reads them back as a typed view.

use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;
use serde::{Deserialize, Serialize};

pub const CUSTOM_CSS: &str = "hutchx_custom_css";
pub const HEADER_SCRIPTS: &str = "hutchx_header_scripts";
pub const OPEN_EXTERNAL_LINKS: &str = "hutchx_open_external_links";
pub const LOGIN_LOGO_URL: &str = "hutchx_login_logo_url";

/// A stored option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Text(String),
}

impl SettingValue {
    fn as_text(&self) -> String {
        match self {
            SettingValue::Text(s) => s.clone(),
            SettingValue::Int(i) => i.to_string(),
        }
    }

    /// Loose truthiness: `0`, `""` and `"0"` are false.
    fn as_flag(&self) -> bool {
        match self {
            SettingValue::Int(i) => *i != 0,
            SettingValue::Text(s) => {
                let s = s.trim();
                !s.is_empty() && s != "0"
            }
        }
    }
}

/// Host option storage.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue>;

    /// Store `value` under `key` only if the key is absent. Returns whether it was added.
    fn add(&self, key: &str, value: SettingValue) -> bool;
}

/// Default for every setting this plugin owns.
pub fn defaults() -> [(&'static str, SettingValue); 4] {
    [
        (CUSTOM_CSS, SettingValue::Text(String::new())),
        (HEADER_SCRIPTS, SettingValue::Text(String::new())),
        (OPEN_EXTERNAL_LINKS, SettingValue::Int(1)),
        (LOGIN_LOGO_URL, SettingValue::Text(String::new())),
    ]
}

/// Seed defaults on activation. Existing values are never overwritten.
pub fn seed_defaults<S: SettingsStore + ?Sized>(store: &S) -> usize {
    let mut added = 0;
    for (key, value) in defaults() {
        if store.add(key, value) {
            debug!("Seeded default for {}", key);
            added += 1;
        }
    }
    added
}

/// Typed view of the site overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub custom_css: String,
    pub header_scripts: String,
    pub open_external_links: bool,
    pub login_logo_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            custom_css: String::new(),
            header_scripts: String::new(),
            open_external_links: true,
            login_logo_url: String::new(),
        }
    }
}

impl SiteSettings {
    /// Read every setting, using the default for anything missing.
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();
        Self {
            custom_css: store
                .get(CUSTOM_CSS)
                .map(|v| v.as_text())
                .unwrap_or(defaults.custom_css),
            header_scripts: store
                .get(HEADER_SCRIPTS)
                .map(|v| v.as_text())
                .unwrap_or(defaults.header_scripts),
            open_external_links: store
                .get(OPEN_EXTERNAL_LINKS)
                .map(|v| v.as_flag())
                .unwrap_or(defaults.open_external_links),
            login_logo_url: store
                .get(LOGIN_LOGO_URL)
                .map(|v| v.as_text().trim().to_string())
                .unwrap_or(defaults.login_logo_url),
        }
    }
}

/// In-process store for hosts without their own persistence.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, SettingValue>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional write, the equivalent of an admin saving the form.
    pub fn set(&self, key: &str, value: SettingValue) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value);
        }
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn add(&self, key: &str, value: SettingValue) -> bool {
        let Ok(mut values) = self.values.write() else {
            return false;
        };
        if values.contains_key(key) {
            return false;
        }
        values.insert(key.to_string(), value);
        true
    }
}
