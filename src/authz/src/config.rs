//! Static resolution configuration: universes, aliases and the root identity
//!
//! Loaded once at startup. Missing sections fall back to the production
//! defaults below.
//!
//! ```toml
//! objects = ["news", "account"]
//! actions = ["read", "create", "create_limited"]
//!
//! [aliases]
//! create = ["create", "create_limited"]
//!
//! [root]
//! role = "role:root:0"
//! domain = "dom:Company"
//! ```

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Root identity configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RootConfig {
    #[serde(default = "default_root_role")]
    pub role: String,
    #[serde(default = "default_root_domain")]
    pub domain: String,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            role: default_root_role(),
            domain: default_root_domain(),
        }
    }
}

/// Complete resolution configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatrixConfig {
    /// Object universe, in presentation order
    #[serde(default = "default_objects")]
    pub objects: Vec<String>,

    /// Action universe, in presentation order
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,

    /// Alias token → canonical actions
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub root: RootConfig,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            objects: default_objects(),
            actions: default_actions(),
            aliases: default_aliases(),
            root: RootConfig::default(),
        }
    }
}

impl MatrixConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| AuthzError::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            objects = config.objects.len(),
            actions = config.actions.len(),
            aliases = config.aliases.len(),
            "Loaded matrix configuration"
        );
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AuthzError::InvalidConfig(format!("Failed to render config: {}", e)))
    }
}

fn default_root_role() -> String {
    "role:root:0".to_string()
}

fn default_root_domain() -> String {
    "dom:Company".to_string()
}

fn default_objects() -> Vec<String> {
    [
        "account",
        "location",
        "organiser",
        "period",
        "exhibition",
        "news_tag",
        "news",
        "request_form",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_actions() -> Vec<String> {
    [
        "read",
        "create",
        "update",
        "delete",
        "create_limited",
        "update_limited",
        "delete_limited",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_aliases() -> BTreeMap<String, Vec<String>> {
    fn entry(key: &str, actions: &[&str]) -> (String, Vec<String>) {
        (key.to_string(), actions.iter().map(|s| s.to_string()).collect())
    }

    BTreeMap::from([
        entry("all", &[
            "read",
            "create",
            "update",
            "delete",
            "create_limited",
            "update_limited",
            "delete_limited",
        ]),
        entry("all_limited", &["read", "create_limited", "update_limited", "delete_limited"]),
        entry("create", &["create", "create_limited"]),
        entry("update", &["update", "update_limited"]),
        entry("delete", &["delete", "delete_limited"]),
    ])
}
