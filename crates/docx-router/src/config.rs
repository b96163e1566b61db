// File: src/config.rs
// Purpose: Configuration parsing from docx.toml

use crate::alias::AliasTable;
use crate::loader::{ManifestSource, ModuleSource, DEFAULT_GLOB};
use crate::Router;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Extra alias tokens layered over the standard set
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Directory containing route files (default: "routes")
    #[serde(default = "default_routes_dir")]
    pub routes_dir: String,

    /// Route file replayed onto the root node, relative to `routes_dir`
    #[serde(default)]
    pub root: Option<String>,

    /// File pattern used when exposing `routes_dir` on the root (default: "*.toml")
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Whether the root node exposes `routes_dir` (default: true)
    #[serde(default = "default_true")]
    pub expose_root: bool,
}

// Default values
fn default_routes_dir() -> String {
    "routes".to_string()
}

fn default_pattern() -> String {
    DEFAULT_GLOB.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routes_dir: default_routes_dir(),
            root: None,
            pattern: default_pattern(),
            expose_root: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        // Relative routes_dir is taken relative to the config file
        if let Some(parent) = path.parent() {
            let routes_dir = Path::new(&config.routing.routes_dir);
            if routes_dir.is_relative() && !parent.as_os_str().is_empty() {
                config.routing.routes_dir = parent.join(routes_dir).to_string_lossy().into_owned();
            }
        }

        Ok(config)
    }

    /// Load configuration from default path (./docx.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("docx.toml")
    }

    pub fn routes_dir(&self) -> PathBuf {
        PathBuf::from(&self.routing.routes_dir)
    }

    /// Standard aliases plus the configured ones
    pub fn alias_table(&self) -> Result<AliasTable> {
        AliasTable::default()
            .extended(&self.aliases)
            .context("Invalid alias in configuration")
    }

    /// Builds a router over the configured route files
    pub fn router(&self) -> Result<Router> {
        let routes_dir = self.routes_dir();
        let root_file = self
            .routing
            .root
            .as_ref()
            .map(|root| routes_dir.join(root).to_string_lossy().into_owned());

        Router::new()
            .with_aliases(self.alias_table()?)
            .with_sources(ManifestSource::new())
            .define(|ctx| {
                if let Some(root_file) = &root_file {
                    ManifestSource::new().register(root_file, ctx)?;
                }
                if self.routing.expose_root {
                    ctx.expose(&routes_dir, &self.routing.pattern);
                }
                Ok(())
            })
            .context("Failed to build root router")
    }
}
