use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Version token meaning "whatever the repository's latest release is".
pub const LATEST: &str = "latest";

const DEFAULT_BASE_URL: &str = "https://github.com";

/// CSS selector locating asset anchors on a release page. Overridable in the
/// config file; a selector that fails to parse is a configuration error.
const DEFAULT_SELECTOR: &str = ".Box a[href]";

/// Runtime configuration, passed explicitly into the pipeline so tests can
/// inject fixture endpoints and scratch directories.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repositories to install, in order.
    pub repos: Vec<RepoConfig>,
    /// Asset anchor selector applied to each release page.
    pub selector: String,
    /// Download directory override; a fresh per-run temp directory otherwise.
    pub work_dir: Option<PathBuf>,
    /// Emit DBUG status lines.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos: vec![
                RepoConfig::new("compute-runtime", "intel/compute-runtime"),
                RepoConfig::new("graphics-compiler", "intel/intel-graphics-compiler"),
            ],
            selector: DEFAULT_SELECTOR.to_string(),
            work_dir: None,
            debug: false,
        }
    }
}

impl Config {
    /// Load `config.toml` from the user config directory, falling back to the
    /// built-in defaults when no file exists.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        log::debug!("loading configuration from {}", path.display());
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("neoget").join("config.toml"))
    }
}

/// One repository whose release assets get installed.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoConfig {
    /// Short name used in status lines.
    pub name: String,
    /// `owner/repo` path on the hosting platform.
    pub slug: String,
    /// Hosting platform root; overridable to point tests at fixtures.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl RepoConfig {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            base_url: default_base_url(),
        }
    }

    /// URL of the release listing page for a version token.
    pub fn release_page_url(&self, version: &str) -> String {
        if version == LATEST {
            format!("{}/{}/releases/latest", self.base_url, self.slug)
        } else {
            format!("{}/{}/releases/tag/{version}", self.base_url, self.slug)
        }
    }
}
