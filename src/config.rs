//! Configuration schema for usecheck.
//!
//! A config file tunes which files are scanned, which heuristics run and how
//! strict they are. Without one, defaults apply.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::{Category, Severity};
use crate::loader::Capability;

/// File names searched for, in order, when no `--config` is given.
pub const CONFIG_FILE_NAMES: &[&str] = &["usecheck.yaml", ".usecheck.yaml", "usecheck.yml"];

/// Extensions scanned when the config lists none.
pub const DEFAULT_EXTENSIONS: &[&str] = &["tsx", "jsx", "ts", "js", "mjs"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// File extensions to scan (without dot).
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/stories/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Category slugs or codes that are neither run nor loaded.
    #[serde(default)]
    pub disabled_categories: Vec<String>,
    /// Lowest severity that fails the run (default: error).
    #[serde(default)]
    pub fail_on: Option<String>,
    #[serde(default)]
    pub rules: RuleSettings,
    #[serde(default)]
    pub plugins: Option<PluginsConfig>,
    #[serde(default)]
    pub language_check: Option<LanguageCheckConfig>,
    /// Auxiliary context handed to rules that accept it (e.g. the page URL).
    #[serde(default)]
    pub target_url: Option<String>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Find a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Extensions to scan, lowercased and without dots.
    pub fn extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            return DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        }
        self.extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }

    /// Categories disabled by the config. Unknown names are ignored here;
    /// [`validate`] rejects them.
    pub fn disabled_categories(&self) -> HashSet<Category> {
        self.disabled_categories
            .iter()
            .filter_map(|c| Category::parse(c))
            .collect()
    }

    /// Severity threshold for a failing exit code.
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Severity::Error)
    }

    /// Returns whether the language check is enabled.
    pub fn language_check_enabled(&self) -> bool {
        self.language_check
            .as_ref()
            .map(|c| c.enabled && c.endpoint.is_some())
            .unwrap_or(false)
    }
}

/// Thresholds and names used by the built-in analyzers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleSettings {
    /// Components treated as pages, in addition to any tag ending in `Page`.
    #[serde(default = "default_page_components")]
    pub page_components: Vec<String>,
    #[serde(default = "default_max_fonts")]
    pub max_fonts: usize,
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
    #[serde(default = "default_max_nav_items")]
    pub max_nav_items: usize,
    /// Lines searched on either side of a finding for evidence.
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,
}

fn default_page_components() -> Vec<String> {
    ["Page", "PageLayout", "PageContainer", "PageWrapper", "Screen"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_fonts() -> usize {
    2
}

fn default_max_colors() -> usize {
    3
}

fn default_max_nav_items() -> usize {
    7
}

fn default_context_radius() -> usize {
    5
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            page_components: default_page_components(),
            max_fonts: default_max_fonts(),
            max_colors: default_max_colors(),
            max_nav_items: default_max_nav_items(),
            context_radius: default_context_radius(),
        }
    }
}

/// Externally authored rule modules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginsConfig {
    /// Directory scanned for rule modules.
    #[serde(default)]
    pub dir: Option<String>,
    /// Capabilities granted to loaded modules.
    #[serde(default = "default_grants")]
    pub grant: Vec<String>,
}

fn default_grants() -> Vec<String> {
    ["parser", "path", "notify"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            grant: default_grants(),
        }
    }
}

impl PluginsConfig {
    /// Granted capabilities. Unknown names are dropped; [`validate`] rejects them.
    pub fn granted(&self) -> Vec<Capability> {
        self.grant.iter().filter_map(|g| Capability::parse(g)).collect()
    }
}

/// Configuration for the remote domain-language check.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LanguageCheckConfig {
    /// Whether the check runs (default: true when present)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Classifier endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Domain hint sent with every text (e.g. "healthcare").
    #[serde(default)]
    pub domain: Option<String>,
    /// Per-request timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Maximum requests in flight (default: 8)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    5000
}

fn default_concurrency() -> usize {
    8
}

impl Default for LanguageCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            domain: None,
            timeout_ms: default_timeout(),
            concurrency: default_concurrency(),
            api_key_env: None,
        }
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    for c in &config.disabled_categories {
        if Category::parse(c).is_none() {
            anyhow::bail!("unknown category {:?} in disabled_categories", c);
        }
    }

    if let Some(s) = &config.fail_on {
        s.parse::<Severity>()
            .map_err(|e| anyhow::anyhow!("invalid fail_on: {}", e))?;
    }

    if let Some(plugins) = &config.plugins {
        for g in &plugins.grant {
            if Capability::parse(g).is_none() {
                anyhow::bail!(
                    "unknown capability {:?} in plugins.grant (expected one of: {})",
                    g,
                    Capability::ALL
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }

    if let Some(lc) = &config.language_check {
        if lc.enabled && lc.endpoint.is_none() {
            anyhow::bail!("language_check is enabled but has no endpoint");
        }
        if lc.concurrency == 0 {
            anyhow::bail!("language_check.concurrency must be at least 1");
        }
    }

    if config.rules.context_radius > 100 {
        anyhow::bail!(
            "rules.context_radius {} is too large (max 100)",
            config.rules.context_radius
        );
    }

    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
