//! Dynamic rule loading.
//!
//! Rule modules (`.yaml`, `.yml`, `.scm`) are discovered in a directory,
//! parsed, given the capabilities they request (if granted), validated and
//! wrapped into [`AnalyzerDescriptor`]s. A broken module is skipped with a
//! warning and never stops the run.

mod capability;
mod module;
mod rule;

pub use capability::{
    Capabilities, Capability, FsReadProvider, NotificationSink, ParserProvider, PathProvider,
    TracingSink,
};
pub use module::ModuleManifest;
pub use rule::{LoadedRule, REPORT_CAPTURE};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use walkdir::WalkDir;

use crate::detect::{AnalyzerDescriptor, Category};

/// Extensions recognised as rule modules.
pub const MODULE_EXTENSIONS: &[&str] = &["yaml", "yml", "scm"];

/// Why a module could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read module: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed module: {0}")]
    Malformed(String),
    #[error("no detector: {0}")]
    MissingDetector(String),
    #[error("invalid contract: {0}")]
    InvalidContract(String),
    #[error("unknown capability {0:?}")]
    UnknownCapability(String),
    #[error("dependency not available: capability {0} is not granted")]
    DependencyNotAvailable(Capability),
}

impl LoadError {
    /// Whether the failure is about capabilities rather than a broken module.
    pub fn is_capability_error(&self) -> bool {
        matches!(
            self,
            LoadError::UnknownCapability(_) | LoadError::DependencyNotAvailable(_)
        )
    }
}

/// A module that was not loaded.
#[derive(Debug)]
pub struct SkippedModule {
    pub path: PathBuf,
    pub error: LoadError,
}

impl std::fmt::Display for SkippedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// Outcome of loading a rule directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Loaded analyzers in path order.
    pub loaded: Vec<AnalyzerDescriptor>,
    pub skipped: Vec<SkippedModule>,
    /// Modules whose category is disabled.
    pub disabled: Vec<PathBuf>,
}

impl LoadReport {
    /// Skip messages, for reports.
    pub fn warnings(&self) -> Vec<String> {
        self.skipped.iter().map(|s| s.to_string()).collect()
    }
}

/// Loads rule modules with a fixed set of granted capabilities.
pub struct Loader {
    granted: Vec<Capability>,
    disabled: HashSet<Category>,
    sink: Arc<dyn NotificationSink>,
}

impl Loader {
    pub fn new(granted: Vec<Capability>) -> Self {
        Self {
            granted,
            disabled: HashSet::new(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Categories whose modules are not loaded.
    pub fn disabled_categories(mut self, disabled: HashSet<Category>) -> Self {
        self.disabled = disabled;
        self
    }

    /// Replace the notification sink handed to modules granted `notify`.
    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Candidate module files under `dir`, sorted by path.
    pub fn discover(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| MODULE_EXTENSIONS.contains(&e))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    }

    /// Load one module file. `Ok(None)` means its category is disabled.
    pub fn load_file(&self, path: &Path, rule_dir: &Path) -> Result<Option<LoadedRule>, LoadError> {
        let source = fs::read_to_string(path)?;
        let manifest = ModuleManifest::parse(&source)?;

        if let Some(category) = Category::parse(&manifest.category) {
            if self.disabled.contains(&category) {
                return Ok(None);
            }
        }

        let caps = Capabilities::inject(&manifest.requires, &self.granted, rule_dir, &self.sink)?;
        LoadedRule::build(manifest, &caps).map(Some)
    }

    /// Load every module under `dir`. A missing directory loads nothing.
    pub fn load_dir(&self, dir: &Path) -> LoadReport {
        let mut report = LoadReport::default();
        if !dir.is_dir() {
            tracing::warn!("rule directory {} does not exist", dir.display());
            return report;
        }

        let _span = tracing::info_span!("load_rules", dir = %dir.display()).entered();
        for path in Self::discover(dir) {
            match self.load_file(&path, dir) {
                Ok(Some(rule)) => {
                    tracing::debug!("loaded rule module {}", path.display());
                    report
                        .loaded
                        .push(AnalyzerDescriptor::loaded(Box::new(rule), &path));
                }
                Ok(None) => {
                    tracing::debug!("skipping {}: category disabled", path.display());
                    report.disabled.push(path);
                }
                Err(error) => {
                    tracing::warn!("skipping rule module {}: {}", path.display(), error);
                    report.skipped.push(SkippedModule { path, error });
                }
            }
        }
        tracing::info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "rule modules loaded"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    const LOREM: &str = r#"
name: no-lorem
category: minimalist-design
message: "placeholder copy: {match}"
requires: [parser]
query: |
  ((jsx_text) @report (#match? @report "(?i)lorem"))
"#;

    #[test]
    fn test_load_dir_orders_and_skips() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b-lorem.yaml", LOREM);
        write(
            temp.path(),
            "a-nodetector.yml",
            "name: empty\ncategory: consistency\nmessage: nothing\n",
        );
        write(
            temp.path(),
            "c-script.scm",
            ";; @name acme-words\n;; @category real-world-language\n;; @message internal term {match}\n;; @pattern (?i)\\bSKU\\b\n",
        );
        write(temp.path(), "notes.txt", "not a module");

        let report = Loader::new(vec![Capability::Parser]).load_dir(temp.path());

        let names: Vec<&str> = report.loaded.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["no-lorem", "acme-words"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].error, LoadError::MissingDetector(_)));
        assert!(report.warnings()[0].contains("a-nodetector.yml"));
    }

    #[test]
    fn test_ungranted_capability_is_named() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "lorem.yaml", LOREM);

        let report = Loader::new(vec![Capability::Path]).load_dir(temp.path());
        assert!(report.loaded.is_empty());
        let err = &report.skipped[0].error;
        assert!(matches!(err, LoadError::DependencyNotAvailable(Capability::Parser)));
        assert!(err.is_capability_error());
        assert_eq!(
            err.to_string(),
            "dependency not available: capability parser is not granted"
        );
    }

    #[test]
    fn test_disabled_category_not_loaded() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "lorem.yaml", LOREM);

        let report = Loader::new(Capability::ALL.to_vec())
            .disabled_categories([Category::MinimalistDesign].into_iter().collect())
            .load_dir(temp.path());
        assert!(report.loaded.is_empty());
        assert!(report.skipped.is_empty());
        assert_eq!(report.disabled.len(), 1);
    }

    #[test]
    fn test_vocabulary_file_confined_to_dir() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "words/acme.txt", "SKU\nfulfillment center\n");
        write(
            temp.path(),
            "jargon.yaml",
            "name: acme-jargon\ncategory: real-world-language\nmessage: \"internal term: {match}\"\nrequires: [fs-read, path]\nvocabulary_file: words/acme.txt\n",
        );
        write(
            temp.path(),
            "escape.yaml",
            "name: escape\ncategory: real-world-language\nmessage: m\nrequires: [fs-read, path]\nvocabulary_file: ../outside.txt\n",
        );

        let report = Loader::new(Capability::ALL.to_vec()).load_dir(temp.path());
        let names: Vec<&str> = report.loaded.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["acme-jargon"]);
        assert!(matches!(report.skipped[0].error, LoadError::InvalidContract(_)));
    }

    #[test]
    fn test_missing_dir_loads_nothing() {
        let report = Loader::new(Capability::ALL.to_vec()).load_dir(Path::new("/nonexistent/rules"));
        assert!(report.loaded.is_empty());
        assert!(report.skipped.is_empty());
    }
}
