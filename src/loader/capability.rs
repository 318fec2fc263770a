//! Capabilities injected into loaded rule modules.
//!
//! A module lists what it needs under `requires`; only granted capabilities
//! are handed over, each through a small provider with a narrow surface.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tree_sitter::{Query, Tree};

use crate::parser::{self, Dialect, ParseError};

use super::LoadError;

/// A named capability a module may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Parse sources and compile tree queries.
    Parser,
    /// Read files inside the rule directory.
    FsRead,
    /// Resolve paths and match the analyzed file's path.
    Path,
    /// Emit notifications when a rule matches.
    Notify,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Parser,
        Capability::FsRead,
        Capability::Path,
        Capability::Notify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Parser => "parser",
            Capability::FsRead => "fs-read",
            Capability::Path => "path",
            Capability::Notify => "notify",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives match notifications from loaded rules.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, rule: &str, message: &str);
}

/// Forwards notifications to `tracing`.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, rule: &str, message: &str) {
        tracing::info!(rule, "{}", message);
    }
}

/// Parsing and query compilation.
#[derive(Debug, Clone, Copy)]
pub struct ParserProvider;

impl ParserProvider {
    pub fn parse(&self, source: &str, dialect: Dialect) -> Result<Tree, ParseError> {
        parser::parse_raw(source, dialect)
    }

    pub fn compile(&self, dialect: Dialect, query: &str) -> Result<Query, tree_sitter::QueryError> {
        Query::new(&dialect.language(), query)
    }
}

/// Path resolution confined to the rule directory, plus glob matching on
/// analyzed paths.
#[derive(Debug, Clone)]
pub struct PathProvider {
    base: PathBuf,
}

impl PathProvider {
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve `relative` against the rule directory. Absolute paths and
    /// `..` components are rejected.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, LoadError> {
        let rel = Path::new(relative);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(LoadError::InvalidContract(format!(
                "path {:?} leaves the rule directory",
                relative
            )));
        }
        Ok(self.base.join(rel))
    }

    pub fn globs(&self, patterns: &[String]) -> Result<GlobSet, LoadError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                LoadError::InvalidContract(format!("invalid applies_to pattern {:?}: {}", pattern, e))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| LoadError::InvalidContract(e.to_string()))
    }
}

/// Read access to files inside the rule directory.
#[derive(Debug, Clone)]
pub struct FsReadProvider {
    base: PathBuf,
}

impl FsReadProvider {
    /// Read a file previously resolved by [`PathProvider::resolve`]. Symlinks
    /// pointing outside the rule directory are refused.
    pub fn read_to_string(&self, path: &Path) -> Result<String, LoadError> {
        let base = self.base.canonicalize()?;
        let target = path.canonicalize()?;
        if !target.starts_with(&base) {
            return Err(LoadError::InvalidContract(format!(
                "{} is outside the rule directory",
                path.display()
            )));
        }
        Ok(fs::read_to_string(target)?)
    }
}

/// The capabilities granted to one module: exactly the ones it requested.
#[derive(Clone, Default)]
pub struct Capabilities {
    parser: Option<ParserProvider>,
    path: Option<PathProvider>,
    fs_read: Option<FsReadProvider>,
    notify: Option<Arc<dyn NotificationSink>>,
}

impl Capabilities {
    /// Build the provider set for a module requesting `requested`.
    ///
    /// Unknown names fail with [`LoadError::UnknownCapability`]; known names
    /// outside `granted` fail with [`LoadError::DependencyNotAvailable`].
    pub fn inject(
        requested: &[String],
        granted: &[Capability],
        rule_dir: &Path,
        sink: &Arc<dyn NotificationSink>,
    ) -> Result<Self, LoadError> {
        let mut caps = Capabilities::default();
        for name in requested {
            let cap = Capability::parse(name)
                .ok_or_else(|| LoadError::UnknownCapability(name.clone()))?;
            if !granted.contains(&cap) {
                return Err(LoadError::DependencyNotAvailable(cap));
            }
            match cap {
                Capability::Parser => caps.parser = Some(ParserProvider),
                Capability::Path => {
                    caps.path = Some(PathProvider {
                        base: rule_dir.to_path_buf(),
                    })
                }
                Capability::FsRead => {
                    caps.fs_read = Some(FsReadProvider {
                        base: rule_dir.to_path_buf(),
                    })
                }
                Capability::Notify => caps.notify = Some(Arc::clone(sink)),
            }
        }
        Ok(caps)
    }

    fn missing(cap: Capability, what: &str) -> LoadError {
        LoadError::InvalidContract(format!(
            "{} needs the {} capability; add it to `requires`",
            what, cap
        ))
    }

    pub fn parser(&self, what: &str) -> Result<ParserProvider, LoadError> {
        self.parser.ok_or_else(|| Self::missing(Capability::Parser, what))
    }

    pub fn path(&self, what: &str) -> Result<&PathProvider, LoadError> {
        self.path
            .as_ref()
            .ok_or_else(|| Self::missing(Capability::Path, what))
    }

    pub fn fs_read(&self, what: &str) -> Result<&FsReadProvider, LoadError> {
        self.fs_read
            .as_ref()
            .ok_or_else(|| Self::missing(Capability::FsRead, what))
    }

    pub fn notify(&self, what: &str) -> Result<Arc<dyn NotificationSink>, LoadError> {
        self.notify
            .clone()
            .ok_or_else(|| Self::missing(Capability::Notify, what))
    }
}
