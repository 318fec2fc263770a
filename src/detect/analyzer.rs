//! The analyzer contract shared by built-in and loaded rules.

use std::path::{Path, PathBuf};

use crate::parser::{self, Dialect, ParseError, SyntaxTree};

use super::context::SourceLines;
use super::{Category, Diagnostic};

/// A parsed source file ready for analysis.
pub struct Document {
    pub path: PathBuf,
    pub source: String,
    pub dialect: Dialect,
    pub tree: SyntaxTree,
    pub lines: SourceLines,
}

impl Document {
    /// Parse `source` with the dialect chosen by `path`'s extension
    /// (TSX when the extension is unknown).
    pub fn parse(path: impl Into<PathBuf>, source: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let dialect = Dialect::from_path(&path).unwrap_or(Dialect::Tsx);
        Self::parse_as(path, source, dialect)
    }

    pub fn parse_as(
        path: impl Into<PathBuf>,
        source: impl Into<String>,
        dialect: Dialect,
    ) -> Result<Self, ParseError> {
        let source = source.into();
        let tree = parser::parse(&source, dialect)?;
        let lines = SourceLines::new(&source);
        Ok(Self {
            path: path.into(),
            source,
            dialect,
            tree,
            lines,
        })
    }
}

/// Everything an analyzer may look at for one file.
#[derive(Clone, Copy)]
pub struct AnalyzerInput<'a> {
    pub path: &'a Path,
    pub source: &'a str,
    pub lines: &'a SourceLines,
    pub dialect: Dialect,
    /// Present only for analyzers that accept the tree.
    pub tree: Option<&'a SyntaxTree>,
    /// Present only for analyzers that accept auxiliary context.
    pub auxiliary: Option<&'a str>,
}

impl<'a> AnalyzerInput<'a> {
    pub fn tree(&self) -> anyhow::Result<&'a SyntaxTree> {
        self.tree
            .ok_or_else(|| anyhow::anyhow!("analyzer requires a syntax tree but none was provided"))
    }
}

/// A detection unit.
///
/// Implementations keep no mutable state: anything accumulated during a walk
/// lives in a value created inside [`Analyzer::run`].
pub trait Analyzer: Send + Sync {
    /// Stable analyzer name.
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    /// Whether the runner should hand this analyzer the parsed tree.
    fn accepts_tree(&self) -> bool {
        true
    }

    /// Whether the runner should hand this analyzer the auxiliary context.
    fn accepts_auxiliary_context(&self) -> bool {
        false
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>>;
}

/// Where an analyzer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Builtin,
    Loaded(PathBuf),
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Builtin => write!(f, "built-in"),
            Origin::Loaded(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A registered analyzer.
pub struct AnalyzerDescriptor {
    pub name: String,
    pub analyzer: Box<dyn Analyzer>,
    pub accepts_auxiliary_context: bool,
    pub origin: Origin,
}

impl AnalyzerDescriptor {
    pub fn builtin(analyzer: Box<dyn Analyzer>) -> Self {
        Self::with_origin(analyzer, Origin::Builtin)
    }

    pub fn loaded(analyzer: Box<dyn Analyzer>, path: impl Into<PathBuf>) -> Self {
        Self::with_origin(analyzer, Origin::Loaded(path.into()))
    }

    fn with_origin(analyzer: Box<dyn Analyzer>, origin: Origin) -> Self {
        Self {
            name: analyzer.name().to_string(),
            accepts_auxiliary_context: analyzer.accepts_auxiliary_context(),
            analyzer,
            origin,
        }
    }

    pub fn category(&self) -> Category {
        self.analyzer.category()
    }
}

impl std::fmt::Debug for AnalyzerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerDescriptor")
            .field("name", &self.name)
            .field("category", &self.category())
            .field("accepts_auxiliary_context", &self.accepts_auxiliary_context)
            .field("origin", &self.origin)
            .finish()
    }
}
