//! Usecheck - usability heuristics linter for declarative UI components.
//!
//! Usecheck parses JSX/TSX sources and reports places where the interface is
//! likely to violate well-known usability heuristics: pages without a
//! navigation trail, async actions without a loading state, modals without an
//! exit, unconfirmed destructive actions, inconsistent styling and more.
//!
//! # Architecture
//!
//! - `parser`: tree-sitter adapter producing an owned [`SyntaxTree`]
//! - `detect`: the analyzer contract, built-in rules and the [`Runner`]
//! - `loader`: rule modules loaded at run time with granted capabilities
//! - `classify`: the remote domain-language check and its cache
//! - `config`: YAML config schema
//! - `report`: Output formatting (pretty, JSON, SARIF)
//!
//! # Adding a Rule
//!
//! Implement [`Analyzer`] and register it with [`Runner::register`], or drop
//! a rule module into the configured rules directory.

pub mod classify;
pub mod cli;
pub mod config;
pub mod detect;
pub mod loader;
pub mod parser;
pub mod report;

pub use classify::{ClassificationCache, HttpClassifier, LanguageReview, TextClassifier};
pub use config::Config;
pub use detect::{
    AnalysisResult, Analyzer, AnalyzerDescriptor, AnalyzerInput, Category, Diagnostic, Document,
    Runner, Severity,
};
pub use loader::{Capability, LoadError, LoadReport, Loader};
pub use parser::{parse, Dialect, ParseError, SyntaxNode, SyntaxTree};
