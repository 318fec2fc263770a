//! Usability heuristics detection.

mod analyzer;
pub mod context;
pub mod elements;
pub mod rules;
mod runner;
pub mod style;
mod suppress;
mod types;
pub mod vocab;

pub use analyzer::{Analyzer, AnalyzerDescriptor, AnalyzerInput, Document, Origin};
pub use context::{find_nearby, first_nearby, LineClass, SourceLines};
pub use runner::Runner;
pub use suppress::{
    filter_suppressed, matches_suppression, parse_suppressions, SuppressedDiagnostic, Suppression,
    SuppressionType,
};
pub use types::{AnalysisResult, Category, CategoryDoc, Diagnostic, FileReport, Severity};
