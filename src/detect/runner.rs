//! Detection runner that orchestrates all analyzers.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::classify::{Candidate, LanguageReview};
use crate::config::RuleSettings;
use crate::parser::ParseError;

use super::rules;
use super::{
    filter_suppressed, parse_suppressions, AnalysisResult, AnalyzerDescriptor, AnalyzerInput,
    Category, Diagnostic, Document, FileReport,
};

/// Executes registered analyzers against documents.
#[derive(Default)]
pub struct Runner {
    analyzers: Vec<AnalyzerDescriptor>,
    disabled: HashSet<Category>,
    auxiliary: Option<String>,
    language_review: Option<LanguageReview>,
}

impl Runner {
    /// A runner with no analyzers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in analyzers.
    pub fn with_builtins(mut self, settings: &RuleSettings) -> Self {
        for analyzer in rules::builtin(settings) {
            self.analyzers.push(AnalyzerDescriptor::builtin(analyzer));
        }
        self
    }

    /// Categories that are not run.
    pub fn disabled_categories(mut self, disabled: HashSet<Category>) -> Self {
        self.disabled = disabled;
        self
    }

    /// Auxiliary context handed to analyzers that accept it.
    pub fn auxiliary(mut self, auxiliary: Option<String>) -> Self {
        self.auxiliary = auxiliary;
        self
    }

    pub fn with_language_review(mut self, review: LanguageReview) -> Self {
        self.language_review = Some(review);
        self
    }

    /// Register an analyzer after those already registered.
    pub fn register(&mut self, descriptor: AnalyzerDescriptor) {
        self.analyzers.push(descriptor);
    }

    pub fn descriptors(&self) -> &[AnalyzerDescriptor] {
        &self.analyzers
    }

    fn active(&self) -> impl Iterator<Item = &AnalyzerDescriptor> {
        self.analyzers
            .iter()
            .filter(|d| !self.disabled.contains(&d.category()))
    }

    /// Run every active analyzer on `doc`, in registration order.
    ///
    /// An analyzer that fails or panics contributes nothing for this
    /// document; the fault is logged.
    pub fn run(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for descriptor in self.active() {
            let input = AnalyzerInput {
                path: &doc.path,
                source: &doc.source,
                lines: &doc.lines,
                dialect: doc.dialect,
                tree: descriptor.analyzer.accepts_tree().then_some(&doc.tree),
                auxiliary: if descriptor.accepts_auxiliary_context {
                    self.auxiliary.as_deref()
                } else {
                    None
                },
            };

            match panic::catch_unwind(AssertUnwindSafe(|| descriptor.analyzer.run(&input))) {
                Ok(Ok(found)) => diagnostics.extend(found),
                Ok(Err(e)) => {
                    tracing::warn!(
                        analyzer = %descriptor.name,
                        file = %doc.path.display(),
                        "analyzer failed: {:#}",
                        e
                    );
                }
                Err(payload) => {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::warn!(
                        analyzer = %descriptor.name,
                        file = %doc.path.display(),
                        "analyzer panicked: {}",
                        reason
                    );
                }
            }
        }
        diagnostics
    }

    /// Parse `source` and run the analyzers on it.
    pub fn run_source(
        &self,
        path: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Result<Vec<Diagnostic>, ParseError> {
        let doc = Document::parse(path, source)?;
        Ok(self.run(&doc))
    }

    fn review_enabled(&self) -> bool {
        self.language_review.is_some() && !self.disabled.contains(&Category::RealWorldLanguage)
    }

    /// Analyze one file: parse, run analyzers, collect review candidates.
    fn analyze_file(&self, path: &Path) -> Option<(FileReport, String, Vec<Candidate>)> {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
                return None;
            }
        };

        let mut report = FileReport::new(path.to_string_lossy());
        let doc = match Document::parse(path, source) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("cannot parse {}: {}", path.display(), e);
                report.parse_error = Some(e);
                return Some((report, String::new(), Vec::new()));
            }
        };

        report.diagnostics = self.run(&doc);
        let candidates = if self.review_enabled() {
            LanguageReview::candidates(&doc.tree)
        } else {
            Vec::new()
        };
        Some((report, doc.source, candidates))
    }

    /// Analyze `files` in parallel, then run the language review and apply
    /// inline suppressions. Reports are sorted by file path.
    pub fn run_files(&self, files: &[PathBuf]) -> anyhow::Result<AnalysisResult> {
        let mut analyzed: Vec<(FileReport, String, Vec<Candidate>)> = files
            .par_iter()
            .filter_map(|path| self.analyze_file(path))
            .collect();
        analyzed.sort_by(|a, b| a.0.file.cmp(&b.0.file));

        if let Some(review) = self.language_review.as_ref().filter(|_| self.review_enabled()) {
            let candidates: Vec<Vec<Candidate>> = analyzed
                .iter_mut()
                .map(|(_, _, c)| std::mem::take(c))
                .collect();
            let runtime = tokio::runtime::Runtime::new()?;
            let found = runtime.block_on(review.review(&candidates));
            for ((report, _, _), extra) in analyzed.iter_mut().zip(found) {
                report.diagnostics.extend(extra);
            }
        }

        let mut result = AnalysisResult::new();
        result.scanned = analyzed.len();
        for (mut report, source, _) in analyzed {
            let suppressions = parse_suppressions(&source);
            let diagnostics = std::mem::take(&mut report.diagnostics);
            let (mut active, suppressed) = filter_suppressed(diagnostics, &suppressions);
            active.sort_by_key(|d| d.line);
            report.diagnostics = active;
            report.suppressed = suppressed;
            result.files.push(report);
        }

        Ok(result)
    }
}
