//! Analyzer backed by a loaded rule module.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use globset::GlobSet;
use regex::Regex;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor, Tree};

use crate::detect::{Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::Dialect;

use super::capability::{Capabilities, NotificationSink, ParserProvider};
use super::module::ModuleManifest;
use super::LoadError;

/// Longest matched text quoted in a message.
const MAX_MATCH_LEN: usize = 60;

/// Name of the capture a query reports on.
pub const REPORT_CAPTURE: &str = "report";

/// Compiled tree queries, one per dialect.
struct QueryDetector {
    parser: ParserProvider,
    tsx: Option<(Query, u32)>,
    jsx: Option<(Query, u32)>,
}

impl QueryDetector {
    fn compile(parser: ParserProvider, source: &str) -> Result<Self, LoadError> {
        let mut errors = Vec::new();
        let mut compile = |dialect: Dialect| match parser.compile(dialect, source) {
            Ok(query) => Some(query),
            Err(e) => {
                errors.push(format!("{}: {}", dialect.as_str(), e));
                None
            }
        };
        let tsx = compile(Dialect::Tsx);
        let jsx = compile(Dialect::Jsx);
        if tsx.is_none() && jsx.is_none() {
            return Err(LoadError::Malformed(format!("query does not compile ({})", errors.join("; "))));
        }

        let with_report = |query: Query| {
            query
                .capture_index_for_name(REPORT_CAPTURE)
                .map(|idx| (query, idx))
        };
        let detector = Self {
            parser,
            tsx: tsx.and_then(with_report),
            jsx: jsx.and_then(with_report),
        };
        if detector.tsx.is_none() && detector.jsx.is_none() {
            return Err(LoadError::MissingDetector(format!(
                "query has no @{} capture",
                REPORT_CAPTURE
            )));
        }
        Ok(detector)
    }

    /// `(line, text)` of every `@report` capture. `shared` is the file's
    /// already parsed tree; without it the source is parsed here.
    fn run(
        &self,
        source: &str,
        dialect: Dialect,
        shared: Option<&Tree>,
    ) -> anyhow::Result<Vec<(usize, String)>> {
        let slot = match dialect {
            Dialect::Tsx => &self.tsx,
            Dialect::Jsx => &self.jsx,
        };
        let Some((query, report)) = slot else {
            return Ok(Vec::new());
        };
        let parsed;
        let tree = match shared {
            Some(tree) => tree,
            None => {
                parsed = self.parser.parse(source, dialect)?;
                &parsed
            }
        };

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());
        let mut found = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures.iter().filter(|c| c.index == *report) {
                let text = capture.node.utf8_text(source.as_bytes())?;
                found.push((capture.node.start_position().row + 1, text.to_string()));
            }
        }
        Ok(found)
    }
}

/// An analyzer built from a validated [`ModuleManifest`].
pub struct LoadedRule {
    name: String,
    kind: String,
    category: Category,
    severity: Severity,
    message: String,
    rationale: String,
    action: String,
    accepts_auxiliary: bool,
    query: Option<QueryDetector>,
    patterns: Vec<Regex>,
    applies_to: Option<GlobSet>,
    notify: Option<Arc<dyn NotificationSink>>,
}

impl LoadedRule {
    /// Validate `manifest` and build the rule using only the capabilities in
    /// `caps`.
    pub fn build(manifest: ModuleManifest, caps: &Capabilities) -> Result<Self, LoadError> {
        if manifest.name.trim().is_empty() {
            return Err(LoadError::InvalidContract("module has no name".to_string()));
        }
        if manifest.message.trim().is_empty() {
            return Err(LoadError::InvalidContract("module has no message".to_string()));
        }
        let category = Category::parse(&manifest.category).ok_or_else(|| {
            LoadError::InvalidContract(format!("unknown category {:?}", manifest.category))
        })?;
        let severity: Severity = manifest
            .severity
            .parse()
            .map_err(LoadError::InvalidContract)?;
        if manifest.uses_auxiliary() && !manifest.accepts_auxiliary_context {
            return Err(LoadError::InvalidContract(
                "templates use {aux} but accepts_auxiliary_context is false".to_string(),
            ));
        }
        if manifest.query.is_none() && manifest.pattern.is_none() && manifest.vocabulary_file.is_none() {
            return Err(LoadError::MissingDetector(
                "module needs a query, a pattern or a vocabulary_file".to_string(),
            ));
        }

        let query = match &manifest.query {
            Some(source) => Some(QueryDetector::compile(caps.parser("query")?, source)?),
            None => None,
        };

        let mut patterns = Vec::new();
        if let Some(pattern) = &manifest.pattern {
            patterns.push(
                Regex::new(pattern)
                    .map_err(|e| LoadError::Malformed(format!("invalid pattern: {}", e)))?,
            );
        }
        if let Some(file) = &manifest.vocabulary_file {
            let path = caps.path("vocabulary_file")?.resolve(file)?;
            let words = caps.fs_read("vocabulary_file")?.read_to_string(&path)?;
            if let Some(re) = vocabulary_regex(&words)? {
                patterns.push(re);
            }
        }

        let applies_to = if manifest.applies_to.is_empty() {
            None
        } else {
            Some(caps.path("applies_to")?.globs(&manifest.applies_to)?)
        };

        let notify = if manifest.notify {
            Some(caps.notify("notify")?)
        } else {
            None
        };

        Ok(Self {
            kind: manifest.kind().to_string(),
            name: manifest.name,
            category,
            severity,
            message: manifest.message,
            rationale: manifest.rationale,
            action: manifest.action,
            accepts_auxiliary: manifest.accepts_auxiliary_context,
            query,
            patterns,
            applies_to,
            notify,
        })
    }

    fn applies(&self, path: &Path) -> bool {
        match &self.applies_to {
            None => true,
            Some(globs) => globs.is_match(path),
        }
    }

    fn render(&self, template: &str, matched: &str, aux: Option<&str>) -> String {
        let mut out = template.replace("{match}", &truncate(matched));
        if self.accepts_auxiliary {
            out = out.replace("{aux}", aux.unwrap_or(""));
        }
        out
    }
}

/// Case-insensitive whole-word alternation of the non-comment lines of a
/// word list.
fn vocabulary_regex(words: &str) -> Result<Option<Regex>, LoadError> {
    let words: Vec<String> = words
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty() && !w.starts_with('#'))
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!(r"(?i)\b({})\b", words.join("|")))
        .map(Some)
        .map_err(|e| LoadError::Malformed(format!("invalid vocabulary: {}", e)))
}

fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_MATCH_LEN {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_MATCH_LEN).collect();
    out.push_str("...");
    out
}

impl Analyzer for LoadedRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    // Queries reuse the tree-sitter tree behind the shared syntax tree.
    fn accepts_tree(&self) -> bool {
        self.query.is_some()
    }

    fn accepts_auxiliary_context(&self) -> bool {
        self.accepts_auxiliary
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        if !self.applies(input.path) {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(usize, String)> = Vec::new();
        if let Some(query) = &self.query {
            let shared = input.tree.map(|t| t.raw());
            hits.extend(query.run(input.source, input.dialect, shared)?);
        }
        for pattern in &self.patterns {
            for (idx, line) in input.lines.code_lines() {
                if let Some(m) = pattern.find(line) {
                    hits.push((idx + 1, m.as_str().to_string()));
                }
            }
        }

        let mut seen = BTreeSet::new();
        hits.sort_by_key(|(line, _)| *line);
        let diagnostics: Vec<Diagnostic> = hits
            .into_iter()
            .filter(|(line, _)| seen.insert(*line))
            .map(|(line, matched)| {
                Diagnostic::new(
                    self.category,
                    self.kind.clone(),
                    line,
                    self.severity,
                    self.render(&self.message, &matched, input.auxiliary),
                )
                .with_rationale(self.render(&self.rationale, &matched, input.auxiliary))
                .with_action(self.render(&self.action, &matched, input.auxiliary))
            })
            .collect();

        if let Some(sink) = &self.notify {
            if !diagnostics.is_empty() {
                sink.notify(
                    &self.name,
                    &format!("{} finding(s) in {}", diagnostics.len(), input.path.display()),
                );
            }
        }

        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Document;
    use crate::loader::capability::{Capability, TracingSink};
    use std::sync::Mutex;

    fn caps(requested: &[&str]) -> Capabilities {
        let sink: Arc<dyn NotificationSink> = Arc::new(TracingSink);
        let requested: Vec<String> = requested.iter().map(|s| s.to_string()).collect();
        Capabilities::inject(&requested, &Capability::ALL, Path::new("."), &sink).unwrap()
    }

    fn run(rule: &LoadedRule, path: &str, src: &str, aux: Option<&str>) -> Vec<Diagnostic> {
        let doc = Document::parse(path, src).unwrap();
        let input = AnalyzerInput {
            path: &doc.path,
            source: &doc.source,
            lines: &doc.lines,
            dialect: doc.dialect,
            tree: rule.accepts_tree().then_some(&doc.tree),
            auxiliary: aux,
        };
        rule.run(&input).unwrap()
    }

    fn manifest() -> ModuleManifest {
        ModuleManifest {
            name: "no-lorem".to_string(),
            category: "minimalist-design".to_string(),
            severity: "warning".to_string(),
            message: "placeholder copy: {match}".to_string(),
            ..Default::default()
        }
    }

    const SRC: &str = r#"
export const Hero = () => (
  <section>
    <h1>Lorem ipsum dolor</h1>
    {/* lorem ipsum in a comment */}
    <p>Real copy</p>
  </section>
);
"#;

    #[test]
    fn test_query_rule() {
        let rule = LoadedRule::build(
            ModuleManifest {
                requires: vec!["parser".to_string()],
                query: Some(r#"((jsx_text) @report (#match? @report "(?i)lorem"))"#.to_string()),
                ..manifest()
            },
            &caps(&["parser"]),
        )
        .unwrap();

        let diags = run(&rule, "Hero.tsx", SRC, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 4);
        assert_eq!(diags[0].kind, "no-lorem");
        assert_eq!(diags[0].message, "placeholder copy: Lorem ipsum dolor");

        // Same query against the JavaScript grammar.
        assert_eq!(run(&rule, "Hero.jsx", SRC, None).len(), 1);
    }

    #[test]
    fn test_query_rule_reuses_shared_tree() {
        let rule = LoadedRule::build(
            ModuleManifest {
                requires: vec!["parser".to_string()],
                query: Some(r#"((jsx_text) @report (#match? @report "(?i)lorem"))"#.to_string()),
                ..manifest()
            },
            &caps(&["parser"]),
        )
        .unwrap();
        assert!(rule.accepts_tree());

        let doc = Document::parse("Hero.tsx", SRC).unwrap();
        let input = |tree| AnalyzerInput {
            path: &doc.path,
            source: &doc.source,
            lines: &doc.lines,
            dialect: doc.dialect,
            tree,
            auxiliary: None,
        };
        let shared = rule.run(&input(Some(&doc.tree))).unwrap();
        let reparsed = rule.run(&input(None)).unwrap();
        assert_eq!(shared, reparsed);
        assert_eq!(shared[0].line, 4);

        let pattern_only = LoadedRule::build(
            ModuleManifest {
                pattern: Some("(?i)lorem".to_string()),
                ..manifest()
            },
            &caps(&[]),
        )
        .unwrap();
        assert!(!pattern_only.accepts_tree());
    }

    #[test]
    fn test_pattern_rule_skips_comments() {
        let rule = LoadedRule::build(
            ModuleManifest {
                pattern: Some("(?i)lorem ipsum".to_string()),
                ..manifest()
            },
            &caps(&[]),
        )
        .unwrap();
        let diags = run(&rule, "Hero.tsx", SRC, None);
        assert_eq!(diags.iter().map(|d| d.line).collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_query_requires_parser() {
        let err = LoadedRule::build(
            ModuleManifest {
                query: Some("((jsx_text) @report)".to_string()),
                ..manifest()
            },
            &caps(&[]),
        )
        .err()
        .unwrap();
        assert!(matches!(err, LoadError::InvalidContract(_)));
    }

    #[test]
    fn test_missing_detector() {
        let err = LoadedRule::build(manifest(), &caps(&[])).err().unwrap();
        assert!(matches!(err, LoadError::MissingDetector(_)));

        let err = LoadedRule::build(
            ModuleManifest {
                query: Some("(jsx_text) @text".to_string()),
                ..manifest()
            },
            &caps(&["parser"]),
        )
        .err()
        .unwrap();
        assert!(matches!(err, LoadError::MissingDetector(_)));
    }

    #[test]
    fn test_aux_template_needs_opt_in() {
        let m = ModuleManifest {
            pattern: Some("lorem".to_string()),
            message: "copy on {aux}".to_string(),
            ..manifest()
        };
        let err = LoadedRule::build(m.clone(), &caps(&[])).err().unwrap();
        assert!(matches!(err, LoadError::InvalidContract(_)));

        let rule = LoadedRule::build(
            ModuleManifest {
                accepts_auxiliary_context: true,
                pattern: Some("(?i)lorem".to_string()),
                ..m
            },
            &caps(&[]),
        )
        .unwrap();
        let diags = run(&rule, "Hero.tsx", SRC, Some("https://shop.example"));
        assert_eq!(diags[0].message, "copy on https://shop.example");
    }

    #[test]
    fn test_applies_to_and_notify() {
        struct Recorder(Mutex<Vec<String>>);
        impl NotificationSink for Recorder {
            fn notify(&self, rule: &str, message: &str) {
                self.0.lock().unwrap().push(format!("{}: {}", rule, message));
            }
        }

        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let sink: Arc<dyn NotificationSink> = recorder.clone();
        let caps = Capabilities::inject(
            &["path".to_string(), "notify".to_string()],
            &Capability::ALL,
            Path::new("."),
            &sink,
        )
        .unwrap();

        let rule = LoadedRule::build(
            ModuleManifest {
                pattern: Some("(?i)lorem".to_string()),
                applies_to: vec!["**/marketing/**".to_string()],
                notify: true,
                ..manifest()
            },
            &caps,
        )
        .unwrap();

        assert!(run(&rule, "src/app/Hero.tsx", SRC, None).is_empty());
        assert_eq!(run(&rule, "src/marketing/Hero.tsx", SRC, None).len(), 1);

        let notes = recorder.0.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("no-lorem: 1 finding(s) in src/marketing/Hero.tsx"));
    }

    #[test]
    fn test_vocabulary_regex() {
        let re = vocabulary_regex("# internal terms\nSKU\n\nfulfillment center\n")
            .unwrap()
            .unwrap();
        assert!(re.is_match("Pick a sku"));
        assert!(re.is_match("Fulfillment Center"));
        assert!(!re.is_match("skull"));
        assert!(vocabulary_regex("# nothing\n").unwrap().is_none());
    }
}
