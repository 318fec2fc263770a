//! Real-world language review: visible copy is sent to a classifier that
//! recognises domain jargon.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::config::LanguageCheckConfig;
use crate::detect::{Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, SyntaxNode, SyntaxTree, Visitor};

use super::{ClassificationCache, HttpClassifier, TextClassifier};

/// Literal attributes whose value users read.
const LABEL_ATTRS: &[&str] = &[
    "title",
    "placeholder",
    "aria-label",
    "label",
    "alt",
    "helperText",
    "description",
];

/// A piece of visible text and its first line in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub line: usize,
}

fn is_copy(text: &str) -> bool {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 3 && !text.starts_with("http") && !text.contains("://")
}

#[derive(Default)]
struct Collect {
    seen: HashSet<String>,
    found: Vec<Candidate>,
}

impl Collect {
    fn add(&mut self, text: &str, line: usize) {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if is_copy(&text) && self.seen.insert(text.clone()) {
            self.found.push(Candidate { text, line });
        }
    }
}

impl<'t> Visitor<'t> for Collect {
    fn element(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        for attr in LABEL_ATTRS {
            if let Some(text) = node.literal(attr) {
                self.add(text, node.line);
            }
        }
    }

    fn text(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        self.add(&node.text, node.line);
    }
}

/// Classifies visible copy, caching answers by `(domain, text)`.
pub struct LanguageReview {
    classifier: Arc<dyn TextClassifier>,
    cache: Arc<ClassificationCache>,
    domain: Option<String>,
    concurrency: usize,
    timeout: Duration,
}

impl LanguageReview {
    pub fn new(classifier: Arc<dyn TextClassifier>, domain: Option<String>) -> Self {
        Self {
            classifier,
            cache: Arc::new(ClassificationCache::new()),
            domain,
            concurrency: 8,
            timeout: Duration::from_millis(5000),
        }
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share a cache across reviews.
    pub fn with_cache(mut self, cache: Arc<ClassificationCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Build an HTTP-backed review from config. The API key is read from
    /// the configured environment variable when set.
    pub fn from_config(config: &LanguageCheckConfig) -> anyhow::Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("language_check has no endpoint"))?;
        let api_key = match &config.api_key_env {
            Some(var) => match std::env::var(var) {
                Ok(key) => Some(key),
                Err(_) => {
                    tracing::warn!("{} is not set; calling the classifier without a key", var);
                    None
                }
            },
            None => None,
        };
        let timeout = Duration::from_millis(config.timeout_ms);
        let classifier = HttpClassifier::new(endpoint, api_key, timeout)?;
        Ok(Self::new(Arc::new(classifier), config.domain.clone())
            .concurrency(config.concurrency)
            .timeout(timeout))
    }

    pub fn cache(&self) -> &ClassificationCache {
        &self.cache
    }

    /// Distinct visible texts of one file, in document order.
    pub fn candidates(tree: &SyntaxTree) -> Vec<Candidate> {
        let mut collect = Collect::default();
        walk(tree.root(), &mut collect);
        collect.found
    }

    async fn classify(&self, text: &str) -> Option<String> {
        let domain = self.domain.as_deref();
        if let Some(cached) = self.cache.get(domain, text) {
            return cached;
        }
        match tokio::time::timeout(self.timeout, self.classifier.classify(text, domain)).await {
            Ok(Ok(label)) => {
                let label = label.filter(|l| !l.trim().is_empty());
                self.cache.set(domain, text, label.clone());
                label
            }
            Ok(Err(e)) => {
                tracing::debug!("classification of {:?} failed: {}", text, e);
                None
            }
            Err(_) => {
                tracing::debug!("classification of {:?} timed out", text);
                None
            }
        }
    }

    /// Review every file's candidates. Each distinct text is classified
    /// once, with at most `concurrency` requests in flight. The result has
    /// one diagnostic list per input, in input order.
    pub async fn review(&self, files: &[Vec<Candidate>]) -> Vec<Vec<Diagnostic>> {
        let distinct: Vec<&str> = {
            let mut seen = HashSet::new();
            files
                .iter()
                .flatten()
                .map(|c| c.text.as_str())
                .filter(|t| seen.insert(*t))
                .collect()
        };

        let labels: HashMap<&str, String> = stream::iter(distinct)
            .map(|text| async move { (text, self.classify(text).await) })
            .buffer_unordered(self.concurrency)
            .filter_map(|(text, label)| async move { label.map(|l| (text, l)) })
            .collect()
            .await;

        let (hits, misses) = self.cache.stats();
        tracing::debug!(hits, misses, flagged = labels.len(), "language review finished");

        files
            .iter()
            .map(|candidates| {
                candidates
                    .iter()
                    .filter_map(|c| labels.get(c.text.as_str()).map(|label| jargon(c, label)))
                    .collect()
            })
            .collect()
    }
}

fn jargon(candidate: &Candidate, label: &str) -> Diagnostic {
    Diagnostic::new(
        Category::RealWorldLanguage,
        "domain-jargon",
        candidate.line,
        Severity::Info,
        format!("\"{}\" reads as {} jargon", candidate.text, label),
    )
    .with_rationale("Users understand words from their world, not the system's internal vocabulary.")
    .with_action("Rephrase in the words your users would use.")
}
