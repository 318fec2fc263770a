//! Inline suppression of diagnostics via comments.
//!
//! Supports suppression comments like:
//! - `// usecheck:ignore <rule> - <reason>`
//! - `// usecheck:ignore-next-line <rule> - <reason>`
//! - `// usecheck:ignore-file <rule> - <reason>`
//!
//! The same directives work inside `/* */` and JSX `{/* */}` comments.
//! `<rule>` is a finding kind, a category slug, a category code or `*`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Category, Diagnostic};

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressionType {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
    /// Applies to the entire file
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    /// Kind, category slug, category code or `*`.
    pub rule: String,
    pub reason: String,
    /// Line number (0 for file-level)
    pub line: usize,
    pub suppression_type: SuppressionType,
}

/// A diagnostic that was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDiagnostic {
    pub diagnostic: Diagnostic,
    pub suppression: Suppression,
}

/// Lines after which `ignore-file` directives are no longer honoured unless
/// the file header is still going.
const FILE_HEADER_LINES: usize = 10;

lazy_static::lazy_static! {
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        // Block and JSX comments: /* usecheck:... */ and {/* usecheck:... */}
        Regex::new(r"/\*\s*usecheck:(ignore(?:-file|-next-line)?)\s+(\S+?)(?:\s+-\s*(.*?))?\s*\*/").unwrap(),
        // Line comments: // usecheck:...
        Regex::new(r"//\s*usecheck:(ignore(?:-file|-next-line)?)\s+(\S+)(?:\s+-\s*(.*))?").unwrap(),
    ];
}

/// Parse suppression directives from file content.
pub fn parse_suppressions(content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let trimmed = line.trim();

        if in_header && !is_comment_or_empty(trimmed) {
            in_header = false;
        }

        for pattern in SUPPRESSION_PATTERNS.iter() {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let rule = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let reason = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            let suppression_type = match directive {
                "ignore-file" => {
                    if !in_header && line_number > FILE_HEADER_LINES {
                        break;
                    }
                    SuppressionType::File
                }
                "ignore-next-line" => SuppressionType::NextLine,
                "ignore" => {
                    // Alone on its line it covers the next line, after code it
                    // covers its own line.
                    let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                    let before = line[..start].trim().trim_end_matches('{').trim();
                    if before.is_empty() {
                        SuppressionType::NextLine
                    } else {
                        SuppressionType::Line
                    }
                }
                _ => break,
            };

            suppressions.push(Suppression {
                rule: rule.to_string(),
                reason,
                line: if suppression_type == SuppressionType::File {
                    0
                } else {
                    line_number
                },
                suppression_type,
            });
            break; // one directive per line
        }
    }

    suppressions
}

fn is_comment_or_empty(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("//")
        || line.starts_with("/*")
        || line.starts_with('*')
        || line.starts_with("{/*")
        || line.starts_with("\"use ")
        || line.starts_with("'use ")
}

/// Whether `rule` names the diagnostic's kind, category or code.
fn rule_matches(rule: &str, diagnostic: &Diagnostic) -> bool {
    rule == "*"
        || rule == diagnostic.kind
        || Category::parse(rule) == Some(diagnostic.category)
}

/// Check if a diagnostic matches a suppression.
pub fn matches_suppression(diagnostic: &Diagnostic, suppression: &Suppression) -> bool {
    if !rule_matches(&suppression.rule, diagnostic) {
        return false;
    }
    match suppression.suppression_type {
        SuppressionType::File => true,
        SuppressionType::Line => diagnostic.line == suppression.line,
        SuppressionType::NextLine => diagnostic.line == suppression.line + 1,
    }
}

/// Separate diagnostics into active and suppressed.
pub fn filter_suppressed(
    diagnostics: Vec<Diagnostic>,
    suppressions: &[Suppression],
) -> (Vec<Diagnostic>, Vec<SuppressedDiagnostic>) {
    if suppressions.is_empty() {
        return (diagnostics, Vec::new());
    }

    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for diagnostic in diagnostics {
        match suppressions
            .iter()
            .find(|s| matches_suppression(&diagnostic, s))
        {
            Some(suppression) => suppressed.push(SuppressedDiagnostic {
                diagnostic,
                suppression: suppression.clone(),
            }),
            None => active.push(diagnostic),
        }
    }

    (active, suppressed)
}
