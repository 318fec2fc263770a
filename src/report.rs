//! Output formatting for usecheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::detect::{AnalysisResult, Category, Diagnostic, Severity, SuppressionType};

/// What was scanned and how strictly.
pub struct ReportContext<'a> {
    /// Path given on the command line.
    pub path: &'a str,
    /// Config file used, or "defaults".
    pub config: &'a str,
    pub fail_on: Severity,
    pub show_suppressed: bool,
}

impl ReportContext<'_> {
    pub fn passed(&self, result: &AnalysisResult) -> bool {
        !result.has_failures(self.fail_on)
    }
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub config: String,
    pub fail_on: String,
    pub passed: bool,
    pub files_scanned: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_failures: Vec<JsonParseFailure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedDiagnostic>,
    pub suppressed_count: usize,
    pub summary: Vec<SummaryEntry>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub file: String,
    pub line: usize,
    pub category: String,
    pub code: String,
    pub kind: String,
    pub severity: String,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub rationale: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub action: String,
    pub documentation: String,
}

#[derive(Serialize, Deserialize)]
pub struct JsonParseFailure {
    pub file: String,
    pub line: usize,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct JsonSuppressedDiagnostic {
    pub diagnostic: JsonDiagnostic,
    pub suppression: JsonSuppression,
}

#[derive(Serialize, Deserialize)]
pub struct JsonSuppression {
    pub rule: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub reason: String,
    pub line: usize,
    #[serde(rename = "type")]
    pub suppression_type: String,
}

/// Findings per category.
#[derive(Serialize, Deserialize)]
pub struct SummaryEntry {
    pub category: String,
    pub code: String,
    pub label: String,
    pub count: usize,
}

fn diagnostic_to_json(file: &str, d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        file: file.to_string(),
        line: d.line,
        category: d.category.slug().to_string(),
        code: d.code().to_string(),
        kind: d.kind.clone(),
        severity: d.severity.to_string(),
        message: d.message.clone(),
        rationale: d.rationale.clone(),
        action: d.suggested_action.clone(),
        documentation: d.category.url().to_string(),
    }
}

fn summary(result: &AnalysisResult) -> Vec<SummaryEntry> {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for (_, d) in result.diagnostics() {
        *counts.entry(d.category).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| SummaryEntry {
            category: category.slug().to_string(),
            code: category.code().to_string(),
            label: category.label().to_string(),
            count,
        })
        .collect()
}

pub fn build_json(ctx: &ReportContext<'_>, result: &AnalysisResult) -> JsonReport {
    let suppressed: Vec<JsonSuppressedDiagnostic> = result
        .suppressed()
        .map(|(file, s)| JsonSuppressedDiagnostic {
            diagnostic: diagnostic_to_json(file, &s.diagnostic),
            suppression: JsonSuppression {
                rule: s.suppression.rule.clone(),
                reason: s.suppression.reason.clone(),
                line: s.suppression.line,
                suppression_type: suppression_type_str(s.suppression.suppression_type).to_string(),
            },
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: ctx.path.to_string(),
        config: ctx.config.to_string(),
        fail_on: ctx.fail_on.to_string(),
        passed: ctx.passed(result),
        files_scanned: result.scanned,
        diagnostics: result
            .diagnostics()
            .map(|(file, d)| diagnostic_to_json(file, d))
            .collect(),
        parse_failures: result
            .parse_failures()
            .map(|(file, e)| JsonParseFailure {
                file: file.to_string(),
                line: e.line,
                message: e.message.clone(),
            })
            .collect(),
        rule_warnings: result.rule_warnings.clone(),
        suppressed_count: suppressed.len(),
        suppressed,
        summary: summary(result),
    }
}

/// Write results in JSON format.
pub fn write_json(ctx: &ReportContext<'_>, result: &AnalysisResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json(ctx, result))?;
    println!("{}", json);
    Ok(())
}

fn suppression_type_str(t: SuppressionType) -> &'static str {
    match t {
        SuppressionType::Line => "line",
        SuppressionType::NextLine => "next-line",
        SuppressionType::File => "file",
    }
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "usecheck";
const INFO_URI: &str = "https://github.com/zen-systems/usecheck";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri")]
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "helpUri")]
    pub help_uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub properties: SarifProperties,
}

#[derive(Serialize, Deserialize)]
pub struct SarifProperties {
    pub kind: String,
    pub category: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Suggestion => "note",
    }
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.to_string_lossy().is_empty() {
        return file_path.to_string();
    }

    let file = Path::new(file_path);

    // Single file scan: just the file name
    if file == base_path {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string());
    }

    file.strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

pub fn build_sarif(base_path: &Path, result: &AnalysisResult) -> SarifReport {
    let mut categories: Vec<Category> = result.diagnostics().map(|(_, d)| d.category).collect();
    categories.sort();
    categories.dedup();

    let rules = categories
        .into_iter()
        .map(|c| SarifRule {
            id: c.code().to_string(),
            name: c.slug().to_string(),
            short_description: SarifMessage {
                text: c.label().to_string(),
            },
            help_uri: c.url().to_string(),
        })
        .collect();

    let results = result
        .diagnostics()
        .map(|(file, d)| SarifResult {
            rule_id: d.code().to_string(),
            level: map_severity_to_level(d.severity).to_string(),
            message: SarifMessage {
                text: d.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: make_relative_path(file, base_path),
                    },
                    region: SarifRegion {
                        start_line: d.line.max(1),
                    },
                },
            }],
            properties: SarifProperties {
                kind: d.kind.clone(),
                category: d.category.slug().to_string(),
            },
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: INFO_URI.to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(base_path: &Path, result: &AnalysisResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_sarif(base_path, result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(ctx: &ReportContext<'_>, result: &AnalysisResult) {
    println!();
    print!("  ");
    print!("{}", "usecheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{} ({} files)", ctx.path, result.scanned);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", ctx.config);
    println!();

    for file in &result.files {
        if file.diagnostics.is_empty() {
            continue;
        }
        println!("  {}", file.file.blue().bold());
        for d in &file.diagnostics {
            write_diagnostic(d);
        }
        println!();
    }

    let failures: Vec<_> = result.parse_failures().collect();
    if !failures.is_empty() {
        println!("  {} ({}):", "Parse failures".red().bold(), failures.len());
        for (file, e) in failures {
            println!("    {}{} {}", file.blue(), format!(":{}", e.line).dimmed(), e.message);
        }
        println!();
    }

    if !result.rule_warnings.is_empty() {
        println!("  {} ({}):", "Skipped rule modules".yellow(), result.rule_warnings.len());
        for w in &result.rule_warnings {
            println!("    {}", w.dimmed());
        }
        println!();
    }

    if result.suppressed_count() > 0 {
        write_suppressed_summary(result, ctx.show_suppressed);
        println!();
    }

    write_summary(ctx, result);
    println!();
}

fn write_diagnostic(d: &Diagnostic) {
    write_severity_tag(d.severity);
    print!("{:>5}  ", format!(":{}", d.line).dimmed());
    print!("{}  ", d.code().dimmed());
    print!("{:<28}", d.kind.as_str().dimmed());
    println!("{}", d.message);
    if !d.rationale.is_empty() {
        println!("{:>22}{}", "", d.rationale.dimmed());
    }
    if !d.suggested_action.is_empty() {
        println!("{:>22}{} {}", "", "→".green(), d.suggested_action);
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
        Severity::Suggestion => print!("    {} ", "HINT ".cyan()),
    }
}

fn write_suppressed_summary(result: &AnalysisResult, show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), result.suppressed_count());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for (file, s) in result.suppressed() {
        let d = &s.diagnostic;
        print!("    {:<28}", d.kind.as_str().dimmed());
        print!("{}", file.blue());
        if s.suppression.suppression_type == SuppressionType::File {
            print!("{}", ":* (file)".dimmed());
        } else {
            print!("{}", format!(":{}", d.line).dimmed());
        }
        println!();

        if !s.suppression.reason.is_empty() {
            println!("            {}", format!("reason: {:?}", s.suppression.reason).dimmed());
        }
    }
}

fn write_summary(ctx: &ReportContext<'_>, result: &AnalysisResult) {
    let entries = summary(result);
    if !entries.is_empty() {
        println!("  {}", "Summary:".bold());
        for e in &entries {
            println!("    {}  {:<55} {:>3}", e.code.dimmed(), e.label, e.count);
        }
        println!();
    }

    print!(
        "  {}",
        format!("{} findings, fail on {}", result.diagnostic_count(), ctx.fail_on).dimmed()
    );
    print!("  ");
    if ctx.passed(result) {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{FileReport, SuppressedDiagnostic, Suppression};
    use crate::parser::ParseError;

    fn sample() -> AnalysisResult {
        let mut page = FileReport::new("/app/src/Checkout.tsx");
        page.diagnostics = vec![
            Diagnostic::new(Category::ErrorPrevention, "unconfirmed-destructive-action", 12, Severity::Error, "delete without confirmation")
                .with_rationale("r")
                .with_action("a"),
            Diagnostic::new(Category::Recognition, "missing-placeholder", 20, Severity::Suggestion, "date input"),
        ];
        page.suppressed = vec![SuppressedDiagnostic {
            diagnostic: Diagnostic::new(Category::Consistency, "logo-not-linked", 3, Severity::Suggestion, "logo"),
            suppression: Suppression {
                rule: "logo-not-linked".to_string(),
                reason: "splash".to_string(),
                line: 2,
                suppression_type: SuppressionType::NextLine,
            },
        }];

        let mut broken = FileReport::new("/app/src/Broken.tsx");
        broken.parse_error = Some(ParseError {
            message: "unrecoverable syntax".to_string(),
            line: 1,
        });

        AnalysisResult {
            files: vec![broken, page],
            scanned: 2,
            rule_warnings: vec!["rules/bad.yaml: no detector: x".to_string()],
        }
    }

    fn ctx(fail_on: Severity) -> ReportContext<'static> {
        ReportContext {
            path: "src",
            config: "usecheck.yaml",
            fail_on,
            show_suppressed: false,
        }
    }

    #[test]
    fn test_json_report() {
        let report = build_json(&ctx(Severity::Error), &sample());
        assert!(!report.passed);
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.diagnostics.len(), 2);

        let first = &report.diagnostics[0];
        assert_eq!(first.code, "RUX105");
        assert_eq!(first.category, "error-prevention");
        assert_eq!(first.documentation, "https://www.nngroup.com/articles/slips/");
        assert_eq!(first.action, "a");

        assert_eq!(report.parse_failures.len(), 1);
        assert_eq!(report.rule_warnings.len(), 1);
        assert_eq!(report.suppressed_count, 1);
        assert_eq!(report.suppressed[0].suppression.suppression_type, "next-line");

        let codes: Vec<&str> = report.summary.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["RUX105", "RUX106"]);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["diagnostics"][1].get("rationale").is_none());
    }

    #[test]
    fn test_passed_respects_threshold() {
        let mut result = sample();
        result.files[1].diagnostics.remove(0);
        assert!(build_json(&ctx(Severity::Error), &result).passed);
        assert!(!build_json(&ctx(Severity::Suggestion), &result).passed);
    }

    #[test]
    fn test_sarif_report() {
        let sarif = build_sarif(Path::new("/app"), &sample());
        let run = &sarif.runs[0];
        let ids: Vec<&str> = run.tool.driver.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["RUX105", "RUX106"]);
        assert_eq!(run.tool.driver.rules[0].help_uri, "https://www.nngroup.com/articles/slips/");

        assert_eq!(run.results.len(), 2);
        assert_eq!(run.results[0].level, "error");
        assert_eq!(run.results[1].level, "note");
        assert_eq!(run.results[0].properties.kind, "unconfirmed-destructive-action");
        assert_eq!(
            run.results[0].locations[0].physical_location.artifact_location.uri,
            "src/Checkout.tsx"
        );
    }
}
