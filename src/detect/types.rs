//! Core types for analysis results.

use serde::{Deserialize, Serialize};

use crate::parser::ParseError;

use super::SuppressedDiagnostic;

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Suggestion,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Suggestion => "suggestion",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
            Severity::Suggestion => 0,
        }
    }

    /// Whether this severity is at or above `threshold`.
    pub fn at_least(&self, threshold: Severity) -> bool {
        self.rank() >= threshold.rank()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "suggestion" => Ok(Severity::Suggestion),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Usability heuristic a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    NavigationTrail,
    SystemStatus,
    UserControl,
    Consistency,
    ErrorPrevention,
    Recognition,
    Efficiency,
    MinimalistDesign,
    ErrorRecognition,
    HelpDocumentation,
    RealWorldLanguage,
}

/// Documentation entry for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDoc {
    pub label: &'static str,
    /// Stable short code (`RUX101`...).
    pub code: &'static str,
    pub url: &'static str,
}

static CATEGORY_DOCS: phf::Map<&'static str, CategoryDoc> = phf::phf_map! {
    "navigation-trail" => CategoryDoc {
        label: "Navigation trail",
        code: "RUX101",
        url: "https://www.nngroup.com/articles/breadcrumbs/",
    },
    "system-status" => CategoryDoc {
        label: "Visibility of system status",
        code: "RUX102",
        url: "https://www.nngroup.com/articles/visibility-system-status/",
    },
    "user-control" => CategoryDoc {
        label: "User control and freedom",
        code: "RUX103",
        url: "https://www.nngroup.com/articles/user-control-and-freedom/",
    },
    "consistency" => CategoryDoc {
        label: "Consistency and standards",
        code: "RUX104",
        url: "https://www.nngroup.com/articles/consistency-and-standards/",
    },
    "error-prevention" => CategoryDoc {
        label: "Error prevention",
        code: "RUX105",
        url: "https://www.nngroup.com/articles/slips/",
    },
    "recognition" => CategoryDoc {
        label: "Recognition rather than recall",
        code: "RUX106",
        url: "https://www.nngroup.com/articles/recognition-and-recall/",
    },
    "efficiency" => CategoryDoc {
        label: "Flexibility and efficiency of use",
        code: "RUX107",
        url: "https://www.nngroup.com/articles/flexibility-efficiency-heuristic/",
    },
    "minimalist-design" => CategoryDoc {
        label: "Aesthetic and minimalist design",
        code: "RUX108",
        url: "https://www.nngroup.com/articles/aesthetic-minimalist-design/",
    },
    "error-recognition" => CategoryDoc {
        label: "Help users recognize, diagnose and recover from errors",
        code: "RUX109",
        url: "https://www.nngroup.com/articles/error-message-guidelines/",
    },
    "help-documentation" => CategoryDoc {
        label: "Help and documentation",
        code: "RUX110",
        url: "https://www.nngroup.com/articles/help-and-documentation/",
    },
    "real-world-language" => CategoryDoc {
        label: "Match between system and the real world",
        code: "RUX111",
        url: "https://www.nngroup.com/articles/match-system-real-world/",
    },
};

impl Category {
    pub const ALL: [Category; 11] = [
        Category::NavigationTrail,
        Category::SystemStatus,
        Category::UserControl,
        Category::Consistency,
        Category::ErrorPrevention,
        Category::Recognition,
        Category::Efficiency,
        Category::MinimalistDesign,
        Category::ErrorRecognition,
        Category::HelpDocumentation,
        Category::RealWorldLanguage,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Category::NavigationTrail => "navigation-trail",
            Category::SystemStatus => "system-status",
            Category::UserControl => "user-control",
            Category::Consistency => "consistency",
            Category::ErrorPrevention => "error-prevention",
            Category::Recognition => "recognition",
            Category::Efficiency => "efficiency",
            Category::MinimalistDesign => "minimalist-design",
            Category::ErrorRecognition => "error-recognition",
            Category::HelpDocumentation => "help-documentation",
            Category::RealWorldLanguage => "real-world-language",
        }
    }

    /// Look up a category by slug or short code.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.slug().eq_ignore_ascii_case(s) || c.code().eq_ignore_ascii_case(s))
    }

    pub fn doc(&self) -> &'static CategoryDoc {
        // Every variant has an entry; the table test below keeps it that way.
        &CATEGORY_DOCS[self.slug()]
    }

    pub fn code(&self) -> &'static str {
        self.doc().code
    }

    pub fn label(&self) -> &'static str {
        self.doc().label
    }

    pub fn url(&self) -> &'static str {
        self.doc().url
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// A single finding reported by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: Category,
    /// Finding kind, e.g. `missing-undo-option`.
    pub kind: String,
    /// 1-based line.
    pub line: usize,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub suggested_action: String,
}

impl Diagnostic {
    pub fn new(
        category: Category,
        kind: impl Into<String>,
        line: usize,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            kind: kind.into(),
            line,
            severity,
            message: message.into(),
            rationale: String::new(),
            suggested_action: String::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.suggested_action = action.into();
        self
    }

    pub fn code(&self) -> &'static str {
        self.category.code()
    }
}

/// Analysis outcome for one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    pub suppressed: Vec<SuppressedDiagnostic>,
    /// Set when the file could not be parsed; no diagnostics are reported then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<ParseError>,
}

impl FileReport {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }
}

/// Results of analyzing a set of files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    pub files: Vec<FileReport>,
    /// Number of files scanned
    pub scanned: usize,
    /// Non-fatal rule-module load warnings.
    #[serde(default)]
    pub rule_warnings: Vec<String>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// All active diagnostics with their file.
    pub fn diagnostics(&self) -> impl Iterator<Item = (&str, &Diagnostic)> {
        self.files
            .iter()
            .flat_map(|f| f.diagnostics.iter().map(move |d| (f.file.as_str(), d)))
    }

    pub fn diagnostic_count(&self) -> usize {
        self.files.iter().map(|f| f.diagnostics.len()).sum()
    }

    pub fn suppressed(&self) -> impl Iterator<Item = (&str, &SuppressedDiagnostic)> {
        self.files
            .iter()
            .flat_map(|f| f.suppressed.iter().map(move |s| (f.file.as_str(), s)))
    }

    /// Number of suppressed diagnostics.
    pub fn suppressed_count(&self) -> usize {
        self.files.iter().map(|f| f.suppressed.len()).sum()
    }

    pub fn parse_failures(&self) -> impl Iterator<Item = (&str, &ParseError)> {
        self.files
            .iter()
            .filter_map(|f| f.parse_error.as_ref().map(|e| (f.file.as_str(), e)))
    }

    /// Whether any active diagnostic is at or above `threshold`.
    pub fn has_failures(&self, threshold: Severity) -> bool {
        self.diagnostics().any(|(_, d)| d.severity.at_least(threshold))
    }
}
