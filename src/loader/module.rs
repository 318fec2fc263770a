//! Rule module formats.
//!
//! A module is either a YAML manifest:
//!
//! ```yaml
//! name: no-lorem-ipsum
//! category: minimalist-design
//! severity: warning
//! message: "placeholder copy left in the UI: {match}"
//! requires: [parser]
//! query: |
//!   ((jsx_text) @report (#match? @report "(?i)lorem ipsum"))
//! ```
//!
//! or a query script whose header lines carry the same keys:
//!
//! ```text
//! ;; @name no-lorem-ipsum
//! ;; @category minimalist-design
//! ;; @requires parser
//! ((jsx_text) @report (#match? @report "(?i)lorem ipsum"))
//! ```

use serde::Deserialize;

use super::LoadError;

/// Declarative description of a loaded rule.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    pub name: String,
    /// Category slug or code.
    pub category: String,
    /// Finding kind (default: the module name).
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default = "default_severity")]
    pub severity: String,
    /// Message template; `{match}` is the matched text, `{aux}` the
    /// auxiliary context.
    pub message: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub action: String,
    /// Capabilities the module needs.
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub accepts_auxiliary_context: bool,
    /// Tree query with a `@report` capture.
    #[serde(default)]
    pub query: Option<String>,
    /// Regex matched against code lines.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Word list (one per line) matched against code lines.
    #[serde(default)]
    pub vocabulary_file: Option<String>,
    /// Only analyze paths matching one of these globs.
    #[serde(default)]
    pub applies_to: Vec<String>,
    /// Emit a notification whenever the rule reports.
    #[serde(default)]
    pub notify: bool,
}

fn default_severity() -> String {
    "warning".to_string()
}

impl ModuleManifest {
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Parse a query script: `;; @key value` header lines, the rest is the
    /// query body.
    pub fn from_script(source: &str) -> Result<Self, LoadError> {
        let mut manifest = ModuleManifest {
            severity: default_severity(),
            ..Default::default()
        };
        let mut saw_directive = false;
        let mut body = Vec::new();

        for line in source.lines() {
            let trimmed = line.trim();
            let Some(directive) = trimmed.strip_prefix(";;").map(str::trim) else {
                body.push(line);
                continue;
            };
            let Some(rest) = directive.strip_prefix('@') else {
                continue; // plain comment
            };
            saw_directive = true;
            let (key, value) = match rest.split_once(char::is_whitespace) {
                Some((k, v)) => (k, v.trim()),
                None => (rest, ""),
            };
            let list = || {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            };
            match key {
                "name" => manifest.name = value.to_string(),
                "category" => manifest.category = value.to_string(),
                "kind" => manifest.kind = Some(value.to_string()),
                "severity" => manifest.severity = value.to_string(),
                "message" => manifest.message = value.to_string(),
                "rationale" => manifest.rationale = value.to_string(),
                "action" => manifest.action = value.to_string(),
                "requires" => manifest.requires.extend(list()),
                "applies_to" => manifest.applies_to.extend(list()),
                "pattern" => manifest.pattern = Some(value.to_string()),
                "vocabulary_file" => manifest.vocabulary_file = Some(value.to_string()),
                "accepts_auxiliary_context" => manifest.accepts_auxiliary_context = parse_flag(key, value)?,
                "notify" => manifest.notify = parse_flag(key, value)?,
                other => {
                    return Err(LoadError::Malformed(format!("unknown directive @{}", other)));
                }
            }
        }

        if !saw_directive {
            return Err(LoadError::Malformed("no `;; @key value` directives found".to_string()));
        }

        let query = body.join("\n");
        if !query.trim().is_empty() {
            manifest.query = Some(query);
        }
        Ok(manifest)
    }

    /// Parse `source`, trying the manifest format first and the script
    /// format second.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        match Self::from_yaml(source) {
            Ok(manifest) => Ok(manifest),
            Err(yaml_err) => {
                tracing::debug!("not a YAML manifest ({}), trying script form", yaml_err);
                Self::from_script(source).map_err(|script_err| {
                    LoadError::Malformed(format!(
                        "not a manifest ({}) nor a script ({})",
                        yaml_err, script_err
                    ))
                })
            }
        }
    }

    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(&self.name)
    }

    /// Whether any template refers to the auxiliary context.
    pub fn uses_auxiliary(&self) -> bool {
        [&self.message, &self.rationale, &self.action]
            .iter()
            .any(|t| t.contains("{aux}"))
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, LoadError> {
    match value {
        "" | "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        other => Err(LoadError::Malformed(format!("@{} expects true or false, got {:?}", key, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_manifest() {
        let yaml = r#"
name: no-lorem-ipsum
category: minimalist-design
message: "placeholder copy: {match}"
requires: [parser]
query: |
  ((jsx_text) @report (#match? @report "(?i)lorem"))
"#;
        let m = ModuleManifest::parse(yaml).unwrap();
        assert_eq!(m.name, "no-lorem-ipsum");
        assert_eq!(m.severity, "warning");
        assert_eq!(m.kind(), "no-lorem-ipsum");
        assert_eq!(m.requires, vec!["parser"]);
        assert!(m.query.unwrap().contains("@report"));
    }

    #[test]
    fn test_script_fallback() {
        let script = r#";; Flags placeholder copy.
;; @name no-lorem-ipsum
;; @category RUX108
;; @severity info
;; @message placeholder copy: {match}
;; @requires parser, notify
;; @notify
((jsx_text) @report (#match? @report "(?i)lorem"))
"#;
        let m = ModuleManifest::parse(script).unwrap();
        assert_eq!(m.category, "RUX108");
        assert_eq!(m.severity, "info");
        assert_eq!(m.requires, vec!["parser", "notify"]);
        assert!(m.notify);
        assert_eq!(
            m.query.as_deref().map(str::trim),
            Some(r#"((jsx_text) @report (#match? @report "(?i)lorem"))"#)
        );
    }

    #[test]
    fn test_neither_format() {
        let err = ModuleManifest::parse("((jsx_text) @report)").unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn test_uses_auxiliary() {
        let m = ModuleManifest {
            message: "see {aux}".to_string(),
            ..Default::default()
        };
        assert!(m.uses_auxiliary());
    }
}
