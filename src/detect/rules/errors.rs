//! Error recognition: error messages in plain language and visibly styled.

use crate::detect::elements::{base_name, class_tokens, is_native, style_properties};
use crate::detect::{vocab, Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{string_literal, walk, Ancestors, SyntaxNode, Visitor};

/// Attributes whose literal values are shown to users as messages.
const MESSAGE_ATTRS: &[&str] = &[
    "message",
    "title",
    "description",
    "helperText",
    "error",
    "errorMessage",
    "label",
    "aria-label",
];

/// Props that let a component style itself as an error.
const STYLE_PROPS: &[&str] = &["color", "variant", "severity", "status", "intent", "tone", "type"];

pub struct ErrorRecognition;

fn is_error_like(node: &SyntaxNode) -> bool {
    if is_native(node) {
        return class_tokens(node).iter().any(|t| vocab::ERROR_LIKE.is_match(t));
    }
    let name = base_name(node);
    vocab::ERROR_LIKE.is_match(name) && !name.contains("Boundary")
}

fn is_styled(node: &SyntaxNode) -> bool {
    class_tokens(node).iter().any(|t| vocab::ERROR_STYLE.is_match(t))
        || style_properties(node).iter().any(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            lower.contains("color") || lower == "fontweight" || lower == "background"
        })
        || (!is_native(node) && STYLE_PROPS.iter().any(|p| node.has_attr(p)))
}

#[derive(Default)]
struct Walk {
    flagged_lines: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Walk {
    fn check_text(&mut self, text: &str, line: usize) {
        let Some(m) = vocab::TECHNICAL_ERROR.find(text) else {
            return;
        };
        if self.flagged_lines.contains(&line) {
            return;
        }
        self.flagged_lines.push(line);
        self.diagnostics.push(
            Diagnostic::new(
                Category::ErrorRecognition,
                "technical-error-message",
                line,
                Severity::Warning,
                format!("message exposes technical wording \"{}\"", m.as_str()),
            )
            .with_rationale("Users cannot act on internal error codes or exception names.")
            .with_action("Say what went wrong in plain words and how to fix it."),
        );
    }
}

impl<'t> Visitor<'t> for Walk {
    fn element(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
        for attr in MESSAGE_ATTRS {
            if let Some(text) = node.literal(attr) {
                self.check_text(text, node.line);
            }
        }

        if is_error_like(node) && !is_styled(node) && !ancestors.any(is_error_like) {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::ErrorRecognition,
                    "unstyled-error",
                    node.line,
                    Severity::Suggestion,
                    format!("error element <{}> is not visually distinguished", node.name),
                )
                .with_rationale("Errors that look like regular text are missed.")
                .with_action("Give errors a distinct color and weight (and an icon)."),
            );
        }
    }

    fn text(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        self.check_text(&node.text, node.line);
    }

    fn expression(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        if let Some(text) = string_literal(&node.text) {
            self.check_text(text, node.line);
        }
    }
}

impl Analyzer for ErrorRecognition {
    fn name(&self) -> &str {
        "error-recognition"
    }

    fn category(&self) -> Category {
        Category::ErrorRecognition
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk::default();
        walk(tree.root(), &mut state);
        Ok(state.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::rules::testing::{kinds, run};

    #[test]
    fn test_technical_wording() {
        let src = r#"
const E = () => (
  <div>
    <p className="text-red-600">Uncaught TypeError: cannot read property</p>
    <Toast message="Request failed with status code 500" />
    <p className="text-red-600">{'ECONNREFUSED'}</p>
    <p>We could not save your changes. Try again.</p>
  </div>
);
"#;
        let diags = run(&ErrorRecognition, src);
        assert_eq!(
            kinds(&diags),
            vec![
                "technical-error-message",
                "technical-error-message",
                "technical-error-message"
            ]
        );
        let lines: Vec<_> = diags.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![4, 5, 6]);
    }

    #[test]
    fn test_coded_and_network_errors() {
        let src = r#"
const E = () => (
  <div>
    <p>Error 500</p>
    <p>ERR_CONNECTION_REFUSED</p>
    <p>Network Error</p>
    <p>Error code E1023</p>
    <p>Error: please pick a date</p>
    <p>Call us at 555 0100 if the error persists</p>
  </div>
);
"#;
        let diags = run(&ErrorRecognition, src);
        let lines: Vec<_> = diags.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![4, 5, 6, 7]);
        assert!(diags.iter().all(|d| d.kind == "technical-error-message"));
    }

    #[test]
    fn test_unstyled_error() {
        let src = r#"
const E = () => (
  <form>
    <span className="error">Required</span>
    <span className="error text-red-600 font-medium">Required</span>
    <FormError>Required</FormError>
    <Alert severity="error">Nope</Alert>
    <ErrorBoundary><div /></ErrorBoundary>
    <div className="field-error" style={{ color: 'crimson' }}>Bad</div>
  </form>
);
"#;
        let diags = run(&ErrorRecognition, src);
        assert_eq!(kinds(&diags), vec!["unstyled-error", "unstyled-error"]);
        assert_eq!(diags[0].line, 4);
        assert_eq!(diags[1].line, 6);
    }
}
