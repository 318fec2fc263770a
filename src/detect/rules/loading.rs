//! Async loading feedback: network calls and submit buttons should tell the
//! user something is happening.

use crate::config::RuleSettings;
use crate::detect::context::SourceLines;
use crate::detect::elements::{class_tokens, is_button};
use crate::detect::{vocab, Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, AttrValue, NodeKind, SyntaxNode, Visitor};

pub struct LoadingFeedback {
    radius: usize,
}

impl LoadingFeedback {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            radius: settings.context_radius,
        }
    }
}

fn is_loading_statement(stmt: &SyntaxNode) -> bool {
    vocab::LOADING_TOGGLE.is_match(&stmt.text) || vocab::LOADING_CONDITIONAL.is_match(&stmt.text)
}

fn is_submit(node: &SyntaxNode) -> bool {
    is_button(node) && node.literal("type") == Some("submit")
}

/// Disabled bound to state, a loading prop, or a descendant that renders
/// progress.
fn has_submit_feedback(node: &SyntaxNode) -> bool {
    if matches!(node.attr("disabled"), Some(AttrValue::Dynamic(_))) {
        return true;
    }
    let loading_prop = node.attributes.iter().any(|(name, value)| {
        vocab::LOADING.is_match(name) || (value.is_dynamic() && vocab::LOADING.is_match(value.text()))
    });
    if loading_prop {
        return true;
    }
    node.descendants().any(|d| match d.kind {
        NodeKind::Text => vocab::LOADING.is_match(&d.text) || d.text.ends_with("...") || d.text.ends_with('…'),
        NodeKind::Expression => vocab::LOADING.is_match(&d.text),
        NodeKind::Element => {
            vocab::SPINNER.is_match(&d.name)
                || class_tokens(d).iter().any(|t| vocab::SPINNER.is_match(t))
        }
        _ => false,
    })
}

struct Walk<'a> {
    radius: usize,
    lines: &'a SourceLines,
    diagnostics: Vec<Diagnostic>,
}

impl<'t, 'a> Visitor<'t> for Walk<'a> {
    fn call(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
        if !vocab::NETWORK_CALL.is_match(&node.name) {
            return;
        }
        let covered = match ancestors.enclosing_function() {
            Some(func) => func
                .children
                .iter()
                .filter(|c| c.kind == NodeKind::Statement)
                .any(is_loading_statement),
            None => self.lines.nearby(node.line.saturating_sub(1), self.radius, |l| {
                vocab::LOADING.is_match(l)
            }),
        };
        if covered {
            return;
        }
        self.diagnostics.push(
            Diagnostic::new(
                Category::SystemStatus,
                "missing-loading",
                node.line,
                Severity::Warning,
                format!("`{}` call has no loading state", node.name),
            )
            .with_rationale("Users who see no feedback during a request assume the UI is broken and retry.")
            .with_action("Set a loading flag before the request, clear it when it settles, and render it."),
        );
    }

    fn element(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        if !is_submit(node) || has_submit_feedback(node) {
            return;
        }
        self.diagnostics.push(
            Diagnostic::new(
                Category::SystemStatus,
                "submit-without-feedback",
                node.line,
                Severity::Warning,
                "submit button gives no feedback while the form is submitting",
            )
            .with_rationale("Without a busy state users submit twice or leave before the request completes.")
            .with_action("Bind `disabled` to the submitting state or show a spinner or \"Saving...\" label."),
        );
    }
}

impl Analyzer for LoadingFeedback {
    fn name(&self) -> &str {
        "loading-feedback"
    }

    fn category(&self) -> Category {
        Category::SystemStatus
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk {
            radius: self.radius,
            lines: input.lines,
            diagnostics: Vec::new(),
        };
        walk(tree.root(), &mut state);
        Ok(state.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::rules::testing::{kinds, run};

    fn rule() -> LoadingFeedback {
        LoadingFeedback::new(&RuleSettings::default())
    }

    #[test]
    fn test_fetch_without_loading() {
        let src = "async function load() {\n  const res = await fetch('/api/items');\n  return res.json();\n}\n";
        let diags = run(&rule(), src);
        assert_eq!(kinds(&diags), vec!["missing-loading"]);
        assert_eq!(diags[0].line, 2);
    }

    #[test]
    fn test_fetch_with_toggle() {
        let src = r#"
const load = async () => {
  setLoading(true);
  try {
    const res = await axios.get('/api/items');
    setItems(res.data);
  } finally {
    setLoading(false);
  }
};
"#;
        assert!(run(&rule(), src).is_empty());
    }

    #[test]
    fn test_fetch_with_conditional_guard() {
        let src = r#"
function refresh() {
  if (isFetching) return;
  fetch('/api/refresh');
}
"#;
        assert!(run(&rule(), src).is_empty());
    }

    #[test]
    fn test_top_level_call_uses_context_window() {
        let flagged = "const data = fetch('/api/config');\n";
        assert_eq!(kinds(&run(&rule(), flagged)), vec!["missing-loading"]);

        let covered = "let loading = true;\nconst data = fetch('/api/config');\n";
        assert!(run(&rule(), covered).is_empty());
    }

    #[test]
    fn test_submit_buttons() {
        let src = r#"
const F = () => (
  <form>
    <button type="submit">Save</button>
    <button type="submit" disabled={saving}>Save</button>
    <button type="submit">{saving ? <Spinner /> : 'Save'}</button>
    <Button type="submit" loading={isSaving}>Save</Button>
    <button type="button">Other</button>
  </form>
);
"#;
        let diags = run(&rule(), src);
        assert_eq!(kinds(&diags), vec!["submit-without-feedback"]);
        assert_eq!(diags[0].line, 4);
    }
}
