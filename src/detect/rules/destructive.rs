//! Destructive-action safety and input constraints (error prevention).

use std::collections::HashMap;

use crate::config::RuleSettings;
use crate::detect::context::SourceLines;
use crate::detect::elements::{field_words, handler_target, is_actionable, label_text};
use crate::detect::{vocab, Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, NodeKind, SyntaxNode, Visitor};

pub struct DestructiveAction {
    radius: usize,
}

impl DestructiveAction {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            radius: settings.context_radius,
        }
    }
}

struct Walk<'t, 'a> {
    radius: usize,
    lines: &'a SourceLines,
    functions: HashMap<&'t str, &'t SyntaxNode>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t, 'a> Walk<'t, 'a> {
    fn is_confirmed(&self, node: &SyntaxNode, ancestors: &Ancestors<'_, 't>) -> bool {
        if ancestors.any(|a| a.is_element() && vocab::CONFIRM.is_match(&a.name)) {
            return true;
        }
        let Some(handler) = node.attr("onClick") else {
            return false;
        };
        if vocab::CONFIRM.is_match(handler.text()) {
            return true;
        }
        if let Some(func) = handler_target(handler).and_then(|name| self.functions.get(name)) {
            if vocab::CONFIRM.is_match(&func.text) {
                return true;
            }
        }
        self.lines
            .nearby(node.line.saturating_sub(1), self.radius, |l| vocab::CONFIRM.is_match(l))
    }

    fn check_input(&mut self, node: &SyntaxNode) {
        if node.name != "input" || node.has_attr("pattern") || node.has_attr("inputMode") {
            return;
        }
        if !matches!(node.attr("type").and_then(|t| t.as_literal()), None | Some("text")) {
            return;
        }
        if node.attr("type").map(|t| t.is_dynamic()).unwrap_or(false) {
            return;
        }
        let words = field_words(node);
        let Some((word, input_type)) = vocab::CONSTRAINED_FIELDS
            .iter()
            .find(|(w, _)| words.iter().any(|x| x == w))
        else {
            return;
        };
        self.diagnostics.push(
            Diagnostic::new(
                Category::ErrorPrevention,
                "unconstrained-input",
                node.line,
                Severity::Suggestion,
                format!("\"{}\" field accepts free text", word),
            )
            .with_rationale("Constrained inputs prevent malformed values before they are submitted.")
            .with_action(format!("Use type=\"{}\" or add a validation pattern.", input_type)),
        );
    }
}

impl<'t, 'a> Visitor<'t> for Walk<'t, 'a> {
    fn element(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
        self.check_input(node);

        if !is_actionable(node) || !node.has_attr("onClick") {
            return;
        }
        let label = label_text(node);
        if !vocab::DESTRUCTIVE.is_match(&label) || self.is_confirmed(node, &ancestors) {
            return;
        }
        self.diagnostics.push(
            Diagnostic::new(
                Category::ErrorPrevention,
                "unconfirmed-destructive-action",
                node.line,
                Severity::Error,
                format!("\"{}\" runs without a confirmation step", label),
            )
            .with_rationale("One mis-click should not destroy data.")
            .with_action("Ask for confirmation before running the action, or make it undoable."),
        );
    }
}

impl Analyzer for DestructiveAction {
    fn name(&self) -> &str {
        "destructive-action"
    }

    fn category(&self) -> Category {
        Category::ErrorPrevention
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let functions = tree
            .root()
            .descendants()
            .filter(|n| n.kind == NodeKind::Function && !n.name.is_empty())
            .map(|n| (n.name.as_str(), n))
            .collect();
        let mut state = Walk {
            radius: self.radius,
            lines: input.lines,
            functions,
            diagnostics: Vec::new(),
        };
        walk(tree.root(), &mut state);
        Ok(state.diagnostics)
    }
}
