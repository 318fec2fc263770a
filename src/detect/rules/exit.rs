//! Exit and undo affordances: modals must be closable, multi-step flows
//! must allow going back, destructive actions need a way out.

use regex::Regex;

use crate::detect::elements::{base_name, class_tokens, is_actionable, is_button, label_text};
use crate::detect::{vocab, Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, NodeKind, SyntaxNode, Visitor};

lazy_static::lazy_static! {
    static ref MODAL_NAME: Regex =
        Regex::new(r"(Modal|Dialog|Drawer|Sheet|Popup|Lightbox)$").unwrap();
    static ref CLOSE_HANDLER: Regex =
        Regex::new(r"^on(Close|Dismiss|Cancel|Hide|RequestClose|OpenChange|Exit)$").unwrap();
}

pub struct ExitUndo;

pub(crate) fn is_modal(node: &SyntaxNode) -> bool {
    node.is_element()
        && (node.name == "dialog"
            || MODAL_NAME.is_match(base_name(node))
            || matches!(node.literal("role"), Some("dialog" | "alertdialog")))
}

fn has_close_handler(node: &SyntaxNode) -> bool {
    node.attributes.keys().any(|k| CLOSE_HANDLER.is_match(k))
}

/// An element whose text, accessible label or icon means "close".
fn is_close_affordance(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    if vocab::CLOSE_ICON.is_match(base_name(node)) {
        return true;
    }
    if node
        .literal("aria-label")
        .map(|l| vocab::CLOSE.is_match(l))
        .unwrap_or(false)
    {
        return true;
    }
    if class_tokens(node).iter().any(|t| vocab::CLOSE_ICON.is_match(t)) {
        return true;
    }
    is_actionable(node) && vocab::CLOSE.is_match(&label_text(node))
}

#[derive(Default)]
struct Walk<'t> {
    step_seen: bool,
    back_seen: bool,
    next_buttons: Vec<&'t SyntaxNode>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Walk<'t> {
    fn check_modal(&mut self, node: &SyntaxNode) {
        if !has_close_handler(node) {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::UserControl,
                    "missing-close-handler",
                    node.line,
                    Severity::Error,
                    format!("<{}> has no close handler", node.name),
                )
                .with_rationale("A modal that cannot be dismissed traps the user.")
                .with_action("Pass an `onClose` (or `onOpenChange`) handler that closes it."),
            );
        }
        if !node.descendants().any(is_close_affordance) {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::UserControl,
                    "missing-visible-exit",
                    node.line,
                    Severity::Warning,
                    format!("<{}> has no visible close control", node.name),
                )
                .with_rationale("Users look for an explicit exit; Escape and backdrop clicks are not discoverable.")
                .with_action("Add a close button with a close icon or \"Close\" label."),
            );
        }
    }

    fn check_destructive(&mut self, node: &SyntaxNode, ancestors: Ancestors<'_, 't>) {
        let has_undo = ancestors
            .parent_element()
            .map(|parent| {
                parent.descendant_elements().any(|d| {
                    !std::ptr::eq(d, node) && is_actionable(d) && vocab::UNDO.is_match(&label_text(d))
                })
            })
            .unwrap_or(false);
        if has_undo {
            return;
        }
        self.diagnostics.push(
            Diagnostic::new(
                Category::UserControl,
                "missing-undo-option",
                node.line,
                Severity::Warning,
                format!("destructive action \"{}\" offers no undo or cancel", label_text(node)),
            )
            .with_rationale("Mistakes are inevitable; an undo or cancel next to the action lets users recover.")
            .with_action("Place an Undo, Cancel or Restore action alongside it."),
        );
    }
}

impl<'t> Visitor<'t> for Walk<'t> {
    fn element(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
        if is_modal(node) {
            self.check_modal(node);
        }
        if node.name.contains("Step") {
            self.step_seen = true;
        }
        if !is_button(node) {
            return;
        }
        let label = label_text(node);
        if vocab::BACK.is_match(&label) {
            self.back_seen = true;
        } else if vocab::NEXT.is_match(&label) {
            self.next_buttons.push(node);
        }
        if vocab::DESTRUCTIVE.is_match(&label) {
            self.check_destructive(node, ancestors);
        }
    }

    fn text(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        if vocab::STEP.is_match(&node.text) {
            self.step_seen = true;
        }
    }

    fn leave(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        if node.kind != NodeKind::Root || !self.step_seen || self.back_seen {
            return;
        }
        for next in std::mem::take(&mut self.next_buttons) {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::UserControl,
                    "missing-back-navigation",
                    next.line,
                    Severity::Warning,
                    "multi-step flow has no way back to the previous step",
                )
                .with_rationale("Users need to revisit earlier steps to correct answers without starting over.")
                .with_action("Add a Back or Previous button next to the Next button."),
            );
        }
    }
}

impl Analyzer for ExitUndo {
    fn name(&self) -> &str {
        "exit-undo"
    }

    fn category(&self) -> Category {
        Category::UserControl
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk::default();
        walk(tree.root(), &mut state);
        let mut diagnostics = state.diagnostics;
        diagnostics.sort_by_key(|d| d.line);
        Ok(diagnostics)
    }
}
