//! Help and documentation affordances.

use crate::detect::elements::{
    base_name, class_tokens, field_words, is_actionable, is_breadcrumb, is_button, is_field,
    is_icon, is_link, is_nav_container, is_native, label_text,
};
use crate::detect::rules::exit::is_modal;
use crate::detect::{vocab, Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, SyntaxNode, Visitor};

/// Attributes that attach help text to a field.
const HELP_ATTRS: &[&str] = &[
    "aria-describedby",
    "aria-description",
    "title",
    "helperText",
    "hint",
    "description",
    "help",
];

pub struct HelpDocumentation;

/// Onboarding by name or class, or an overlay whose text welcomes the user.
fn is_onboarding(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    let named = if is_native(node) {
        class_tokens(node).iter().any(|t| vocab::ONBOARDING.is_match(t))
            || node.literal("id").map(|id| vocab::ONBOARDING.is_match(id)).unwrap_or(false)
    } else {
        vocab::ONBOARDING.is_match(base_name(node))
    };
    named || ((is_modal(node) || is_tooltip(node)) && vocab::ONBOARDING.is_match(&node.text_content()))
}

fn is_help_link(node: &SyntaxNode) -> bool {
    is_actionable(node)
        && (vocab::HELP.is_match(&label_text(node))
            || ["href", "to"]
                .iter()
                .filter_map(|a| node.literal(a))
                .any(|target| vocab::HELP.is_match(target)))
}

fn is_tooltip(node: &SyntaxNode) -> bool {
    node.is_element()
        && (node.name.contains("Tooltip")
            || node.name.contains("Tippy")
            || node.name.contains("Popover")
            || node.literal("role") == Some("tooltip"))
}

fn has_accessible_label(node: &SyntaxNode) -> bool {
    ["aria-label", "aria-labelledby", "title"]
        .iter()
        .any(|a| node.has_attr(a))
}

fn is_form_field(node: &SyntaxNode) -> bool {
    is_field(node)
        || (!is_native(node) && {
            let name = base_name(node);
            name.ends_with("Input") || name.ends_with("Field")
        })
}

struct Walk {
    diagnostics: Vec<Diagnostic>,
}

impl Walk {
    fn push(&mut self, kind: &str, node: &SyntaxNode, severity: Severity, message: String, rationale: &str, action: &str) {
        self.diagnostics.push(
            Diagnostic::new(Category::HelpDocumentation, kind, node.line, severity, message)
                .with_rationale(rationale)
                .with_action(action),
        );
    }
}

impl<'t> Visitor<'t> for Walk {
    fn element(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
        if is_onboarding(node)
            && !ancestors.any(is_onboarding)
            && !node
                .descendant_elements()
                .any(|d| is_actionable(d) && vocab::ONBOARDING_ACTION.is_match(&label_text(d)))
        {
            self.push(
                "onboarding-missing-action",
                node,
                Severity::Warning,
                format!("onboarding container <{}> has no action to get started", node.name),
                "New users need a clear first step, not just a greeting.",
                "Add a primary action such as \"Get started\" or \"Create your first project\".",
            );
        }

        if is_nav_container(node)
            && !is_breadcrumb(node)
            && !ancestors.any(is_nav_container)
            && !node.descendant_elements().any(is_help_link)
        {
            self.push(
                "nav-missing-help",
                node,
                Severity::Info,
                format!("<{}> offers no help or support link", node.name),
                "Users look for help in the main navigation when they get stuck.",
                "Add a Help, Docs or Support link to the navigation.",
            );
        }

        if (is_button(node) || is_link(node))
            && node.text_content().is_empty()
            && (is_icon(node) || base_name(node) == "IconButton" || node.descendant_elements().any(is_icon))
            && !has_accessible_label(node)
            && !ancestors.any(is_tooltip)
        {
            self.push(
                "icon-without-label",
                node,
                Severity::Warning,
                format!("icon-only <{}> has no label or tooltip", node.name),
                "Icons alone are ambiguous; users have to guess what they do.",
                "Add aria-label and a tooltip, or a visible text label.",
            );
        }

        if is_form_field(node) {
            let words = field_words(node);
            let sensitive = vocab::SENSITIVE_FIELDS
                .iter()
                .find(|s| words.iter().any(|w| w == *s));
            if let Some(word) = sensitive {
                if !HELP_ATTRS.iter().any(|a| node.has_attr(a)) {
                    self.push(
                        "field-missing-help",
                        node,
                        Severity::Suggestion,
                        format!("\"{}\" field has no help text", word),
                        "Sensitive fields are where users hesitate and make mistakes.",
                        "Explain the expected value with aria-describedby or helper text.",
                    );
                }
            }
        }
    }
}

impl Analyzer for HelpDocumentation {
    fn name(&self) -> &str {
        "help-documentation"
    }

    fn category(&self) -> Category {
        Category::HelpDocumentation
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk {
            diagnostics: Vec::new(),
        };
        walk(tree.root(), &mut state);
        Ok(state.diagnostics)
    }
}
