//! Navigation trail: page-level components should show where the user is.

use crate::config::RuleSettings;
use crate::detect::elements::{base_name, is_breadcrumb, is_native};
use crate::detect::{Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, SyntaxNode, Visitor};

pub struct NavigationTrail {
    page_components: Vec<String>,
}

impl NavigationTrail {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            page_components: settings.page_components.clone(),
        }
    }

    fn is_page(&self, node: &SyntaxNode) -> bool {
        if is_native(node) {
            return false;
        }
        let name = base_name(node);
        self.page_components.iter().any(|p| p == name) || name.ends_with("Page")
    }
}

struct Walk<'a> {
    rule: &'a NavigationTrail,
    diagnostics: Vec<Diagnostic>,
}

impl<'t, 'a> Visitor<'t> for Walk<'a> {
    fn element(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        if !self.rule.is_page(node) {
            return;
        }
        if node.descendant_elements().any(is_breadcrumb) {
            return;
        }
        self.diagnostics.push(
            Diagnostic::new(
                Category::NavigationTrail,
                "missing-breadcrumb",
                node.line,
                Severity::Warning,
                format!("page component <{}> has no breadcrumb trail", node.name),
            )
            .with_rationale(
                "Without a trail users cannot tell where they are in the hierarchy or move up a level.",
            )
            .with_action("Render a breadcrumb (e.g. <nav aria-label=\"breadcrumb\">) inside the page."),
        );
    }
}

impl Analyzer for NavigationTrail {
    fn name(&self) -> &str {
        "navigation-trail"
    }

    fn category(&self) -> Category {
        Category::NavigationTrail
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk {
            rule: self,
            diagnostics: Vec::new(),
        };
        walk(tree.root(), &mut state);
        Ok(state.diagnostics)
    }
}
