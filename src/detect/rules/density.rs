//! Visual density: color budget and styles shared by interactive and static
//! elements.

use std::collections::BTreeMap;

use crate::config::RuleSettings;
use crate::detect::elements::{class_tokens, is_interactive, style_properties};
use crate::detect::style::{is_color_property, normalize_color, signature, utility_color};
use crate::detect::{Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, SyntaxNode, Visitor};

pub struct VisualDensity {
    max_colors: usize,
}

impl VisualDensity {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            max_colors: settings.max_colors,
        }
    }
}

#[derive(Default)]
struct SignatureUse {
    interactive: Option<usize>,
    static_line: Option<usize>,
}

#[derive(Default)]
struct Walk {
    /// Distinct colors in first-seen order with their line.
    colors: Vec<(String, usize)>,
    signatures: BTreeMap<String, SignatureUse>,
}

impl Walk {
    fn record_color(&mut self, color: String, line: usize) {
        if !self.colors.iter().any(|(c, _)| *c == color) {
            self.colors.push((color, line));
        }
    }
}

impl<'t> Visitor<'t> for Walk {
    fn element(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        for token in class_tokens(node) {
            if let Some(color) = utility_color(&token) {
                self.record_color(color, node.line);
            }
        }
        for (name, value) in style_properties(node) {
            if is_color_property(&name) {
                if let Some(color) = normalize_color(&value) {
                    self.record_color(color, node.line);
                }
            }
        }

        if let Some(sig) = signature(node) {
            let entry = self.signatures.entry(sig).or_default();
            let slot = if is_interactive(node) {
                &mut entry.interactive
            } else {
                &mut entry.static_line
            };
            slot.get_or_insert(node.line);
        }
    }
}

impl Analyzer for VisualDensity {
    fn name(&self) -> &str {
        "visual-density"
    }

    fn category(&self) -> Category {
        Category::MinimalistDesign
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk::default();
        walk(tree.root(), &mut state);

        let mut diagnostics = Vec::new();

        if state.colors.len() > self.max_colors {
            let line = state.colors[self.max_colors].1;
            let names: Vec<&str> = state.colors.iter().map(|(c, _)| c.as_str()).collect();
            diagnostics.push(
                Diagnostic::new(
                    Category::MinimalistDesign,
                    "too-many-colors",
                    line,
                    Severity::Warning,
                    format!(
                        "{} primary colors used (budget {}): {}",
                        names.len(),
                        self.max_colors,
                        names.join(", ")
                    ),
                )
                .with_rationale("Every extra accent color competes for attention and dilutes meaning.")
                .with_action("Limit accents to the palette's primary colors and use neutrals elsewhere."),
            );
        }

        let mut confusing: Vec<(usize, String)> = state
            .signatures
            .into_iter()
            .filter(|(_, u)| u.interactive.is_some())
            .filter_map(|(sig, u)| u.static_line.map(|line| (line, sig)))
            .collect();
        confusing.sort();
        for (line, sig) in confusing {
            diagnostics.push(
                Diagnostic::new(
                    Category::MinimalistDesign,
                    "confusing-style",
                    line,
                    Severity::Warning,
                    format!("style \"{}\" is used on both clickable and static elements", sig),
                )
                .with_rationale("When static content looks like a control, users click it and nothing happens.")
                .with_action("Give interactive elements a distinct style."),
            );
        }

        diagnostics.sort_by_key(|d| d.line);
        Ok(diagnostics)
    }
}
