//! Layout consistency: landmark roles, linked logos and a font budget.

use crate::config::RuleSettings;
use crate::detect::elements::{base_name, class_tokens, is_link, is_native, style_properties};
use crate::detect::style::{font_class, font_family, FONT_FAMILY_DECL};
use crate::detect::{vocab, Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, SyntaxNode, Visitor};

pub struct LayoutConsistency {
    max_fonts: usize,
}

impl LayoutConsistency {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            max_fonts: settings.max_fonts,
        }
    }
}

fn expected_role(tag: &str) -> Option<&'static str> {
    match tag {
        "header" => Some("banner"),
        "main" => Some("main"),
        "nav" => Some("navigation"),
        "footer" => Some("contentinfo"),
        _ => None,
    }
}

fn is_logo(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    if !is_native(node) {
        return vocab::LOGO.is_match(base_name(node));
    }
    matches!(node.name.as_str(), "img" | "svg")
        && (node.literal("alt").map(|a| vocab::LOGO.is_match(a)).unwrap_or(false)
            || node.literal("src").map(|s| vocab::LOGO.is_match(s)).unwrap_or(false)
            || class_tokens(node).iter().any(|t| vocab::LOGO.is_match(t)))
}

#[derive(Default)]
struct Walk {
    /// Distinct font identifiers with the line each was first seen on.
    fonts: Vec<(usize, String)>,
    diagnostics: Vec<Diagnostic>,
}

impl Walk {
    fn record_font(&mut self, line: usize, font: String) {
        self.fonts.push((line, font));
    }
}

impl<'t> Visitor<'t> for Walk {
    fn element(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
        if let Some(expected) = expected_role(&node.name) {
            if node.literal("role") != Some(expected) {
                self.diagnostics.push(
                    Diagnostic::new(
                        Category::Consistency,
                        "missing-landmark-role",
                        node.line,
                        Severity::Info,
                        format!("<{}> should carry role=\"{}\"", node.name, expected),
                    )
                    .with_rationale("Consistent landmarks let assistive technology and users jump between page regions.")
                    .with_action(format!("Add role=\"{}\".", expected)),
                );
            }
        }

        if is_logo(node) && !ancestors.any(is_link) && !ancestors.any(is_logo) {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::Consistency,
                    "logo-not-linked",
                    node.line,
                    Severity::Suggestion,
                    "logo is not a link to the home page",
                )
                .with_rationale("Users expect the site logo to take them home.")
                .with_action("Wrap the logo in a link to \"/\"."),
            );
        }

        for (name, value) in style_properties(node) {
            if name == "fontFamily" {
                if let Some(font) = font_family(&value) {
                    self.record_font(node.line, font);
                }
            }
        }
        for token in class_tokens(node) {
            if let Some(font) = font_class(&token) {
                self.record_font(node.line, font);
            }
        }
    }
}

impl Analyzer for LayoutConsistency {
    fn name(&self) -> &str {
        "layout-consistency"
    }

    fn category(&self) -> Category {
        Category::Consistency
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk::default();
        walk(tree.root(), &mut state);

        for (index, line) in input.lines.code_lines() {
            for cap in FONT_FAMILY_DECL.captures_iter(line) {
                if let Some(font) = cap.get(1).and_then(|m| font_family(m.as_str())) {
                    state.record_font(index + 1, font);
                }
            }
        }

        let mut fonts = std::mem::take(&mut state.fonts);
        fonts.sort_by_key(|(line, _)| *line);
        let mut distinct: Vec<String> = Vec::new();
        let mut exceeded_at = None;
        for (line, font) in fonts {
            if distinct.contains(&font) {
                continue;
            }
            distinct.push(font);
            if distinct.len() > self.max_fonts && exceeded_at.is_none() {
                exceeded_at = Some(line);
            }
        }

        if let Some(line) = exceeded_at {
            state.diagnostics.push(
                Diagnostic::new(
                    Category::Consistency,
                    "too-many-fonts",
                    line,
                    Severity::Warning,
                    format!(
                        "{} distinct fonts used (budget {}): {}",
                        distinct.len(),
                        self.max_fonts,
                        distinct.join(", ")
                    ),
                )
                .with_rationale("Each extra typeface adds visual noise and weakens hierarchy.")
                .with_action("Stick to one or two font families from the design system."),
            );
        }

        let mut diagnostics = state.diagnostics;
        diagnostics.sort_by_key(|d| d.line);
        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::rules::testing::{kinds, run};

    fn rule() -> LayoutConsistency {
        LayoutConsistency::new(&RuleSettings::default())
    }

    #[test]
    fn test_landmark_roles() {
        let src = r#"
const L = () => (
  <>
    <header role="banner" />
    <main />
    <nav role="menu" />
    <footer role="contentinfo" />
  </>
);
"#;
        let diags = run(&rule(), src);
        assert_eq!(
            kinds(&diags),
            vec!["missing-landmark-role", "missing-landmark-role"]
        );
        assert_eq!(diags[0].line, 5);
        assert_eq!(diags[1].line, 6);
    }

    #[test]
    fn test_logo_link() {
        let src = r#"
const H = () => (
  <div>
    <a href="/"><img src="/logo.svg" alt="Acme logo" /></a>
    <Logo />
  </div>
);
"#;
        let diags = run(&rule(), src);
        assert_eq!(kinds(&diags), vec!["logo-not-linked"]);
        assert_eq!(diags[0].line, 5);
    }

    #[test]
    fn test_font_budget() {
        let src = r#"
const styles = `
  font-family: 'Inter', sans-serif;
`;
const T = () => (
  <div>
    <h1 style={{ fontFamily: 'Georgia' }}>Title</h1>
    <p className="font-mono font-bold">Body</p>
    <p style={{ fontFamily: "Inter" }}>More</p>
  </div>
);
"#;
        let diags = run(&rule(), src);
        assert_eq!(kinds(&diags), vec!["too-many-fonts"]);
        assert_eq!(diags[0].line, 8);
        assert!(diags[0].message.starts_with("3 distinct fonts"));
    }

    #[test]
    fn test_fonts_within_budget() {
        let src = "const T = () => <p className=\"font-sans font-semibold\">x</p>;";
        assert!(run(&rule(), src).is_empty());
    }
}
