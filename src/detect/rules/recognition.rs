//! Recognition rather than recall: visible cues for formats, menus and
//! submenus.

use crate::config::RuleSettings;
use crate::detect::elements::{base_name, is_actionable, is_icon, is_nav_container};
use crate::detect::{Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{walk, Ancestors, SyntaxNode, Visitor};

const FORMATTED_INPUTS: &[&str] = &[
    "date",
    "time",
    "datetime-local",
    "tel",
    "email",
    "url",
    "month",
    "week",
];

pub struct RecognitionCues {
    max_nav_items: usize,
}

impl RecognitionCues {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            max_nav_items: settings.max_nav_items,
        }
    }
}

fn is_footer(node: &SyntaxNode) -> bool {
    node.name == "footer" || base_name(node) == "Footer" || node.literal("role") == Some("contentinfo")
}

struct Walk {
    max_nav_items: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Visitor<'t> for Walk {
    fn element(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
        if node.name == "input" {
            if let Some(kind) = node.literal("type").filter(|t| FORMATTED_INPUTS.contains(t)) {
                if !node.has_attr("placeholder") {
                    self.diagnostics.push(
                        Diagnostic::new(
                            Category::Recognition,
                            "missing-placeholder",
                            node.line,
                            Severity::Suggestion,
                            format!("{} input has no placeholder showing the expected format", kind),
                        )
                        .with_rationale("Showing an example format spares users from remembering it.")
                        .with_action("Add a placeholder with an example value."),
                    );
                }
            }
        }

        if is_nav_container(node) && !ancestors.any(is_nav_container) {
            let count = node.descendant_elements().filter(|d| is_actionable(d)).count();
            if count > self.max_nav_items {
                self.diagnostics.push(
                    Diagnostic::new(
                        Category::Recognition,
                        "nav-overloaded",
                        node.line,
                        Severity::Warning,
                        format!(
                            "<{}> holds {} links or buttons (limit {})",
                            node.name, count, self.max_nav_items
                        ),
                    )
                    .with_rationale("Long menus force users to scan and recall instead of recognising.")
                    .with_action("Group items into submenus or move secondary items elsewhere."),
                );
            }
        }

        if is_footer(node) && !node.descendant_elements().any(is_nav_container) {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::Recognition,
                    "footer-missing-nav",
                    node.line,
                    Severity::Info,
                    "footer has no navigation",
                )
                .with_rationale("Users scroll to the footer to find links they cannot recall the location of.")
                .with_action("Add a <nav> with key destinations to the footer."),
            );
        }

        if node.name == "li"
            && node
                .descendant_elements()
                .any(|d| d.name == "ul" || d.name == "ol")
            && !node.descendant_elements().any(is_icon)
        {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::Recognition,
                    "submenu-missing-indicator",
                    node.line,
                    Severity::Suggestion,
                    "menu item with a submenu has no indicator icon",
                )
                .with_rationale("Without a chevron users cannot tell the item opens more options.")
                .with_action("Render a chevron or caret icon next to the item label."),
            );
        }
    }
}

impl Analyzer for RecognitionCues {
    fn name(&self) -> &str {
        "recognition-cues"
    }

    fn category(&self) -> Category {
        Category::Recognition
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk {
            max_nav_items: self.max_nav_items,
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

    fn rule() -> RecognitionCues {
        RecognitionCues::new(&RuleSettings::default())
    }

    #[test]
    fn test_placeholders() {
        let src = r#"
const F = () => (
  <form>
    <input type="date" />
    <input type="email" placeholder="name@example.com" />
    <input type="text" />
  </form>
);
"#;
        let diags = run(&rule(), src);
        assert_eq!(kinds(&diags), vec!["missing-placeholder"]);
        assert_eq!(diags[0].line, 4);
    }

    #[test]
    fn test_nav_overloaded_counts_nested_items() {
        let src = r#"
const N = () => (
  <nav role="navigation">
    <ul>
      <li><a href="/1">1</a></li>
      <li><a href="/2">2</a></li>
      <li>
        <div>
          <a href="/3">3</a>
          <span><a href="/4">4</a></span>
        </div>
      </li>
      <li><Link to="/5">5</Link></li>
      <li><button>6</button></li>
      <li><a href="/7">7</a></li>
      <li><Menu><MenuItem>8</MenuItem><MenuItem>9</MenuItem></Menu></li>
    </ul>
  </nav>
);
"#;
        let diags: Vec<_> = run(&rule(), src)
            .into_iter()
            .filter(|d| d.kind == "nav-overloaded")
            .collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 3);
        assert!(diags[0].message.contains("holds 9 "));
    }

    #[test]
    fn test_nav_within_limit() {
        let src = "const N = () => <nav><a href=\"/\">Home</a><a href=\"/help\">Help</a></nav>;";
        assert!(run(&rule(), src).is_empty());
    }

    #[test]
    fn test_footer_and_submenu() {
        let src = r#"
const F = () => (
  <div>
    <footer>© Acme</footer>
    <Footer><nav><a href="/about">About</a></nav></Footer>
    <ul>
      <li>Products<ul><li>One</li></ul></li>
      <li>Services <ChevronDownIcon /><ul><li>Two</li></ul></li>
    </ul>
  </div>
);
"#;
        let diags = run(&rule(), src);
        assert_eq!(
            kinds(&diags),
            vec!["footer-missing-nav", "submenu-missing-indicator"]
        );
        assert_eq!(diags[0].line, 4);
        assert_eq!(diags[1].line, 7);
    }
}
