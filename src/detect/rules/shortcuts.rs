//! Keyboard shortcut discoverability and keyboard parity for click targets.

use crate::detect::elements::{has_click, has_key_handler, is_field, is_native};
use crate::detect::{vocab, Analyzer, AnalyzerInput, Category, Diagnostic, Severity};
use crate::parser::{string_literal, walk, Ancestors, SyntaxNode, Visitor};

/// Native elements that are focusable and keyboard operable on their own.
const KEYBOARD_NATIVE: &[&str] = &[
    "a", "button", "input", "select", "textarea", "option", "summary", "label", "details",
];

pub struct KeyboardShortcuts;

#[derive(Default)]
struct Walk {
    registrations: Vec<usize>,
    hint_seen: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Walk {
    fn note_hint(&mut self, text: &str) {
        if !self.hint_seen && vocab::SHORTCUT_HINT.is_match(text) {
            self.hint_seen = true;
        }
    }
}

impl<'t> Visitor<'t> for Walk {
    fn element(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        if node.name == "kbd" || node.has_attr("aria-keyshortcuts") {
            self.hint_seen = true;
        }
        for value in node.attributes.values() {
            if let Some(text) = value.as_literal() {
                self.note_hint(text);
            }
        }

        if has_key_handler(node)
            && !is_field(node)
            && !has_click(node)
            && !node.has_attr("contentEditable")
        {
            self.registrations.push(node.line);
        }

        if is_native(node)
            && !KEYBOARD_NATIVE.contains(&node.name.as_str())
            && has_click(node)
            && !has_key_handler(node)
            && !node.has_attr("role")
            && !node.has_attr("tabIndex")
        {
            self.diagnostics.push(
                Diagnostic::new(
                    Category::Efficiency,
                    "click-only-interaction",
                    node.line,
                    Severity::Warning,
                    format!("<{}> reacts to clicks but not to the keyboard", node.name),
                )
                .with_rationale("Keyboard users and power users cannot reach mouse-only controls.")
                .with_action("Use a <button>, or add role, tabIndex and a key handler."),
            );
        }
    }

    fn text(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        self.note_hint(&node.text);
    }

    fn expression(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        if let Some(text) = string_literal(&node.text) {
            self.note_hint(text);
        }
    }

    fn call(&mut self, node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {
        let registers = vocab::SHORTCUT_REGISTRATION.is_match(&node.name)
            || (node.name.ends_with("addEventListener") && vocab::KEY_EVENT.is_match(&node.text));
        if registers {
            self.registrations.push(node.line);
        }
    }
}

impl Analyzer for KeyboardShortcuts {
    fn name(&self) -> &str {
        "keyboard-shortcuts"
    }

    fn category(&self) -> Category {
        Category::Efficiency
    }

    fn run(&self, input: &AnalyzerInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let tree = input.tree()?;
        let mut state = Walk::default();
        walk(tree.root(), &mut state);

        if !state.hint_seen {
            let mut lines = std::mem::take(&mut state.registrations);
            lines.sort_unstable();
            lines.dedup();
            for line in lines {
                state.diagnostics.push(
                    Diagnostic::new(
                        Category::Efficiency,
                        "undiscoverable-shortcut",
                        line,
                        Severity::Info,
                        "keyboard shortcut is registered but never shown to users",
                    )
                    .with_rationale("Accelerators only help users who know they exist.")
                    .with_action("Show the key combination in a <kbd> hint, tooltip or aria-keyshortcuts."),
                );
            }
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

    #[test]
    fn test_undiscoverable_shortcut() {
        let src = r#"
function Editor() {
  useHotkeys('mod+s', save);
  useEffect(() => {
    window.addEventListener('keydown', onKey);
  }, []);
  return <textarea onKeyDown={onType} />;
}
"#;
        let diags = run(&KeyboardShortcuts, src);
        assert_eq!(
            kinds(&diags),
            vec!["undiscoverable-shortcut", "undiscoverable-shortcut"]
        );
        assert_eq!(diags[0].line, 3);
        assert_eq!(diags[1].line, 5);
    }

    #[test]
    fn test_hint_anywhere_in_file() {
        let src = r#"
function Editor() {
  useHotkeys('mod+s', save);
  return <button title="Save (Ctrl+S)" onClick={save}>Save</button>;
}
"#;
        assert!(run(&KeyboardShortcuts, src).is_empty());

        let kbd = "function E() { useHotkeys('k', open); return <p>Press <kbd>K</kbd></p>; }";
        assert!(run(&KeyboardShortcuts, kbd).is_empty());
    }

    #[test]
    fn test_click_only_interaction() {
        let src = r#"
const L = () => (
  <ul>
    <li onClick={open}>Open</li>
    <div role="button" tabIndex={0} onClick={open} onKeyDown={key}>Ok</div>
    <button onClick={open}>Fine</button>
    <Card onClick={open} />
  </ul>
);
"#;
        let diags = run(&KeyboardShortcuts, src);
        assert_eq!(kinds(&diags), vec!["click-only-interaction"]);
        assert_eq!(diags[0].line, 4);
    }
}
