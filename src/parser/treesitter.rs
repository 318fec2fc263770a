//! Tree-sitter adapter: converts the TSX/JavaScript CST into [`SyntaxTree`].
//!
//! Parsing runs in tree-sitter's error-recovery mode, so a file with a few
//! syntax errors still yields a usable partial tree. Only files where the
//! parser produced nothing, or where errors left nothing structural behind,
//! fail with [`ParseError`].

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tree_sitter::{Language, Node, Parser as TsParser};

use super::node::{AttrValue, NodeKind, SyntaxNode, SyntaxTree};

/// Source dialect, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `.tsx` and `.ts`, parsed with the TSX grammar.
    Tsx,
    /// `.jsx`, `.js` and `.mjs`, parsed with the JavaScript grammar (includes JSX).
    Jsx,
}

impl Dialect {
    /// Dialect for an extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "tsx" | "ts" => Some(Dialect::Tsx),
            "jsx" | "js" | "mjs" => Some(Dialect::Jsx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn language(&self) -> Language {
        match self {
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Dialect::Jsx => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Tsx => "tsx",
            Dialect::Jsx => "jsx",
        }
    }
}

/// Unrecoverable parse failure.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    /// 1-based line of the first syntax error (1 if unknown).
    pub line: usize,
}

/// Parse `source` into a raw tree-sitter tree.
pub fn parse_raw(source: &str, dialect: Dialect) -> Result<tree_sitter::Tree, ParseError> {
    let mut parser = TsParser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| ParseError {
            message: format!("grammar unavailable: {}", e),
            line: 1,
        })?;
    parser.parse(source, None).ok_or_else(|| ParseError {
        message: "parser produced no tree".to_string(),
        line: 1,
    })
}

/// Parse `source` into an owned [`SyntaxTree`].
pub fn parse(source: &str, dialect: Dialect) -> Result<SyntaxTree, ParseError> {
    let tree = parse_raw(source, dialect)?;

    let mut converter = Converter {
        source: source.as_bytes(),
        errors: 0,
        first_error_line: None,
    };

    let mut root = SyntaxNode::new(NodeKind::Root, "", 1, 1);
    {
        let root_node = tree.root_node();
        root.end_line = root_node.end_position().row + 1;
        let mut cursor = root_node.walk();
        for child in root_node.named_children(&mut cursor) {
            converter.convert(child, &mut root.children);
        }
    }

    if converter.errors > 0 && !has_structure(&root) {
        return Err(ParseError {
            message: "syntax error with no recoverable structure".to_string(),
            line: converter.first_error_line.unwrap_or(1),
        });
    }

    Ok(SyntaxTree {
        root,
        error_count: converter.errors,
        raw: tree,
    })
}

fn has_structure(root: &SyntaxNode) -> bool {
    root.descendants().any(|n| {
        matches!(
            n.kind,
            NodeKind::Element | NodeKind::Function | NodeKind::Call
        )
    })
}

struct Converter<'s> {
    source: &'s [u8],
    errors: usize,
    first_error_line: Option<usize>,
}

impl<'s> Converter<'s> {
    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn base(&self, node: Node, kind: NodeKind, name: impl Into<String>) -> SyntaxNode {
        let start = node.start_position();
        let mut out = SyntaxNode::new(kind, name, start.row + 1, start.column + 1);
        out.end_line = node.end_position().row + 1;
        out
    }

    fn record_error(&mut self, node: Node) {
        self.errors += 1;
        if self.first_error_line.is_none() {
            self.first_error_line = Some(node.start_position().row + 1);
        }
    }

    fn convert_children(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.convert(child, out);
        }
    }

    /// Convert `node` and push the result(s) onto `out`. Kinds the analyzers
    /// do not look at are flattened into their converted children.
    fn convert(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        if node.is_missing() {
            self.record_error(node);
            return;
        }

        match node.kind() {
            "comment" => {}
            "ERROR" => {
                self.record_error(node);
                self.convert_children(node, out);
            }
            "jsx_element" => self.element(node, out),
            "jsx_self_closing_element" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or("");
                let mut el = self.base(node, NodeKind::Element, name);
                self.attributes(node, &mut el);
                out.push(el);
            }
            "jsx_text" => {
                let raw = self.text(node);
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return;
                }
                let mut text = self.base(node, NodeKind::Text, "");
                let leading = &raw[..raw.len() - raw.trim_start().len()];
                let newlines = leading.matches('\n').count();
                if newlines > 0 {
                    text.line += newlines;
                    text.column = leading.len() - leading.rfind('\n').unwrap_or(0);
                }
                text.text = trimmed.to_string();
                out.push(text);
            }
            "jsx_expression" => {
                let mut expr = self.base(node, NodeKind::Expression, "");
                expr.text = strip_braces(self.text(node)).to_string();
                self.convert_children(node, &mut expr.children);
                out.push(expr);
            }
            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|n| compact(self.text(n)))
                    .unwrap_or_default();
                let mut call = self.base(node, NodeKind::Call, callee);
                call.text = self.text(node).to_string();
                self.convert_children(node, &mut call.children);
                out.push(call);
            }
            "function_declaration"
            | "function_expression"
            | "function"
            | "arrow_function"
            | "method_definition"
            | "generator_function"
            | "generator_function_declaration" => self.function(node, out),
            _ => self.convert_children(node, out),
        }
    }

    fn element(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        let open = node.child_by_field_name("open_tag");
        let name = open
            .and_then(|o| o.child_by_field_name("name"))
            .map(|n| self.text(n))
            .unwrap_or("");

        // Fragments (`<>...</>`) are transparent.
        if name.is_empty() {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if !matches!(child.kind(), "jsx_opening_element" | "jsx_closing_element") {
                    self.convert(child, out);
                }
            }
            return;
        }

        let mut el = self.base(node, NodeKind::Element, name);
        if let Some(open) = open {
            self.attributes(open, &mut el);
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "jsx_opening_element" | "jsx_closing_element" => {}
                _ => self.convert(child, &mut el.children),
            }
        }
        out.push(el);
    }

    /// Attributes of an opening or self-closing element. Attribute values
    /// that are themselves elements or contain functions are converted as
    /// children of the element so nothing nested is lost.
    fn attributes(&mut self, tag: Node, el: &mut SyntaxNode) {
        let mut cursor = tag.walk();
        for attr in tag.named_children(&mut cursor) {
            match attr.kind() {
                "jsx_attribute" => {}
                "ERROR" => {
                    self.record_error(attr);
                    continue;
                }
                _ => continue,
            }

            let mut inner = attr.walk();
            let mut parts = attr.named_children(&mut inner);
            let Some(name_node) = parts.next() else {
                continue;
            };
            let name = self.text(name_node).to_string();
            let value = match parts.next() {
                None => AttrValue::Flag,
                Some(v) if v.kind() == "string" => {
                    let raw = self.text(v);
                    AttrValue::Literal(raw.get(1..raw.len().saturating_sub(1)).unwrap_or("").to_string())
                }
                Some(v) if v.kind() == "jsx_expression" => {
                    self.convert_children(v, &mut el.children);
                    AttrValue::Dynamic(strip_braces(self.text(v)).to_string())
                }
                Some(v) => {
                    self.convert(v, &mut el.children);
                    AttrValue::Dynamic(self.text(v).to_string())
                }
            };
            el.attributes.insert(name, value);
        }
    }

    fn function(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        let name = node
            .child_by_field_name("name")
            .or_else(|| {
                node.parent()
                    .filter(|p| p.kind() == "variable_declarator")
                    .and_then(|p| p.child_by_field_name("name"))
            })
            .map(|n| self.text(n))
            .unwrap_or("");

        let mut func = self.base(node, NodeKind::Function, name);
        func.text = self.text(node).to_string();

        if let Some(body) = node.child_by_field_name("body") {
            if body.kind() == "statement_block" {
                let mut cursor = body.walk();
                for stmt in body.named_children(&mut cursor) {
                    match stmt.kind() {
                        "comment" => {}
                        "ERROR" => {
                            self.record_error(stmt);
                            self.convert_children(stmt, &mut func.children);
                        }
                        kind => {
                            let mut s = self.base(stmt, NodeKind::Statement, kind);
                            s.text = self.text(stmt).to_string();
                            self.convert_children(stmt, &mut s.children);
                            func.children.push(s);
                        }
                    }
                }
            } else {
                let mut s = self.base(body, NodeKind::Statement, "expression");
                s.text = self.text(body).to_string();
                self.convert(body, &mut s.children);
                func.children.push(s);
            }
        }
        out.push(func);
    }
}

fn strip_braces(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix('{').unwrap_or(t);
    let t = t.strip_suffix('}').unwrap_or(t);
    t.trim()
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(tree: &SyntaxTree) -> Vec<(String, usize)> {
        tree.root()
            .descendant_elements()
            .map(|n| (n.name.clone(), n.line))
            .collect()
    }

    #[test]
    fn test_tree_keeps_its_raw_form() {
        let src = "const A = () => <a href=\"/\">Home</a>;\n";
        let tree = parse(src, Dialect::Jsx).unwrap();
        let raw = tree.raw().root_node();
        assert_eq!(raw.kind(), "program");
        assert_eq!(raw.end_byte(), src.len());
    }

    #[test]
    fn test_dialect_from_extension() {
        assert_eq!(Dialect::from_extension("tsx"), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_extension("ts"), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_extension("JSX"), Some(Dialect::Jsx));
        assert_eq!(Dialect::from_extension("mjs"), Some(Dialect::Jsx));
        assert_eq!(Dialect::from_extension("vue"), None);
    }

    #[test]
    fn test_elements_and_lines() {
        let src = "export function Home() {\n  return (\n    <Page>\n      <h1>Title</h1>\n    </Page>\n  );\n}\n";
        let tree = parse(src, Dialect::Tsx).unwrap();
        assert_eq!(
            elements(&tree),
            vec![("Page".to_string(), 3), ("h1".to_string(), 4)]
        );
        assert!(!tree.is_partial());
    }

    #[test]
    fn test_attributes() {
        let src = r#"const x = <input type="date" disabled value={state.v} />;"#;
        let tree = parse(src, Dialect::Jsx).unwrap();
        let input = tree.root().descendant_elements().next().unwrap();
        assert_eq!(input.literal("type"), Some("date"));
        assert_eq!(input.attr("disabled"), Some(&AttrValue::Flag));
        assert_eq!(
            input.attr("value"),
            Some(&AttrValue::Dynamic("state.v".to_string()))
        );
    }

    #[test]
    fn test_text_line_skips_leading_newlines() {
        let src = "const x = (\n  <p>\n    Hello there\n  </p>\n);\n";
        let tree = parse(src, Dialect::Tsx).unwrap();
        let text = tree
            .root()
            .descendants()
            .find(|n| n.kind == NodeKind::Text)
            .unwrap();
        assert_eq!(text.text, "Hello there");
        assert_eq!(text.line, 3);
    }

    #[test]
    fn test_function_statements_and_calls() {
        let src = "const load = async () => {\n  setLoading(true);\n  const r = await fetch('/api');\n  return r;\n};\n";
        let tree = parse(src, Dialect::Tsx).unwrap();
        let func = tree
            .root()
            .descendants()
            .find(|n| n.kind == NodeKind::Function)
            .unwrap();
        assert_eq!(func.name, "load");
        assert_eq!(func.children.len(), 3);
        assert!(func.children.iter().all(|c| c.kind == NodeKind::Statement));

        let fetch = func
            .descendants()
            .find(|n| n.kind == NodeKind::Call && n.name == "fetch")
            .unwrap();
        assert_eq!(fetch.line, 3);
    }

    #[test]
    fn test_fragments_are_transparent() {
        let src = "const x = <><nav /><main /></>;";
        let tree = parse(src, Dialect::Tsx).unwrap();
        let top: Vec<_> = tree.root().descendant_elements().map(|n| n.name.as_str()).collect();
        assert_eq!(top, vec!["nav", "main"]);
    }

    #[test]
    fn test_partial_tree_is_accepted() {
        let src = "function A() { return <div><span>ok</span></div>; }\nconst = ;\n";
        let tree = parse(src, Dialect::Tsx).unwrap();
        assert!(tree.is_partial());
        assert!(tree.root().descendant_elements().any(|n| n.name == "span"));
    }

    #[test]
    fn test_garbage_fails() {
        let err = parse("@@@ ### $$$ %%%", Dialect::Tsx).unwrap_err();
        assert_eq!(err.line, 1);
    }
}
