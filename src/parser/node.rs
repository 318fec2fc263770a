//! Owned syntax tree produced by the parser adapter.
//!
//! The tree-sitter CST is converted once per file into a compact tree of
//! [`SyntaxNode`]s that keeps only what the usability analyzers look at:
//! JSX elements with their attributes, visible text, embedded expressions,
//! calls, functions and the top-level statements of function bodies.

use std::collections::BTreeMap;

/// The kind of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Synthetic root holding every top-level node of the file.
    Root,
    /// A JSX element (`<Tag ...>...</Tag>` or `<Tag />`).
    Element,
    /// Visible JSX text.
    Text,
    /// A JSX expression container (`{...}`).
    Expression,
    /// A function, arrow function or method.
    Function,
    /// A call expression.
    Call,
    /// A top-level statement of a function body.
    Statement,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::Expression => "expression",
            NodeKind::Function => "function",
            NodeKind::Call => "call",
            NodeKind::Statement => "statement",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value of a JSX attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A string literal (quotes stripped).
    Literal(String),
    /// An expression container; holds the expression source without braces.
    Dynamic(String),
    /// A bare attribute such as `disabled`.
    Flag,
}

impl AttrValue {
    /// Literal text, if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            AttrValue::Literal(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, AttrValue::Dynamic(_))
    }

    /// Raw text of the value (literal text or expression source).
    pub fn text(&self) -> &str {
        match self {
            AttrValue::Literal(s) | AttrValue::Dynamic(s) => s,
            AttrValue::Flag => "",
        }
    }
}

/// A node in the parsed UI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Tag name for elements, callee for calls, function name (may be empty),
    /// tree-sitter kind for statements.
    pub name: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// 1-based line where the node ends.
    pub end_line: usize,
    pub attributes: BTreeMap<String, AttrValue>,
    /// Visible text for text nodes, source text for everything else except
    /// elements and the root.
    pub text: String,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, name: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            line,
            column,
            end_line: line,
            attributes: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Element tag name, or `None` for non-element nodes.
    pub fn tag(&self) -> Option<&str> {
        if self.is_element() {
            Some(&self.name)
        } else {
            None
        }
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Literal value of an attribute.
    pub fn literal(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttrValue::as_literal)
    }

    /// Pre-order iterator over every descendant (not including `self`).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Descendant elements in pre-order.
    pub fn descendant_elements(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.descendants().filter(|n| n.is_element())
    }

    /// Visible text of this subtree: text nodes plus string-literal
    /// expressions, joined with single spaces.
    pub fn text_content(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.kind == NodeKind::Text {
            parts.push(&self.text);
        }
        for node in self.descendants() {
            match node.kind {
                NodeKind::Text => parts.push(&node.text),
                NodeKind::Expression => {
                    if let Some(s) = string_literal(&node.text) {
                        parts.push(s);
                    }
                }
                _ => {}
            }
        }
        parts
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Pre-order descendant iterator.
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Returns the contents of a quoted string literal (`'x'`, `"x"`, `` `x` ``
/// without substitutions).
pub fn string_literal(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.len() < 2 {
        return None;
    }
    let first = text.chars().next()?;
    let last = text.chars().last()?;
    if first != last || !matches!(first, '"' | '\'' | '`') {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    if first == '`' && inner.contains("${") {
        return None;
    }
    Some(inner)
}

/// A parsed file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
    /// Number of ERROR/MISSING nodes the parser recovered from.
    pub error_count: usize,
    /// The tree-sitter tree `root` was converted from.
    pub(super) raw: tree_sitter::Tree,
}

impl SyntaxTree {
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// The underlying tree-sitter tree, for tree-sitter queries.
    pub fn raw(&self) -> &tree_sitter::Tree {
        &self.raw
    }

    /// Whether the parser had to recover from syntax errors.
    pub fn is_partial(&self) -> bool {
        self.error_count > 0
    }
}
