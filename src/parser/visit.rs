//! Generic traversal over [`SyntaxNode`] trees.
//!
//! Every analyzer walks the tree through [`walk`], so traversal order is the
//! same everywhere: pre-order, children in source order. Visitors implement
//! only the node kinds they care about and receive the ancestor chain of the
//! node being visited.

use super::node::{NodeKind, SyntaxNode};

/// Ancestors of the node being visited, outermost first.
#[derive(Clone, Copy)]
pub struct Ancestors<'a, 't> {
    stack: &'a [&'t SyntaxNode],
}

impl<'a, 't> Ancestors<'a, 't> {
    /// Immediate parent.
    pub fn parent(&self) -> Option<&'t SyntaxNode> {
        self.stack.last().copied()
    }

    /// Ancestors from the innermost outwards.
    pub fn innermost_first(&self) -> impl Iterator<Item = &'t SyntaxNode> + 'a {
        self.stack.iter().rev().copied()
    }

    /// Nearest ancestor of the given kind.
    pub fn nearest(&self, kind: NodeKind) -> Option<&'t SyntaxNode> {
        self.innermost_first().find(|n| n.kind == kind)
    }

    /// Nearest enclosing element.
    pub fn parent_element(&self) -> Option<&'t SyntaxNode> {
        self.nearest(NodeKind::Element)
    }

    /// Nearest enclosing function.
    pub fn enclosing_function(&self) -> Option<&'t SyntaxNode> {
        self.nearest(NodeKind::Function)
    }

    /// Whether any ancestor satisfies the predicate.
    pub fn any(&self, mut pred: impl FnMut(&SyntaxNode) -> bool) -> bool {
        self.stack.iter().any(|n| pred(n))
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Node-kind dispatched visitor. All methods default to no-ops.
///
/// The `'t` lifetime is the tree's, so visitors may keep references to nodes
/// in their per-run state.
pub trait Visitor<'t> {
    fn element(&mut self, _node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {}
    fn text(&mut self, _node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {}
    fn expression(&mut self, _node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {}
    fn call(&mut self, _node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {}
    fn function(&mut self, _node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {}
    fn statement(&mut self, _node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {}

    /// Called after all children of `node` have been visited.
    fn leave(&mut self, _node: &'t SyntaxNode, _ancestors: Ancestors<'_, 't>) {}
}

/// Walk `root` and its whole subtree.
pub fn walk<'t, V: Visitor<'t> + ?Sized>(root: &'t SyntaxNode, visitor: &mut V) {
    let mut stack = Vec::new();
    walk_node(root, &mut stack, visitor);
}

fn walk_node<'t, V: Visitor<'t> + ?Sized>(
    node: &'t SyntaxNode,
    stack: &mut Vec<&'t SyntaxNode>,
    visitor: &mut V,
) {
    {
        let ancestors = Ancestors { stack };
        match node.kind {
            NodeKind::Element => visitor.element(node, ancestors),
            NodeKind::Text => visitor.text(node, ancestors),
            NodeKind::Expression => visitor.expression(node, ancestors),
            NodeKind::Call => visitor.call(node, ancestors),
            NodeKind::Function => visitor.function(node, ancestors),
            NodeKind::Statement => visitor.statement(node, ancestors),
            NodeKind::Root => {}
        }
    }

    stack.push(node);
    for child in &node.children {
        walk_node(child, stack, visitor);
    }
    stack.pop();

    visitor.leave(node, Ancestors { stack });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind, name: &str, children: Vec<SyntaxNode>) -> SyntaxNode {
        let mut n = SyntaxNode::new(kind, name, 1, 1);
        n.children = children;
        n
    }

    struct Recorder {
        seen: Vec<(String, usize, Option<String>)>,
    }

    impl<'t> Visitor<'t> for Recorder {
        fn element(&mut self, node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
            let parent = ancestors.parent_element().map(|p| p.name.clone());
            self.seen.push((node.name.clone(), ancestors.depth(), parent));
        }
    }

    #[test]
    fn test_walk_reports_depth_and_parent() {
        let tree = node(
            NodeKind::Root,
            "",
            vec![node(
                NodeKind::Element,
                "nav",
                vec![node(
                    NodeKind::Expression,
                    "",
                    vec![node(NodeKind::Element, "a", vec![])],
                )],
            )],
        );

        let mut rec = Recorder { seen: Vec::new() };
        walk(&tree, &mut rec);

        assert_eq!(
            rec.seen,
            vec![
                ("nav".to_string(), 1, None),
                ("a".to_string(), 3, Some("nav".to_string())),
            ]
        );
    }

    #[test]
    fn test_enclosing_function() {
        struct Calls<'t> {
            enclosing: Vec<Option<&'t str>>,
        }
        impl<'t> Visitor<'t> for Calls<'t> {
            fn call(&mut self, _node: &'t SyntaxNode, ancestors: Ancestors<'_, 't>) {
                self.enclosing
                    .push(ancestors.enclosing_function().map(|f| f.name.as_str()));
            }
        }

        let tree = node(
            NodeKind::Root,
            "",
            vec![
                node(NodeKind::Call, "top", vec![]),
                node(
                    NodeKind::Function,
                    "load",
                    vec![node(
                        NodeKind::Statement,
                        "expression_statement",
                        vec![node(NodeKind::Call, "fetch", vec![])],
                    )],
                ),
            ],
        );

        let mut v = Calls {
            enclosing: Vec::new(),
        };
        walk(&tree, &mut v);
        assert_eq!(v.enclosing, vec![None, Some("load")]);
    }
}
