//! AST walking utilities.
//!
//! Provides shared traversal logic so the extraction passes don't each
//! duplicate recursive descent over the node tree.
//!
//! # Design
//!
//! - **Minimal API** - a single `walk_nodes` function plus find helpers,
//!   not a trait hierarchy
//! - **Visitor pattern** - caller provides `FnMut(&DtNode)` for node
//!   inspection
//! - **Pre-order traversal** - visitor called before recursing into
//!   children
//!
//! All extraction passes need the same traversal structure, so a
//! closure-based API is simpler and more flexible than a visitor trait.

use crate::node::DtNode;

/// Recursively walk a forest of nodes in pre-order, calling the visitor
/// for each node.
///
/// The visitor is called once per node, parent before children, siblings
/// in source order.
pub fn walk_nodes<'a, V>(roots: &'a [DtNode], visitor: &mut V)
where
    V: FnMut(&'a DtNode),
{
    for node in roots {
        visit(node, visitor);
    }
}

fn visit<'a, V>(node: &'a DtNode, visitor: &mut V)
where
    V: FnMut(&'a DtNode),
{
    visitor(node);
    for child in &node.children {
        visit(child, visitor);
    }
}

/// Collect every node satisfying a predicate, in pre-order.
pub fn find_nodes_where<'a, P>(roots: &'a [DtNode], predicate: P) -> Vec<&'a DtNode>
where
    P: Fn(&DtNode) -> bool,
{
    let mut found = Vec::new();
    walk_nodes(roots, &mut |node| {
        if predicate(node) {
            found.push(node);
        }
    });
    found
}

/// Collect every node with the given name.
pub fn find_nodes_named<'a>(roots: &'a [DtNode], name: &str) -> Vec<&'a DtNode> {
    find_nodes_where(roots, |node| node.name == name)
}

/// Collect every node whose `compatible` property equals the given string.
pub fn find_nodes_compatible<'a>(roots: &'a [DtNode], compatible: &str) -> Vec<&'a DtNode> {
    find_nodes_where(roots, |node| node.compatible() == Some(compatible))
}
