//! Pass-through validation of already-structured document trees.

use serde_json::Value;

use crate::model::{Node, NodeKind, node::decode_shallow};

use super::lower::degraded_paragraph;

/// Validates a value already shaped as a document tree, returning it
/// structurally unchanged where it is well-formed.
///
/// Defects never fail the call: a node that cannot be decoded, or that
/// violates the children/text exclusivity rules, is coerced to a
/// paragraph of its JSON text and validation continues around it.
pub fn validate_tree(value: &Value) -> Node {
    match decode_shallow(value) {
        Ok((mut root, children)) if root.kind == NodeKind::Doc => {
            root.content = children.iter().map(validate_node).collect();
            root
        }
        Ok(_) | Err(_) => {
            log::warn!("structured input lacks a well-formed `doc` root; wrapping");
            Node::with_children(NodeKind::Doc, vec![validate_node(value)])
        }
    }
}

fn validate_node(value: &Value) -> Node {
    match decode_shallow(value) {
        Ok((mut node, children)) => {
            node.content = children.iter().map(validate_node).collect();
            node
        }
        Err(err) => {
            log::warn!("structured node rejected ({err}); coercing to paragraph");
            degraded_paragraph(value)
        }
    }
}
