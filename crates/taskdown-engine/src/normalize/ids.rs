//! Stable identifier assignment.

use serde_json::Value;
use uuid::Uuid;

use crate::model::Node;

/// Attribute key under which structural nodes carry their identifier.
pub const BLOCK_ID_ATTR: &str = "blockId";

/// Stamps a fresh identifier onto every eligible node lacking one.
///
/// Pre-order walk over structural kinds; text leaves are never stamped.
/// An identifier that is already present is never regenerated or
/// replaced, so applying the pass a second time is a no-op.
pub fn assign_ids(node: &mut Node) {
    if node.kind.carries_block_id() && !node.attrs.contains_key(BLOCK_ID_ATTR) {
        node.attrs.insert(
            BLOCK_ID_ATTR.to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
    }
    for child in &mut node.content {
        assign_ids(child);
    }
}
