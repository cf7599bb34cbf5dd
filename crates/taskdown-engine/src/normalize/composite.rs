//! Builders for blocks whose content is itself a sub-document.

use crate::inline::parse_inline;
use crate::model::{AccordionEntry, NestedContent, Node, NodeKind};

use super::{NormalizeOptions, lower};

/// Builds an accordion group from its items.
pub fn accordion_group(entries: &[AccordionEntry], options: &NormalizeOptions) -> Node {
    let items = entries
        .iter()
        .map(|entry| accordion_item(entry, options))
        .collect();
    Node::with_children(NodeKind::AccordionGroup, items)
}

/// Builds one accordion item.
///
/// The title is stored as a plain attribute and never inline-parsed;
/// titles do not support styling. Presentation fields are attached only
/// when present so downstream rendering applies its own defaults.
/// Called directly by accordion-editing request handlers as well as by
/// the lowering engine.
pub fn accordion_item(entry: &AccordionEntry, options: &NormalizeOptions) -> Node {
    let mut node = Node::with_children(
        NodeKind::AccordionItem,
        nested_content(&entry.content, options),
    )
    .attr("title", entry.title.as_str());
    if let Some(icon) = &entry.icon {
        node = node.attr("icon", icon.as_str());
    }
    if let Some(color) = &entry.icon_color {
        node = node.attr("iconColor", color.as_str());
    }
    if let Some(color) = &entry.title_color {
        node = node.attr("titleColor", color.as_str());
    }
    node
}

/// Builds a column set with exactly one column per entry. No minimum or
/// maximum count is enforced here; layout is the renderer's concern.
pub fn column_set(columns: &[NestedContent], options: &NormalizeOptions) -> Node {
    let columns = columns
        .iter()
        .map(|column| {
            Node::with_children(NodeKind::Column, nested_content(column, options))
        })
        .collect();
    Node::with_children(NodeKind::ColumnSet, columns)
}

/// Lowers composite content: raw text becomes a single inline-parsed
/// paragraph, a nested block sequence is lowered recursively.
fn nested_content(content: &NestedContent, options: &NormalizeOptions) -> Vec<Node> {
    match content {
        NestedContent::Text(text) => vec![Node::with_children(
            NodeKind::Paragraph,
            parse_inline(text.as_str()),
        )],
        NestedContent::Blocks(blocks) => lower::lower_all(blocks, options),
    }
}
