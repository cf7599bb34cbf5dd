//! Lowers simplified input blocks into document tree nodes.

use serde_json::Value;

use crate::inline::parse_inline;
use crate::model::{ChecklistEntry, InputBlock, LooseText, Node, NodeKind};

use super::{NormalizeOptions, composite};

/// Lowers a block sequence in order, concatenating the results.
pub fn lower_all(values: &[Value], options: &NormalizeOptions) -> Vec<Node> {
    values
        .iter()
        .flat_map(|value| lower_value(value, options))
        .collect()
}

/// Lowers one raw block value, degrading softly when it cannot be read
/// as a typed block. Nothing is ever silently dropped.
pub fn lower_value(value: &Value, options: &NormalizeOptions) -> Vec<Node> {
    match InputBlock::parse(value) {
        Some(block) => lower(&block, options),
        None => {
            let type_name = value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("<missing>");
            log::warn!("unrecognized block type `{type_name}`; emitting its JSON as a paragraph");
            vec![degraded_paragraph(value)]
        }
    }
}

/// Lowers one typed block. Every block produces at least one node.
pub fn lower(block: &InputBlock, options: &NormalizeOptions) -> Vec<Node> {
    let node = match block {
        InputBlock::Heading { level, text } => heading(*level, text),
        InputBlock::Paragraph { text } => paragraph(text),
        InputBlock::List { items } => list(NodeKind::BulletList, items),
        InputBlock::OrderedList { items } => list(NodeKind::OrderedList, items),
        InputBlock::Checklist { items } => checklist(items),
        InputBlock::Quote { text } => {
            Node::with_children(NodeKind::Blockquote, vec![paragraph(text)])
        }
        InputBlock::Code { language, text } => code_block(language.as_deref(), text, options),
        InputBlock::Divider => Node::new(NodeKind::HorizontalRule),
        InputBlock::Table { headers, rows } => table(headers, rows),
        InputBlock::Image { url, alt } => image(url, alt.as_deref()),
        InputBlock::Accordion { items } => composite::accordion_group(items, options),
        InputBlock::Columns { columns } => composite::column_set(columns, options),
    };
    vec![node]
}

/// Fallback for unrecognized or undecodable blocks: a paragraph holding
/// the offending value's JSON text.
pub(crate) fn degraded_paragraph(value: &Value) -> Node {
    Node::with_children(NodeKind::Paragraph, vec![Node::text(value.to_string())])
}

fn heading(level: i64, text: &LooseText) -> Node {
    Node::with_children(NodeKind::Heading, parse_inline(text.as_str()))
        .attr("level", level.clamp(1, 6))
}

fn paragraph(text: &LooseText) -> Node {
    Node::with_children(NodeKind::Paragraph, parse_inline(text.as_str()))
}

fn list(kind: NodeKind, items: &[LooseText]) -> Node {
    let items = items
        .iter()
        .map(|item| Node::with_children(NodeKind::ListItem, vec![paragraph(item)]))
        .collect();
    Node::with_children(kind, items)
}

fn checklist(items: &[ChecklistEntry]) -> Node {
    let items = items
        .iter()
        .map(|item| {
            Node::with_children(
                NodeKind::ListItem,
                vec![Node::with_children(
                    NodeKind::Paragraph,
                    parse_inline(item.text()),
                )],
            )
            .attr("checked", item.checked())
        })
        .collect();
    Node::with_children(NodeKind::BulletList, items)
}

fn code_block(language: Option<&str>, text: &LooseText, options: &NormalizeOptions) -> Node {
    let language = language
        .filter(|lang| !lang.is_empty())
        .unwrap_or(&options.default_code_language);
    // Code content is raw: markdown parsing never applies inside it.
    let content = if text.as_str().is_empty() {
        vec![]
    } else {
        vec![Node::text(text.as_str())]
    };
    Node::with_children(NodeKind::CodeBlock, content).attr("language", language)
}

/// Builds a table whose column count is fixed by the header row. Ragged
/// body rows are padded with empty cells; excess cells are truncated.
fn table(headers: &[LooseText], rows: &[Vec<LooseText>]) -> Node {
    let width = if headers.is_empty() {
        rows.iter().map(Vec::len).max().unwrap_or(0)
    } else {
        headers.len()
    };

    let mut table_rows = Vec::with_capacity(rows.len() + 1);
    if !headers.is_empty() {
        let cells = headers
            .iter()
            .map(|h| cell(NodeKind::TableHeader, Some(h)))
            .collect();
        table_rows.push(Node::with_children(NodeKind::TableRow, cells));
    }
    for row in rows {
        let cells = (0..width)
            .map(|i| cell(NodeKind::TableCell, row.get(i)))
            .collect();
        table_rows.push(Node::with_children(NodeKind::TableRow, cells));
    }
    Node::with_children(NodeKind::Table, table_rows)
}

fn cell(kind: NodeKind, text: Option<&LooseText>) -> Node {
    let inline = text.map(|t| parse_inline(t.as_str())).unwrap_or_default();
    Node::with_children(kind, vec![Node::with_children(NodeKind::Paragraph, inline)])
}

fn image(url: &str, alt: Option<&str>) -> Node {
    let mut node = Node::new(NodeKind::Image).attr("url", url);
    if let Some(alt) = alt {
        node = node.attr("alt", alt);
    }
    node
}
