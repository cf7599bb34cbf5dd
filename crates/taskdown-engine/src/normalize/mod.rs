//! Format detection and dispatch.
//!
//! `normalize` is the single entry point for document-editing requests:
//! it accepts whatever the caller produced (a simplified block array, an
//! already-structured tree, markdown, plain text, a JSON-encoded string
//! of any of those, or garbage), classifies it, routes it through the
//! matching pipeline, and stamps stable identifiers on the result. It is
//! total: malformed content degrades, it never errors.

pub mod composite;
pub mod ids;
pub mod lower;
pub mod markdown;
pub mod validate;

use serde_json::Value;

use crate::model::{Node, NodeKind};

/// Process-wide normalization defaults, immutable after construction.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Language attribute applied to code blocks that do not declare one.
    pub default_code_language: String,
    /// How many levels of JSON-encoded string input to unwrap before
    /// treating the payload as literal text. One level is enough for the
    /// tool-call envelopes we see in practice; the cap prevents a string
    /// that decodes to itself from looping.
    pub max_json_unwrap_depth: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            default_code_language: "plain".to_string(),
            max_json_unwrap_depth: 1,
        }
    }
}

/// Classification of an untyped input value. Detection runs first and
/// the dispatcher matches exhaustively on the result.
#[derive(Debug)]
enum InputShape<'a> {
    /// Nothing to normalize: absent or JSON `null`.
    Empty,
    /// A simplified block array.
    Blocks(&'a [Value]),
    /// An already-structured document tree.
    Tree(&'a Value),
    /// A string: markdown, plain text, or JSON-encoded input.
    Text(&'a str),
    /// Anything else; coerced to its textual representation.
    Other(&'a Value),
}

fn detect(value: &Value) -> InputShape<'_> {
    match value {
        Value::Null => InputShape::Empty,
        Value::Array(items) if is_block_array(items) => InputShape::Blocks(items),
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("doc") => {
            InputShape::Tree(value)
        }
        Value::String(s) => InputShape::Text(s),
        other => InputShape::Other(other),
    }
}

/// A block array is a sequence of mappings that each carry a `type`
/// string, at least one of which is drawn from the block vocabulary.
/// Individual unrecognized types inside such an array degrade per
/// element during lowering; an array with no recognizable block at all
/// is not block input.
fn is_block_array(items: &[Value]) -> bool {
    let all_tagged = items.iter().all(|item| {
        item.as_object()
            .and_then(|obj| obj.get("type"))
            .is_some_and(Value::is_string)
    });
    if !all_tagged {
        return false;
    }
    items.is_empty()
        || items.iter().any(|item| {
            item.get("type")
                .and_then(Value::as_str)
                .is_some_and(crate::model::InputBlock::is_known_type)
        })
}

/// Normalizes an arbitrary JSON value into an editor document tree.
///
/// Total: always returns a tree rooted at `doc`, with every structural
/// node carrying a `blockId`.
pub fn normalize(content: Option<&Value>) -> Node {
    normalize_with(content, &NormalizeOptions::default())
}

pub fn normalize_with(content: Option<&Value>, options: &NormalizeOptions) -> Node {
    let mut root = match content {
        None => Node::new(NodeKind::Doc),
        Some(value) => classify(value, 0, options),
    };
    ids::assign_ids(&mut root);
    root
}

/// Normalizes raw request text: markdown, plain text, or a JSON-encoded
/// document description.
pub fn normalize_str(content: &str) -> Node {
    normalize_str_with(content, &NormalizeOptions::default())
}

pub fn normalize_str_with(content: &str, options: &NormalizeOptions) -> Node {
    let mut root = classify_text(content, 0, options);
    ids::assign_ids(&mut root);
    root
}

fn classify(value: &Value, depth: usize, options: &NormalizeOptions) -> Node {
    match detect(value) {
        InputShape::Empty => Node::new(NodeKind::Doc),
        InputShape::Blocks(items) => {
            log::debug!("dispatch: lowering {} simplified blocks", items.len());
            Node::with_children(NodeKind::Doc, lower::lower_all(items, options))
        }
        InputShape::Tree(tree) => {
            log::debug!("dispatch: validating structured tree");
            validate::validate_tree(tree)
        }
        InputShape::Text(text) => classify_text(text, depth, options),
        InputShape::Other(other) => {
            log::debug!("dispatch: coercing scalar input to text");
            plain_text_doc(&other.to_string())
        }
    }
}

fn classify_text(text: &str, depth: usize, options: &NormalizeOptions) -> Node {
    if text.trim().is_empty() {
        return Node::new(NodeKind::Doc);
    }
    if depth < options.max_json_unwrap_depth
        && let Some(unwrapped) = unwrap_json(text)
    {
        // One level of unwrapping only: a string that decodes to another
        // string is literal text, never decoded again.
        return match unwrapped {
            Value::String(inner) => plain_text_doc(&inner),
            other => classify(&other, depth + 1, options),
        };
    }
    if markdown::looks_like_markdown(text) {
        log::debug!("dispatch: converting markdown text");
        return markdown::markdown_to_tree(text, options);
    }
    plain_text_doc(text)
}

/// Decodes a string that is itself JSON-encoded input. Scalars are
/// rejected so that request text like `"42"` or `"null"` stays visible
/// as literal text instead of vanishing into the scalar pipelines.
fn unwrap_json(text: &str) -> Option<Value> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with(['[', '{', '"']) {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Array(_) | Value::Object(_) | Value::String(_))) => Some(value),
        _ => None,
    }
}

fn plain_text_doc(text: &str) -> Node {
    Node::with_children(
        NodeKind::Doc,
        vec![Node::with_children(
            NodeKind::Paragraph,
            vec![Node::text(text)],
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null))]
    #[case(json!(42))]
    #[case(json!(true))]
    #[case(json!([]))]
    #[case(json!({}))]
    #[case(json!([1, 2, 3]))]
    #[case(json!({ "unexpected": "shape" }))]
    fn never_fails_and_roots_at_doc(#[case] input: Value) {
        let tree = normalize(Some(&input));
        assert_eq!(tree.kind, NodeKind::Doc);
        assert!(tree.block_id().is_some());
    }

    #[test]
    fn absent_and_null_yield_empty_documents() {
        assert_eq!(normalize(None).content, vec![]);
        assert_eq!(normalize(Some(&Value::Null)).content, vec![]);
    }

    #[test]
    fn scalar_input_is_coerced_to_text() {
        let tree = normalize(Some(&json!(42)));
        assert_eq!(tree.plain_text(), "42");
        assert_eq!(tree.content[0].kind, NodeKind::Paragraph);
    }

    #[test]
    fn block_array_is_lowered() {
        let tree = normalize(Some(&json!([
            { "type": "heading", "level": 1, "text": "Title" },
            { "type": "divider" },
        ])));
        assert_eq!(tree.content.len(), 2);
        assert_eq!(tree.content[0].kind, NodeKind::Heading);
        assert_eq!(tree.content[0].attrs["level"], json!(1));
        assert_eq!(tree.content[0].plain_text(), "Title");
        assert_eq!(tree.content[1].kind, NodeKind::HorizontalRule);
        assert!(tree.content[1].content.is_empty());
    }

    #[test]
    fn structured_tree_passes_through() {
        let input = json!({
            "type": "doc",
            "content": [
                { "type": "paragraph", "content": [{ "type": "text", "text": "hi" }] },
            ],
        });
        let tree = normalize(Some(&input));
        assert_eq!(tree.content.len(), 1);
        assert_eq!(tree.plain_text(), "hi");
    }

    #[test]
    fn markdown_string_is_converted() {
        let tree = normalize_str("# Title\n\nBody text");
        assert_eq!(tree.content[0].kind, NodeKind::Heading);
        assert_eq!(tree.content[1].kind, NodeKind::Paragraph);
    }

    #[test]
    fn inline_spans_survive_string_dispatch() {
        let tree = normalize_str("Text with **bold** and *italic*");
        let para = &tree.content[0];
        assert_eq!(para.kind, NodeKind::Paragraph);
        let kinds: Vec<Vec<MarkKind>> = para
            .content
            .iter()
            .map(|n| n.marks.iter().map(|m| m.kind).collect())
            .collect();
        assert!(kinds.contains(&vec![MarkKind::Bold]));
        assert!(kinds.contains(&vec![MarkKind::Italic]));
        assert_eq!(para.plain_text(), "Text with bold and italic");
    }

    #[test]
    fn plain_string_becomes_single_paragraph() {
        let tree = normalize_str("just words");
        assert_eq!(tree.content.len(), 1);
        assert_eq!(tree.content[0].kind, NodeKind::Paragraph);
        assert_eq!(tree.content[0].content, vec![Node::text("just words")]);
    }

    #[test]
    fn json_encoded_blocks_are_unwrapped_once() {
        let encoded = r#"[{"type":"divider"}]"#;
        let tree = normalize_str(encoded);
        assert_eq!(tree.content.len(), 1);
        assert_eq!(tree.content[0].kind, NodeKind::HorizontalRule);
    }

    #[test]
    fn string_decoding_to_string_is_literal_text() {
        let tree = normalize_str(r#""[{\"type\":\"divider\"}]""#);
        // The outer quotes decode once; the inner payload must stay text.
        assert_eq!(tree.content[0].kind, NodeKind::Paragraph);
        assert_eq!(tree.plain_text(), r#"[{"type":"divider"}]"#);
    }

    #[test]
    fn invalid_json_falls_through_to_text() {
        let tree = normalize_str("{not json at all");
        assert_eq!(tree.content[0].kind, NodeKind::Paragraph);
        assert_eq!(tree.plain_text(), "{not json at all");
    }

    #[test]
    fn scalar_json_strings_stay_literal() {
        for input in ["42", "true", "null"] {
            let tree = normalize_str(input);
            assert_eq!(tree.plain_text(), input, "input {input:?}");
        }
    }

    #[test]
    fn whitespace_only_string_is_empty_document() {
        assert_eq!(normalize_str("   \n  ").content, vec![]);
    }

    #[test]
    fn array_without_known_types_is_not_block_input() {
        let tree = normalize(Some(&json!([{ "type": "widget" }])));
        assert_eq!(tree.content[0].kind, NodeKind::Paragraph);
        assert!(tree.plain_text().contains("widget"));
    }

    #[test]
    fn mixed_arrays_lower_with_per_element_degrade() {
        let tree = normalize(Some(&json!([
            { "type": "divider" },
            { "type": "widget", "spin": true },
        ])));
        assert_eq!(tree.content.len(), 2);
        assert_eq!(tree.content[0].kind, NodeKind::HorizontalRule);
        assert_eq!(tree.content[1].kind, NodeKind::Paragraph);
        assert!(tree.content[1].plain_text().contains("spin"));
    }

    #[test]
    fn every_structural_node_gets_an_id() {
        let tree = normalize(Some(&json!([
            { "type": "list", "items": ["a", "b"] },
        ])));
        fn check(node: &Node) {
            if node.kind.carries_block_id() {
                assert!(node.block_id().is_some(), "missing id on {:?}", node.kind);
            } else {
                assert!(node.block_id().is_none());
            }
            node.content.iter().for_each(check);
        }
        check(&tree);
    }

    #[test]
    fn unwrap_depth_is_configurable() {
        let options = NormalizeOptions {
            max_json_unwrap_depth: 0,
            ..NormalizeOptions::default()
        };
        let tree = normalize_str_with(r#"[{"type":"divider"}]"#, &options);
        // With unwrapping disabled the payload reads as literal text.
        assert_eq!(tree.plain_text(), r#"[{"type":"divider"}]"#);
    }
}
