use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node in the editor document tree.
///
/// Serializes to the editor's load format: a `type` discriminator plus
/// whichever of `attrs`/`content`/`marks`/`text` the kind populates.
/// A node never carries both `content` and `text`; `marks` and `text`
/// appear only on [`NodeKind::Text`] leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Kind-specific metadata (heading level, code language, `blockId`, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
    /// Ordered children of container kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    /// Styles applied to a text leaf.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    /// Raw text payload of a text leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Discriminator for document tree nodes, named as the editor expects them
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    Image,
    Text,
    AccordionGroup,
    AccordionItem,
    ColumnSet,
    Column,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::BulletList => "bulletList",
            NodeKind::OrderedList => "orderedList",
            NodeKind::ListItem => "listItem",
            NodeKind::Blockquote => "blockquote",
            NodeKind::CodeBlock => "codeBlock",
            NodeKind::HorizontalRule => "horizontalRule",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableHeader => "tableHeader",
            NodeKind::TableCell => "tableCell",
            NodeKind::Image => "image",
            NodeKind::Text => "text",
            NodeKind::AccordionGroup => "accordionGroup",
            NodeKind::AccordionItem => "accordionItem",
            NodeKind::ColumnSet => "columnSet",
            NodeKind::Column => "column",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "doc" => NodeKind::Doc,
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "bulletList" => NodeKind::BulletList,
            "orderedList" => NodeKind::OrderedList,
            "listItem" => NodeKind::ListItem,
            "blockquote" => NodeKind::Blockquote,
            "codeBlock" => NodeKind::CodeBlock,
            "horizontalRule" => NodeKind::HorizontalRule,
            "table" => NodeKind::Table,
            "tableRow" => NodeKind::TableRow,
            "tableHeader" => NodeKind::TableHeader,
            "tableCell" => NodeKind::TableCell,
            "image" => NodeKind::Image,
            "text" => NodeKind::Text,
            "accordionGroup" => NodeKind::AccordionGroup,
            "accordionItem" => NodeKind::AccordionItem,
            "columnSet" => NodeKind::ColumnSet,
            "column" => NodeKind::Column,
            _ => return None,
        })
    }

    /// Whether nodes of this kind carry a stable `blockId` attribute.
    /// Text leaves are the only ineligible kind.
    pub fn carries_block_id(self) -> bool {
        !matches!(self, NodeKind::Text)
    }
}

/// A style marker applied to a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkKind {
    Bold,
    Italic,
    Strike,
    Code,
    Link,
}

impl Mark {
    fn plain(kind: MarkKind) -> Self {
        Mark {
            kind,
            attrs: Map::new(),
        }
    }

    pub fn bold() -> Self {
        Mark::plain(MarkKind::Bold)
    }

    pub fn italic() -> Self {
        Mark::plain(MarkKind::Italic)
    }

    pub fn strike() -> Self {
        Mark::plain(MarkKind::Strike)
    }

    pub fn code() -> Self {
        Mark::plain(MarkKind::Code)
    }

    /// A link mark pointing at `href`.
    pub fn link(href: impl Into<String>) -> Self {
        let mut attrs = Map::new();
        attrs.insert("href".to_string(), Value::String(href.into()));
        Mark {
            kind: MarkKind::Link,
            attrs,
        }
    }
}

/// A structured editor node failed to decode.
///
/// The pass-through validator consumes these as degrade triggers; direct
/// [`Node::from_value`] callers see them as typed errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum NodeError {
    #[error("node is not a JSON object")]
    NotAnObject,
    #[error("node object has no `type` field")]
    MissingKind,
    #[error("unknown node kind `{0}`")]
    UnknownKind(String),
    #[error("`{field}` is not valid on a `{kind}` node")]
    FieldNotAllowed {
        kind: &'static str,
        field: &'static str,
    },
    #[error("node field `{0}` has the wrong shape")]
    MalformedField(&'static str),
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            attrs: Map::new(),
            content: Vec::new(),
            marks: Vec::new(),
            text: None,
        }
    }

    pub fn with_children(kind: NodeKind, content: Vec<Node>) -> Self {
        Node {
            content,
            ..Node::new(kind)
        }
    }

    /// An unstyled text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Node {
            text: Some(text.into()),
            ..Node::new(NodeKind::Text)
        }
    }

    /// A text leaf carrying the given marks.
    pub fn styled_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Node {
            marks,
            ..Node::text(text)
        }
    }

    /// Builder-style attribute insertion.
    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// The node's stable identifier, if one has been assigned.
    pub fn block_id(&self) -> Option<&str> {
        self.attrs.get("blockId").and_then(Value::as_str)
    }

    /// Concatenation of all text leaves under this node, in document order.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    /// Strictly decodes a JSON value into a node tree.
    ///
    /// Unlike the tolerant pass-through validator, any defect anywhere in
    /// the tree fails the whole decode with a typed error.
    pub fn from_value(value: &Value) -> Result<Self, NodeError> {
        let (mut node, children) = decode_shallow(value)?;
        node.content = children
            .iter()
            .map(|child| Node::from_value(child))
            .collect::<Result<_, _>>()?;
        Ok(node)
    }
}

/// Decodes one node level, returning the childless node plus the raw JSON
/// of its children. Enforces the kind/field exclusivity rules: `text` and
/// `marks` only on text leaves, `content` and `attrs` only on containers.
pub(crate) fn decode_shallow(value: &Value) -> Result<(Node, Vec<Value>), NodeError> {
    let obj = value.as_object().ok_or(NodeError::NotAnObject)?;
    let kind_str = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(NodeError::MissingKind)?;
    let kind =
        NodeKind::parse(kind_str).ok_or_else(|| NodeError::UnknownKind(kind_str.to_string()))?;

    let text = match obj.get("text") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(NodeError::MalformedField("text")),
    };
    let marks: Vec<Mark> = match obj.get("marks") {
        None => Vec::new(),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|_| NodeError::MalformedField("marks"))?,
    };
    let attrs = match obj.get("attrs") {
        None => Map::new(),
        Some(Value::Object(m)) => m.clone(),
        Some(_) => return Err(NodeError::MalformedField("attrs")),
    };
    let children = match obj.get("content") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => return Err(NodeError::MalformedField("content")),
    };

    if kind == NodeKind::Text {
        let field = if !children.is_empty() {
            Some("content")
        } else if !attrs.is_empty() {
            Some("attrs")
        } else {
            None
        };
        if let Some(field) = field {
            return Err(NodeError::FieldNotAllowed {
                kind: kind.as_str(),
                field,
            });
        }
    } else {
        let field = if text.is_some() {
            Some("text")
        } else if !marks.is_empty() {
            Some("marks")
        } else {
            None
        };
        if let Some(field) = field {
            return Err(NodeError::FieldNotAllowed {
                kind: kind.as_str(),
                field,
            });
        }
    }

    let node = Node {
        kind,
        attrs,
        content: Vec::new(),
        marks,
        text,
    };
    Ok((node, children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_to_editor_shape() {
        let node = Node::with_children(
            NodeKind::Heading,
            vec![Node::text("Title")],
        )
        .attr("level", 2u64);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "heading",
                "attrs": { "level": 2 },
                "content": [{ "type": "text", "text": "Title" }],
            })
        );
    }

    #[test]
    fn empty_fields_are_omitted() {
        let value = serde_json::to_value(Node::new(NodeKind::HorizontalRule)).unwrap();
        assert_eq!(value, json!({ "type": "horizontalRule" }));
    }

    #[test]
    fn kind_names_agree_with_serde() {
        for kind in [
            NodeKind::Doc,
            NodeKind::Paragraph,
            NodeKind::Heading,
            NodeKind::BulletList,
            NodeKind::OrderedList,
            NodeKind::ListItem,
            NodeKind::Blockquote,
            NodeKind::CodeBlock,
            NodeKind::HorizontalRule,
            NodeKind::Table,
            NodeKind::TableRow,
            NodeKind::TableHeader,
            NodeKind::TableCell,
            NodeKind::Image,
            NodeKind::Text,
            NodeKind::AccordionGroup,
            NodeKind::AccordionItem,
            NodeKind::ColumnSet,
            NodeKind::Column,
        ] {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, json!(kind.as_str()));
            assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn from_value_round_trips() {
        let value = json!({
            "type": "paragraph",
            "content": [
                { "type": "text", "text": "plain " },
                { "type": "text", "text": "bold", "marks": [{ "type": "bold" }] },
            ],
        });
        let node = Node::from_value(&value).unwrap();
        assert_eq!(node.plain_text(), "plain bold");
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert_eq!(Node::from_value(&json!("doc")), Err(NodeError::NotAnObject));
        assert_eq!(Node::from_value(&json!(3)), Err(NodeError::NotAnObject));
    }

    #[test]
    fn from_value_rejects_unknown_kinds() {
        let err = Node::from_value(&json!({ "type": "marquee" })).unwrap_err();
        assert_eq!(err, NodeError::UnknownKind("marquee".to_string()));
    }

    #[test]
    fn from_value_rejects_text_on_containers() {
        let err = Node::from_value(&json!({ "type": "paragraph", "text": "x" })).unwrap_err();
        assert_eq!(
            err,
            NodeError::FieldNotAllowed {
                kind: "paragraph",
                field: "text",
            }
        );
    }

    #[test]
    fn from_value_rejects_children_on_text_leaves() {
        let err = Node::from_value(&json!({
            "type": "text",
            "text": "x",
            "content": [{ "type": "text", "text": "y" }],
        }))
        .unwrap_err();
        assert_eq!(
            err,
            NodeError::FieldNotAllowed {
                kind: "text",
                field: "content",
            }
        );
    }

    #[test]
    fn block_id_reads_string_attr() {
        let node = Node::new(NodeKind::Paragraph).attr("blockId", "abc-123");
        assert_eq!(node.block_id(), Some("abc-123"));
        assert_eq!(Node::new(NodeKind::Paragraph).block_id(), None);
    }
}
