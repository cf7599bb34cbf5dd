use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One element of the simplified block description that document-editing
/// requests submit.
///
/// The wire form is an object tagged by `type`. Callers are AI-generated
/// or human-typed, so field shapes are accepted loosely; anything that
/// still fails to decode is handled by the lowering engine's degrade path
/// rather than surfacing an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputBlock {
    Heading {
        #[serde(default = "default_heading_level")]
        level: i64,
        #[serde(default)]
        text: LooseText,
    },
    Paragraph {
        #[serde(default)]
        text: LooseText,
    },
    List {
        #[serde(default)]
        items: Vec<LooseText>,
    },
    OrderedList {
        #[serde(default)]
        items: Vec<LooseText>,
    },
    Checklist {
        #[serde(default)]
        items: Vec<ChecklistEntry>,
    },
    Quote {
        #[serde(default)]
        text: LooseText,
    },
    Code {
        #[serde(default)]
        language: Option<String>,
        #[serde(default, alias = "code", alias = "content")]
        text: LooseText,
    },
    Divider,
    Table {
        #[serde(default)]
        headers: Vec<LooseText>,
        #[serde(default)]
        rows: Vec<Vec<LooseText>>,
    },
    Image {
        #[serde(default, alias = "src")]
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },
    Accordion {
        #[serde(default)]
        items: Vec<AccordionEntry>,
    },
    Columns {
        #[serde(default)]
        columns: Vec<NestedContent>,
    },
}

fn default_heading_level() -> i64 {
    1
}

impl InputBlock {
    /// Attempts to read a JSON value as a typed block.
    ///
    /// Returns `None` for unrecognized `type` discriminators and for known
    /// types whose fields cannot be decoded; the caller decides how to
    /// degrade. A bare `{type: "accordion", title, content}` mapping is
    /// accepted as a one-item accordion.
    pub fn parse(value: &Value) -> Option<Self> {
        if let Some(shorthand) = expand_bare_accordion(value) {
            return serde_json::from_value(shorthand).ok();
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Whether `type_name` is a member of the simplified block vocabulary.
    pub fn is_known_type(type_name: &str) -> bool {
        matches!(
            type_name,
            "heading"
                | "paragraph"
                | "list"
                | "ordered_list"
                | "checklist"
                | "quote"
                | "code"
                | "divider"
                | "table"
                | "image"
                | "accordion"
                | "columns"
        )
    }
}

/// Rewrites `{type: "accordion", title, content}` into the canonical
/// `items` form. Returns `None` when the value is not that shorthand.
fn expand_bare_accordion(value: &Value) -> Option<Value> {
    let obj = value.as_object()?;
    if obj.get("type").and_then(Value::as_str) != Some("accordion") {
        return None;
    }
    if obj.contains_key("items") || !obj.contains_key("title") {
        return None;
    }
    Some(serde_json::json!({
        "type": "accordion",
        "items": [value],
    }))
}

/// A text field that tolerates scalar sloppiness: strings pass through,
/// numbers and booleans are stringified, `null` reads as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LooseText(pub String);

impl LooseText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for LooseText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(LooseText(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        }))
    }
}

/// One checklist entry: either `{text, checked}` or a bare string
/// (read as unchecked).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChecklistEntry {
    Detailed {
        text: LooseText,
        #[serde(default)]
        checked: bool,
    },
    Plain(LooseText),
}

impl ChecklistEntry {
    pub fn text(&self) -> &str {
        match self {
            ChecklistEntry::Detailed { text, .. } => text.as_str(),
            ChecklistEntry::Plain(text) => text.as_str(),
        }
    }

    pub fn checked(&self) -> bool {
        match self {
            ChecklistEntry::Detailed { checked, .. } => *checked,
            ChecklistEntry::Plain(_) => false,
        }
    }
}

/// One accordion item as submitted by accordion-editing requests.
///
/// `content` is either raw text or a nested block sequence. The optional
/// presentation fields pass through as attributes only when present, so
/// downstream rendering applies its own defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccordionEntry {
    #[serde(default)]
    pub title: LooseText,
    #[serde(default)]
    pub content: NestedContent,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, rename = "iconColor")]
    pub icon_color: Option<String>,
    #[serde(default, rename = "titleColor")]
    pub title_color: Option<String>,
}

/// Content of a composite block: raw text or a nested block sequence.
///
/// Nested blocks stay as raw JSON values so that an unrecognized nested
/// block degrades individually instead of rejecting its whole parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NestedContent {
    Text(LooseText),
    Blocks(Vec<Value>),
}

impl Default for NestedContent {
    fn default() -> Self {
        NestedContent::Text(LooseText::default())
    }
}
