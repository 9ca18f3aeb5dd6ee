//! AST node structures.

use serde::Serialize;
use serde_json::{Map, Value};

/// Column alignment of a table, taken from the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl ColumnAlignment {
    /// Narrowest valid delimiter cell: `-`, `:-`, `-:` or `:-:`.
    pub fn min_width(self) -> usize {
        match self {
            ColumnAlignment::None => 1,
            ColumnAlignment::Left | ColumnAlignment::Right => 2,
            ColumnAlignment::Center => 3,
        }
    }

    /// Renders a delimiter cell of the given width, widened to
    /// [`min_width`](Self::min_width) if needed.
    pub fn delimiter(self, width: usize) -> String {
        let width = width.max(self.min_width());
        match self {
            ColumnAlignment::None => "-".repeat(width),
            ColumnAlignment::Left => format!(":{}", "-".repeat(width - 1)),
            ColumnAlignment::Right => format!("{}:", "-".repeat(width - 1)),
            ColumnAlignment::Center => format!(":{}:", "-".repeat(width - 2)),
        }
    }
}

/// Node type together with its type-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// ATX or setext heading.
    Heading { level: u8 },
    Paragraph,
    BulletList,
    OrderedList,
    /// A list entry. `level` is the list nesting depth (0 = top level);
    /// `ordered` is the kind of the list the item belongs to.
    ListItem {
        marker: String,
        level: usize,
        ordered: bool,
    },
    /// Fenced or indented code block.
    CodeBlock {
        language: Option<String>,
        #[serde(rename = "isInline")]
        is_inline: bool,
    },
    Blockquote,
    /// Table stored as `|`-delimited lines.
    Table { alignments: Vec<ColumnAlignment> },
}

impl NodeKind {
    /// Returns the node type name (`heading`, `bullet_list`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Heading { .. } => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::BulletList => "bullet_list",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::ListItem { .. } => "list_item",
            NodeKind::CodeBlock { .. } => "code_block",
            NodeKind::Blockquote => "blockquote",
            NodeKind::Table { .. } => "table",
        }
    }
}

/// Blank lines the serializer emits around a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    pub before: usize,
    pub after: usize,
}

/// A block-level node of the markdown AST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Raw text; meaning depends on the node type.
    pub content: String,
    /// 0-based source line.
    pub line: usize,
    /// List items of a list node.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MarkdownNode>,
    pub spacing: Spacing,
}

impl MarkdownNode {
    /// Creates a node without children or spacing.
    pub fn new(kind: NodeKind, content: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            content: content.into(),
            line,
            children: Vec::new(),
            spacing: Spacing::default(),
        }
    }

    pub fn heading(level: u8, content: impl Into<String>, line: usize) -> Self {
        Self::new(NodeKind::Heading { level }, content, line)
    }

    pub fn paragraph(content: impl Into<String>, line: usize) -> Self {
        Self::new(NodeKind::Paragraph, content, line)
    }

    /// Creates a list node. Its content is the newline join of the items.
    pub fn list(ordered: bool, items: Vec<MarkdownNode>, line: usize) -> Self {
        let kind = if ordered {
            NodeKind::OrderedList
        } else {
            NodeKind::BulletList
        };
        let mut node = Self::new(kind, String::new(), line);
        node.children = items;
        node.sync_list_content();
        node
    }

    pub fn list_item(
        marker: impl Into<String>,
        level: usize,
        ordered: bool,
        content: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::new(
            NodeKind::ListItem {
                marker: marker.into(),
                level,
                ordered,
            },
            content,
            line,
        )
    }

    pub fn code_block(language: Option<String>, content: impl Into<String>, line: usize) -> Self {
        Self::new(
            NodeKind::CodeBlock {
                language: language.filter(|l| !l.trim().is_empty()),
                is_inline: false,
            },
            content,
            line,
        )
    }

    pub fn blockquote(content: impl Into<String>, line: usize) -> Self {
        Self::new(NodeKind::Blockquote, content, line)
    }

    pub fn table(alignments: Vec<ColumnAlignment>, content: impl Into<String>, line: usize) -> Self {
        Self::new(NodeKind::Table { alignments }, content, line)
    }

    /// Node type name.
    pub fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, NodeKind::Heading { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, NodeKind::BulletList | NodeKind::OrderedList)
    }

    /// Heading level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    /// Recomputes a list node's content from its children.
    pub fn sync_list_content(&mut self) {
        if self.is_list() {
            self.content = self
                .children
                .iter()
                .map(|child| child.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
        }
    }

    /// Projects the type-specific data onto an open property map.
    ///
    /// Keys follow the camelCase names hosts expect: `level`, `marker`,
    /// `language`, `isInline`, `isOrdered`, `spacingBefore`, `spacingAfter`.
    pub fn metadata(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match &self.kind {
            NodeKind::Heading { level } => {
                map.insert("level".into(), Value::from(*level));
            }
            NodeKind::BulletList => {
                map.insert("isOrdered".into(), Value::Bool(false));
            }
            NodeKind::OrderedList => {
                map.insert("isOrdered".into(), Value::Bool(true));
            }
            NodeKind::ListItem { marker, level, .. } => {
                map.insert("marker".into(), Value::from(marker.as_str()));
                map.insert("level".into(), Value::from(*level));
            }
            NodeKind::CodeBlock {
                language,
                is_inline,
            } => {
                map.insert(
                    "language".into(),
                    Value::from(language.clone().unwrap_or_default()),
                );
                map.insert("isInline".into(), Value::Bool(*is_inline));
            }
            NodeKind::Paragraph | NodeKind::Blockquote | NodeKind::Table { .. } => {}
        }
        if self.spacing.before > 0 {
            map.insert("spacingBefore".into(), Value::from(self.spacing.before));
        }
        if self.spacing.after > 0 {
            map.insert("spacingAfter".into(), Value::from(self.spacing.after));
        }
        map
    }
}
