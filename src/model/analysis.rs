//! Content analysis snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Heuristic classification of a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    ApiDoc,
    Tutorial,
    Note,
    #[default]
    General,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::ApiDoc => "api-doc",
            DocumentType::Tutorial => "tutorial",
            DocumentType::Note => "note",
            DocumentType::General => "general",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api-doc" | "api" => Ok(DocumentType::ApiDoc),
            "tutorial" => Ok(DocumentType::Tutorial),
            "note" => Ok(DocumentType::Note),
            "general" => Ok(DocumentType::General),
            other => Err(crate::Error::Config(format!("unknown document type: {other}"))),
        }
    }
}

/// A heading and the headings nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingNode {
    pub level: u8,
    pub text: String,
    pub line: usize,
    pub children: Vec<HeadingNode>,
}

/// Heading levels and hierarchy of a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStructure {
    /// Distinct heading levels present, ascending.
    pub levels: Vec<u8>,
    pub hierarchy: Vec<HeadingNode>,
    /// False if any heading is more than one level deeper than its predecessor.
    pub has_proper_nesting: bool,
}

/// Simplified block classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Paragraph,
    Heading,
    List,
    Code,
    Table,
    Blockquote,
}

/// One entry of the flat block list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: String,
    pub line: usize,
    pub metadata: Map<String, Value>,
}

/// A list item as seen by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub content: String,
    pub level: usize,
    pub line: usize,
    pub marker: String,
}

/// List statistics of a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ListStructure {
    pub unordered: Vec<ListItem>,
    pub ordered: Vec<ListItem>,
    pub nested: bool,
    pub consistent: bool,
}

/// A code block as seen by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    pub content: String,
    pub language: Option<String>,
    pub line: usize,
    pub is_inline: bool,
}

/// Immutable analysis derived from one AST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub document_type: DocumentType,
    pub heading_structure: HeadingStructure,
    pub content_blocks: Vec<ContentBlock>,
    pub list_structure: ListStructure,
    pub code_blocks: Vec<CodeBlock>,
}

impl ContentAnalysis {
    /// Analysis of an empty document.
    pub fn empty() -> Self {
        Self {
            document_type: DocumentType::General,
            heading_structure: HeadingStructure {
                has_proper_nesting: true,
                ..Default::default()
            },
            content_blocks: Vec::new(),
            list_structure: ListStructure {
                consistent: true,
                ..Default::default()
            },
            code_blocks: Vec::new(),
        }
    }

    /// Number of headings in the hierarchy, at any depth.
    pub fn heading_count(&self) -> usize {
        fn count(nodes: &[HeadingNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.heading_structure.hierarchy)
    }
}
