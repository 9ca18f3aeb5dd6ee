//! Content analysis of a parsed document.
//!
//! The analyzer walks the AST and derives:
//! - a document type from keyword density (api-doc, tutorial, note, general)
//! - the heading hierarchy and whether its nesting is well formed
//! - a flat block classification
//! - list statistics (ordered/unordered items, nesting, marker consistency)
//! - the code blocks with their languages
//!
//! The auxiliary `has_*_structure` detectors are not used by [`ContentAnalyzer::analyze`];
//! they give callers a finer signal than the single document type verdict.

use crate::error::{Error, Result};
use crate::model::{
    BlockType, CodeBlock, ContentAnalysis, ContentBlock, DocumentType, HeadingNode,
    HeadingStructure, ListItem, ListStructure, MarkdownAst, MarkdownNode, NodeKind,
};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

// Document type indicators, matched against lower-cased content
static API_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"api|endpoint|request|response|参数|返回值|接口",
        r"get|post|put|delete|patch",
        r"json|xml|http|https|rest",
        r"authentication|authorization|token",
    ])
});

static TUTORIAL_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"教程|指南|步骤|安装|配置|使用方法|快速开始|getting started",
        r"第一步|第二步|step 1|step 2|首先|然后|最后",
        r"如何|怎么|how to|tutorial",
    ])
});

static NOTE_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"笔记|notes|记录|总结|summary",
        r"要点|重点|关键|important|注意",
        r"学习|研究|思考|心得",
    ])
});

static API_STRUCTURE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)endpoints?",
        r"(?i)parameters?.*response",
        r"(?i)request.*response",
        r"(?i)status.*code",
        r"(?i)api.*reference",
    ])
});

static TUTORIAL_STRUCTURE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"安装|installation",
        r"配置|configuration",
        r"开始|getting.*started",
        r"示例|example",
        r"步骤|step",
    ])
});

static ORDERED_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").unwrap());

/// Derives a [`ContentAnalysis`] from an AST without modifying it.
#[derive(Debug, Clone, Default)]
pub struct ContentAnalyzer {
    document_type_override: Option<DocumentType>,
}

impl ContentAnalyzer {
    /// Create a new analyzer that detects the document type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given document type instead of detecting one.
    pub fn with_document_type_override(mut self, document_type: Option<DocumentType>) -> Self {
        self.document_type_override = document_type;
        self
    }

    /// Analyze the document.
    pub fn analyze(&self, ast: &MarkdownAst) -> Result<ContentAnalysis> {
        let document_type = match self.document_type_override {
            Some(document_type) => document_type,
            None => self.detect_document_type(ast),
        };

        let analysis = ContentAnalysis {
            document_type,
            heading_structure: self.analyze_headings(ast)?,
            content_blocks: self.extract_blocks(ast),
            list_structure: self.analyze_lists(ast)?,
            code_blocks: self.extract_code_blocks(ast),
        };

        log::debug!(
            "analyzed document: type={}, headings={}, blocks={}, code blocks={}",
            analysis.document_type,
            analysis.heading_count(),
            analysis.content_blocks.len(),
            analysis.code_blocks.len()
        );
        Ok(analysis)
    }

    /// Classify the document by indicator match counts.
    ///
    /// The highest score wins; ties go to the family checked first
    /// (api-doc, then tutorial, then note). No matches at all means general.
    pub fn detect_document_type(&self, ast: &MarkdownAst) -> DocumentType {
        let text = joined_content(ast).to_lowercase();
        let scores = [
            (DocumentType::ApiDoc, score(&API_INDICATORS, &text)),
            (DocumentType::Tutorial, score(&TUTORIAL_INDICATORS, &text)),
            (DocumentType::Note, score(&NOTE_INDICATORS, &text)),
        ];

        let mut best = (DocumentType::General, 0);
        for (document_type, score) in scores {
            if score > best.1 {
                best = (document_type, score);
            }
        }
        best.0
    }

    /// Build the heading forest and check nesting.
    pub fn analyze_headings(&self, ast: &MarkdownAst) -> Result<HeadingStructure> {
        let mut headings = Vec::new();
        for node in ast.nodes() {
            if let NodeKind::Heading { level } = node.kind {
                if !(1..=6).contains(&level) {
                    return Err(Error::Analysis(format!(
                        "heading at line {} has invalid level {}",
                        node.line, level
                    )));
                }
                headings.push(HeadingNode {
                    level,
                    text: node.content.clone(),
                    line: node.line,
                    children: Vec::new(),
                });
            }
        }

        let levels: BTreeSet<u8> = headings.iter().map(|h| h.level).collect();
        let has_proper_nesting = headings.windows(2).all(|w| w[1].level <= w[0].level + 1);

        let mut roots = Vec::new();
        let mut stack: Vec<HeadingNode> = Vec::new();
        for heading in headings {
            while let Some(top) = stack.pop() {
                if top.level < heading.level {
                    stack.push(top);
                    break;
                }
                attach(top, &mut stack, &mut roots);
            }
            stack.push(heading);
        }
        while let Some(top) = stack.pop() {
            attach(top, &mut stack, &mut roots);
        }

        Ok(HeadingStructure {
            levels: levels.into_iter().collect(),
            hierarchy: roots,
            has_proper_nesting,
        })
    }

    /// Flat block list mirroring the top-level nodes.
    pub fn extract_blocks(&self, ast: &MarkdownAst) -> Vec<ContentBlock> {
        ast.nodes()
            .iter()
            .map(|node| ContentBlock {
                block_type: block_type(node),
                content: node.content.clone(),
                line: node.line,
                metadata: node.metadata(),
            })
            .collect()
    }

    /// Collect list items into ordered/unordered buckets.
    pub fn analyze_lists(&self, ast: &MarkdownAst) -> Result<ListStructure> {
        let mut structure = ListStructure::default();

        for node in ast.nodes().iter().filter(|n| n.is_list()) {
            for child in &node.children {
                let NodeKind::ListItem {
                    marker,
                    level,
                    ordered,
                } = &child.kind
                else {
                    return Err(Error::Analysis(format!(
                        "list at line {} contains a {} node",
                        node.line,
                        child.type_name()
                    )));
                };

                let item = ListItem {
                    content: child.content.clone(),
                    level: *level,
                    line: child.line,
                    marker: marker.clone(),
                };
                if *level > 0 {
                    structure.nested = true;
                }
                if *ordered {
                    structure.ordered.push(item);
                } else {
                    structure.unordered.push(item);
                }
            }
        }

        let bullet_shapes: HashSet<&str> = structure
            .unordered
            .iter()
            .map(|item| item.marker.as_str())
            .collect();
        let number_shapes: HashSet<String> = structure
            .ordered
            .iter()
            .map(|item| ORDERED_NUMBER.replace(&item.marker, "N").into_owned())
            .collect();
        structure.consistent = bullet_shapes.len() <= 1 && number_shapes.len() <= 1;

        Ok(structure)
    }

    /// All code blocks in document order.
    pub fn extract_code_blocks(&self, ast: &MarkdownAst) -> Vec<CodeBlock> {
        let mut blocks = Vec::new();
        ast.walk(|node, _, _| {
            if let NodeKind::CodeBlock {
                language,
                is_inline,
            } = &node.kind
            {
                blocks.push(CodeBlock {
                    content: node.content.clone(),
                    language: language.clone(),
                    line: node.line,
                    is_inline: *is_inline,
                });
            }
        });
        blocks
    }

    /// True if the content mentions endpoints, request/response pairs,
    /// status codes or an API reference.
    pub fn has_api_structure(&self, ast: &MarkdownAst) -> bool {
        let text = joined_content(ast);
        API_STRUCTURE.iter().any(|re| re.is_match(&text))
    }

    /// True if any heading looks like a tutorial section
    /// (installation, configuration, getting started, examples, steps).
    pub fn has_tutorial_structure(&self, ast: &MarkdownAst) -> bool {
        ast.nodes()
            .iter()
            .filter(|n| n.is_heading())
            .map(|n| n.content.to_lowercase())
            .any(|text| TUTORIAL_STRUCTURE.iter().any(|re| re.is_match(&text)))
    }

    /// True if at least two note-like traits are present.
    pub fn has_note_structure(&self, ast: &MarkdownAst) -> bool {
        let nodes = ast.nodes();
        let traits = [
            nodes.iter().any(|n| n.kind == NodeKind::Blockquote),
            nodes.iter().any(|n| n.kind == NodeKind::BulletList),
            nodes
                .iter()
                .any(|n| n.content.contains("重要") || n.content.contains("注意")),
            nodes.iter().filter(|n| n.is_heading()).count() > 2,
        ];
        traits.iter().filter(|&&t| t).count() >= 2
    }
}

fn joined_content(ast: &MarkdownAst) -> String {
    ast.nodes()
        .iter()
        .map(|n| n.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn score(indicators: &[Regex], text: &str) -> usize {
    indicators.iter().map(|re| re.find_iter(text).count()).sum()
}

fn attach(node: HeadingNode, stack: &mut [HeadingNode], roots: &mut Vec<HeadingNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn block_type(node: &MarkdownNode) -> BlockType {
    match node.kind {
        NodeKind::Heading { .. } => BlockType::Heading,
        NodeKind::Paragraph => BlockType::Paragraph,
        NodeKind::BulletList | NodeKind::OrderedList | NodeKind::ListItem { .. } => BlockType::List,
        NodeKind::CodeBlock { .. } => BlockType::Code,
        NodeKind::Blockquote => BlockType::Blockquote,
        NodeKind::Table { .. } => BlockType::Table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MarkdownParser;

    fn analyze(text: &str) -> ContentAnalysis {
        let ast = MarkdownParser::new().parse(text).unwrap();
        ContentAnalyzer::new().analyze(&ast).unwrap()
    }

    fn headings(levels: &[u8]) -> MarkdownAst {
        let mut ast = MarkdownAst::new();
        for (line, level) in levels.iter().enumerate() {
            ast.add_node(MarkdownNode::heading(*level, format!("h{line}"), line));
        }
        ast
    }

    #[test]
    fn test_nesting_jump_detected() {
        let analyzer = ContentAnalyzer::new();
        let structure = analyzer.analyze_headings(&headings(&[1, 2, 4])).unwrap();
        assert!(!structure.has_proper_nesting);
        assert_eq!(structure.levels, vec![1, 2, 4]);
    }

    #[test]
    fn test_nesting_with_step_back_is_proper() {
        let analyzer = ContentAnalyzer::new();
        let structure = analyzer.analyze_headings(&headings(&[1, 2, 3, 2])).unwrap();
        assert!(structure.has_proper_nesting);
        assert_eq!(structure.levels, vec![1, 2, 3]);
    }

    #[test]
    fn test_heading_hierarchy_shape() {
        let analyzer = ContentAnalyzer::new();
        let structure = analyzer.analyze_headings(&headings(&[1, 2, 3, 2, 1])).unwrap();
        let roots = &structure.hierarchy;
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].children.len(), 2);
        assert_eq!(roots[0].children[0].text, "h1");
        assert_eq!(roots[0].children[0].children[0].text, "h2");
        assert_eq!(roots[0].children[1].text, "h3");
        assert_eq!(roots[1].text, "h4");
    }

    #[test]
    fn test_invalid_heading_level_is_analysis_error() {
        let result = ContentAnalyzer::new().analyze(&headings(&[1, 7]));
        assert!(matches!(result, Err(Error::Analysis(_))));
    }

    #[test]
    fn test_all_zero_scores_is_general() {
        let analysis = analyze("# Garden\n\nTomatoes like sun.\n");
        assert_eq!(analysis.document_type, DocumentType::General);
    }

    #[test]
    fn test_api_document_detected() {
        let analysis = analyze(
            "# Users API\n\nSend a GET request to the endpoint.\n\nThe response is JSON.\n",
        );
        assert_eq!(analysis.document_type, DocumentType::ApiDoc);
    }

    #[test]
    fn test_note_document_detected() {
        let analysis = analyze("# 学习笔记\n\n重点: 总结心得\n");
        assert_eq!(analysis.document_type, DocumentType::Note);
    }

    #[test]
    fn test_tie_prefers_earlier_family() {
        // one api match ("rest"), one tutorial match ("tutorial")
        let analysis = analyze("rest tutorial\n");
        assert_eq!(analysis.document_type, DocumentType::ApiDoc);
    }

    #[test]
    fn test_override_bypasses_detection() {
        let ast = MarkdownParser::new().parse("Send a GET request\n").unwrap();
        let analysis = ContentAnalyzer::new()
            .with_document_type_override(Some(DocumentType::Note))
            .analyze(&ast)
            .unwrap();
        assert_eq!(analysis.document_type, DocumentType::Note);
    }

    #[test]
    fn test_list_structure_buckets_and_nesting() {
        let analysis = analyze("- a\n- b\n  1. x\n  2. y\n");
        let lists = &analysis.list_structure;
        assert_eq!(lists.unordered.len(), 2);
        assert_eq!(lists.ordered.len(), 2);
        assert!(lists.nested);
        assert!(lists.consistent);
    }

    #[test]
    fn test_marker_consistency() {
        let analysis = analyze("- a\n\ntext\n\n* b\n");
        assert!(!analysis.list_structure.consistent);

        let analysis = analyze("1. a\n2. b\n\ntext\n\n7. c\n");
        assert!(analysis.list_structure.consistent);

        let analysis = analyze("1. a\n\ntext\n\n1) b\n");
        assert!(!analysis.list_structure.consistent);
    }

    #[test]
    fn test_non_item_list_child_is_analysis_error() {
        let mut ast = MarkdownAst::new();
        ast.add_node(MarkdownNode::list(
            false,
            vec![MarkdownNode::paragraph("stray", 0)],
            0,
        ));
        let result = ContentAnalyzer::new().analyze(&ast);
        assert!(matches!(result, Err(Error::Analysis(_))));
    }

    #[test]
    fn test_blocks_and_code_blocks() {
        let analysis = analyze("# T\n\n```py\nprint(1)\n```\n\n> q\n\n| a |\n|---|\n| b |\n");
        let types: Vec<BlockType> = analysis.content_blocks.iter().map(|b| b.block_type).collect();
        assert_eq!(
            types,
            vec![
                BlockType::Heading,
                BlockType::Code,
                BlockType::Blockquote,
                BlockType::Table
            ]
        );
        assert_eq!(analysis.code_blocks.len(), 1);
        assert_eq!(analysis.code_blocks[0].language.as_deref(), Some("py"));
        assert_eq!(analysis.code_blocks[0].line, 2);
    }

    #[test]
    fn test_auxiliary_detectors() {
        let analyzer = ContentAnalyzer::new();
        let parser = MarkdownParser::new();

        let api = parser.parse("## Endpoints\n\nList of routes.\n").unwrap();
        assert!(analyzer.has_api_structure(&api));
        assert!(!analyzer.has_tutorial_structure(&api));

        let tutorial = parser.parse("# Guide\n\n## Installation\n\nRun it.\n").unwrap();
        assert!(analyzer.has_tutorial_structure(&tutorial));

        let note = parser.parse("> quote\n\n- point\n").unwrap();
        assert!(analyzer.has_note_structure(&note));
        assert!(!analyzer.has_note_structure(&tutorial));
    }
}
