//! Markdown serializer for the formatted AST.

use crate::error::{Error, Result};
use crate::model::{MarkdownAst, MarkdownNode, NodeKind};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Shortest code fence.
const MIN_FENCE_LEN: usize = 3;

/// Ordered list marker: digits, then `.` or `)`, then whitespace or end.
static RE_ORDERED_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,9}[.)](?:\s|$)").unwrap());

/// Line starts that open a block when they begin a line: bullets, ATX
/// headings, quotes, table pipes, thematic breaks and setext underlines,
/// fences, block-level HTML and link reference definitions.
static RE_BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[-+*](?:\s|$)|#{1,6}(?:\s|$)|[>|]|[-=_*](?:[ \t]*[-=_*])*[ \t]*$|```|~~~",
        r"|<!--|</?(?i:div|p|pre|table|ul|ol|li|h[1-6]|blockquote|section|details|script|style)\b",
        r"|\[[^\]]*\]:)",
    ))
    .unwrap()
});

/// Serializes an AST back to markdown, honoring spacing hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders the whole document.
    ///
    /// Between two nodes the renderer emits the previous node's `after` plus
    /// the next node's `before` blank lines, at least one. Blank line runs
    /// outside code fences are then collapsed to one and the result trimmed.
    /// Front matter is emitted verbatim ahead of the body.
    pub fn render(&self, ast: &MarkdownAst) -> Result<String> {
        let mut output = String::new();
        let nodes = ast.nodes();
        for (index, node) in nodes.iter().enumerate() {
            if let NodeKind::ListItem { .. } = node.kind {
                return Err(Error::Render(format!(
                    "list item at line {} outside of a list",
                    node.line
                )));
            }

            if index > 0 {
                let blanks = (nodes[index - 1].spacing.after + node.spacing.before).max(1);
                output.push('\n');
                output.push_str(&"\n".repeat(blanks));
            }
            self.render_node(node, &mut output);
        }

        let body = collapse_blank_lines(&output).trim().to_string();
        Ok(match ast.front_matter() {
            Some(front_matter) if body.is_empty() => front_matter.to_string(),
            Some(front_matter) => format!("{front_matter}\n\n{body}"),
            None => body,
        })
    }

    /// Renders one node without surrounding spacing.
    pub fn render_node(&self, node: &MarkdownNode, output: &mut String) {
        match &node.kind {
            NodeKind::Heading { level } => {
                output.push_str(&"#".repeat(usize::from(*level)));
                if !node.content.is_empty() {
                    output.push(' ');
                    output.push_str(&node.content);
                }
            }
            NodeKind::Paragraph | NodeKind::Table { .. } => {
                output.push_str(&node.content);
            }
            NodeKind::BulletList | NodeKind::OrderedList => {
                self.render_list(node, output);
            }
            NodeKind::ListItem { marker, .. } => {
                push_item(output, 0, marker, &node.content);
            }
            NodeKind::CodeBlock { language, .. } => {
                let fence = "`".repeat(fence_len(&node.content));
                output.push_str(&fence);
                output.push_str(language.as_deref().unwrap_or(""));
                output.push('\n');
                if !node.content.is_empty() {
                    output.push_str(&node.content);
                    output.push('\n');
                }
                output.push_str(&fence);
            }
            NodeKind::Blockquote => {
                let quoted: Vec<String> = node
                    .content
                    .split('\n')
                    .map(|line| match line.trim() {
                        "" => ">".to_string(),
                        text => format!("> {}", escape_block_start(text)),
                    })
                    .collect();
                output.push_str(&quoted.join("\n"));
            }
        }
    }

    /// Each item on its own line; nested items are indented to the content
    /// column of their parent so they re-parse at the same depth.
    fn render_list(&self, list: &MarkdownNode, output: &mut String) {
        // content_columns[level] = content column of the last item at that level
        let mut content_columns: Vec<usize> = Vec::new();

        for (index, item) in list.children.iter().enumerate() {
            let NodeKind::ListItem { marker, level, .. } = &item.kind else {
                continue;
            };

            let indent = match level {
                0 => 0,
                _ => content_columns
                    .get(level - 1)
                    .or(content_columns.last())
                    .copied()
                    .unwrap_or(0),
            };

            if index > 0 {
                output.push('\n');
            }
            push_item(output, indent, marker, &item.content);

            content_columns.truncate(*level);
            content_columns.push(indent + marker.chars().count() + 1);
        }
    }
}

fn push_item(output: &mut String, indent: usize, marker: &str, content: &str) {
    let pad = " ".repeat(indent);
    output.push_str(&pad);
    output.push_str(marker);

    let continuation = " ".repeat(indent + marker.chars().count() + 1);
    for (i, line) in content.split('\n').enumerate() {
        let line = escape_block_start(line);
        if i == 0 {
            if !line.is_empty() {
                output.push(' ');
                output.push_str(&line);
            }
        } else {
            output.push('\n');
            output.push_str(&continuation);
            output.push_str(&line);
        }
    }
}

/// Backslash-escapes a line start that would re-parse as a block of its own.
///
/// Ordered markers are escaped at their delimiter (`2\.`), since a
/// backslash before a digit is literal text.
fn escape_block_start(line: &str) -> Cow<'_, str> {
    if RE_ORDERED_START.is_match(line) {
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        return Cow::Owned(format!("{}\\{}", &line[..digits], &line[digits..]));
    }
    if RE_BLOCK_START.is_match(line) {
        return Cow::Owned(format!("\\{line}"));
    }
    Cow::Borrowed(line)
}

/// Backtick fence longer than any backtick run in the content.
fn fence_len(content: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for ch in content.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    (longest + 1).max(MIN_FENCE_LEN)
}

/// Opening fence: its character and length.
fn opening_fence(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == ch).count();
    if len < MIN_FENCE_LEN {
        return None;
    }
    // Backtick fences cannot carry backticks in their info string
    if ch == '`' && line[len..].contains('`') {
        return None;
    }
    Some((ch, len))
}

fn closes_fence(line: &str, fence: (char, usize)) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= fence.1 && trimmed.chars().all(|c| c == fence.0)
}

/// Collapses runs of blank lines to a single blank line.
///
/// Lines inside fenced code blocks are left untouched.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut fence: Option<(char, usize)> = None;
    let mut previous_blank = false;

    for line in text.split('\n') {
        match fence {
            Some(open) => {
                if closes_fence(line, open) {
                    fence = None;
                }
                previous_blank = false;
            }
            None => {
                if line.trim().is_empty() {
                    if previous_blank {
                        continue;
                    }
                    previous_blank = true;
                    output.push('\n');
                    continue;
                }
                fence = opening_fence(line);
                previous_blank = false;
            }
        }
        output.push_str(line);
        output.push('\n');
    }

    output.pop();
    output
}
