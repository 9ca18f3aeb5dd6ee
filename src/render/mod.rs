//! Markdown rendering for formatted documents.

mod markdown;

pub use markdown::{collapse_blank_lines, MarkdownRenderer};

use crate::error::Result;
use crate::model::{MarkdownAst, MarkdownNode};

/// Renders an AST to markdown, honoring spacing hints.
pub fn render_ast(ast: &MarkdownAst) -> Result<String> {
    MarkdownRenderer::new().render(ast)
}

/// Renders a single node without spacing.
pub fn render_node(node: &MarkdownNode) -> String {
    let mut output = String::new();
    MarkdownRenderer::new().render_node(node, &mut output);
    output
}
