use super::FormattingRule;
use crate::error::Result;
use crate::model::{ContentAnalysis, MarkdownAst, NodeKind};

/// Strips quote markers from blockquote text and drops empty lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockquoteRule;

fn strip_quote_markers(line: &str) -> &str {
    let mut rest = line.trim();
    while let Some(stripped) = rest.strip_prefix('>') {
        rest = stripped.trim_start();
    }
    rest
}

impl FormattingRule for BlockquoteRule {
    fn name(&self) -> &str {
        "BlockquoteRule"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn apply(&self, ast: &mut MarkdownAst, _analysis: &ContentAnalysis) -> Result<()> {
        for node in ast.nodes_mut() {
            if node.kind != NodeKind::Blockquote {
                continue;
            }

            node.content = node
                .content
                .lines()
                .map(strip_quote_markers)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            node.spacing.before = 1;
            node.spacing.after = 1;
        }
        Ok(())
    }
}
