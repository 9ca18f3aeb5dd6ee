use super::{normalize_whitespace, FormattingRule};
use crate::error::Result;
use crate::model::{ContentAnalysis, MarkdownAst, NodeKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_LEADING_HASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*").unwrap());

/// Cleans heading text and separates headings from their neighbours.
///
/// Level-1 headings ask for two blank lines before, other levels one; the
/// first node of the document gets none. Every heading but the last sibling
/// asks for one blank line after.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingSpacingRule;

impl FormattingRule for HeadingSpacingRule {
    fn name(&self) -> &str {
        "HeadingSpacingRule"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn apply(&self, ast: &mut MarkdownAst, _analysis: &ContentAnalysis) -> Result<()> {
        ast.walk_mut(|node, index, count| {
            let NodeKind::Heading { level } = node.kind else {
                return;
            };

            let stripped = RE_LEADING_HASHES.replace(node.content.trim_start(), "");
            node.content = normalize_whitespace(&stripped);

            node.spacing.before = match (index, level) {
                (0, _) => 0,
                (_, 1) => 2,
                _ => 1,
            };
            node.spacing.after = usize::from(index + 1 < count);
        });
        Ok(())
    }
}
