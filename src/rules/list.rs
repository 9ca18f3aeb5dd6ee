use super::{normalize_whitespace, FormattingRule};
use crate::config::FormattingConfig;
use crate::error::Result;
use crate::model::{ContentAnalysis, DocumentType, MarkdownAst, NodeKind};

/// Normalizes list markers, item text and list spacing.
///
/// Ordered items are renumbered `1.`, `2.`, ... by position within each run
/// of same-level siblings. Bullet items use `*` in notes and `-` elsewhere.
/// A list directly following a list of the same kind gets the alternate
/// glyph (`*`/`-`, or `)` for ordered lists) on its top-level items, so the
/// two stay separate lists when re-parsed.
#[derive(Debug, Clone, Copy)]
pub struct ListFormattingRule {
    rewrite_markers: bool,
}

impl Default for ListFormattingRule {
    fn default() -> Self {
        Self {
            rewrite_markers: true,
        }
    }
}

impl ListFormattingRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the source markers when the configuration preserves structure.
    pub fn from_config(config: &FormattingConfig) -> Self {
        Self {
            rewrite_markers: !config.preserve_original_structure,
        }
    }
}

fn bullet_for(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Note => "*",
        DocumentType::ApiDoc | DocumentType::Tutorial | DocumentType::General => "-",
    }
}

fn alternate_bullet(bullet: &str) -> &'static str {
    if bullet == "*" {
        "-"
    } else {
        "*"
    }
}

impl FormattingRule for ListFormattingRule {
    fn name(&self) -> &str {
        "ListFormattingRule"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn apply(&self, ast: &mut MarkdownAst, analysis: &ContentAnalysis) -> Result<()> {
        let bullet = bullet_for(analysis.document_type);
        // (ordered, alternate) of the list immediately before the current node
        let mut previous: Option<(bool, bool)> = None;

        for list in ast.nodes_mut() {
            if !list.is_list() {
                previous = None;
                continue;
            }
            let list_ordered = list.kind == NodeKind::OrderedList;
            let alternate = matches!(previous, Some((ordered, false)) if ordered == list_ordered);
            previous = Some((list_ordered, alternate));

            list.spacing.before = 1;
            list.spacing.after = 1;

            // counters[level] = position of the last ordered item at that level
            let mut counters: Vec<usize> = Vec::new();
            for item in &mut list.children {
                let NodeKind::ListItem {
                    marker,
                    level,
                    ordered,
                } = &mut item.kind
                else {
                    continue;
                };

                counters.resize(*level + 1, 0);
                if *ordered {
                    counters[*level] += 1;
                } else {
                    counters[*level] = 0;
                }

                if self.rewrite_markers {
                    let top_alternate = alternate && *level == 0;
                    *marker = match (*ordered, top_alternate) {
                        (true, false) => format!("{}.", counters[*level]),
                        (true, true) => format!("{})", counters[*level]),
                        (false, false) => bullet.to_string(),
                        (false, true) => alternate_bullet(bullet).to_string(),
                    };
                }
                item.content = normalize_whitespace(&item.content);
            }
            list.sync_list_content();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MarkdownNode, NodeKind};

    fn markers(ast: &MarkdownAst) -> Vec<String> {
        ast.nodes()[0]
            .children
            .iter()
            .filter_map(|c| match &c.kind {
                NodeKind::ListItem { marker, .. } => Some(marker.clone()),
                _ => None,
            })
            .collect()
    }

    fn ordered_list(markers: &[&str]) -> MarkdownAst {
        let items = markers
            .iter()
            .enumerate()
            .map(|(i, m)| MarkdownNode::list_item(*m, 0, true, format!("item {i}"), i))
            .collect();
        let mut ast = MarkdownAst::new();
        ast.add_node(MarkdownNode::list(true, items, 0));
        ast
    }

    #[test]
    fn test_ordered_markers_renumbered() {
        let mut ast = ordered_list(&["5.", "2.", "9."]);
        ListFormattingRule::new()
            .apply(&mut ast, &ContentAnalysis::empty())
            .unwrap();
        assert_eq!(markers(&ast), vec!["1.", "2.", "3."]);
        assert_eq!(ast.nodes()[0].spacing.before, 1);
        assert_eq!(ast.nodes()[0].spacing.after, 1);
    }

    #[test]
    fn test_nested_runs_numbered_independently() {
        let items = vec![
            MarkdownNode::list_item("3.", 0, true, "a", 0),
            MarkdownNode::list_item("7.", 1, true, "a.1", 1),
            MarkdownNode::list_item("8.", 1, true, "a.2", 2),
            MarkdownNode::list_item("4.", 0, true, "b", 3),
            MarkdownNode::list_item("1.", 1, true, "b.1", 4),
        ];
        let mut ast = MarkdownAst::new();
        ast.add_node(MarkdownNode::list(true, items, 0));

        ListFormattingRule::new()
            .apply(&mut ast, &ContentAnalysis::empty())
            .unwrap();
        assert_eq!(markers(&ast), vec!["1.", "1.", "2.", "2.", "1."]);
    }

    #[test]
    fn test_bullet_marker_follows_document_type() {
        let items = vec![
            MarkdownNode::list_item("+", 0, false, "  spaced   out ", 0),
            MarkdownNode::list_item("-", 0, false, "b", 1),
        ];
        let mut ast = MarkdownAst::new();
        ast.add_node(MarkdownNode::list(false, items, 0));

        let mut analysis = ContentAnalysis::empty();
        analysis.document_type = DocumentType::Note;
        ListFormattingRule::new().apply(&mut ast, &analysis).unwrap();

        assert_eq!(markers(&ast), vec!["*", "*"]);
        assert_eq!(ast.nodes()[0].content, "spaced out\nb");
    }

    #[test]
    fn test_adjacent_lists_alternate_markers() {
        let mut ast = MarkdownAst::new();
        for line in 0..3 {
            ast.add_node(MarkdownNode::list(
                false,
                vec![MarkdownNode::list_item("+", 0, false, "x", line)],
                line,
            ));
        }
        ast.add_node(ordered_list(&["4."]).into_nodes().remove(0));
        ast.add_node(ordered_list(&["4.", "5."]).into_nodes().remove(0));

        ListFormattingRule::new()
            .apply(&mut ast, &ContentAnalysis::empty())
            .unwrap();

        let first_markers: Vec<String> = ast
            .nodes()
            .iter()
            .map(|list| match &list.children[0].kind {
                NodeKind::ListItem { marker, .. } => marker.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(first_markers, vec!["-", "*", "-", "1.", "1)"]);
    }

    #[test]
    fn test_preserve_structure_keeps_markers() {
        let config = FormattingConfig::default().preserving_structure();
        let mut ast = ordered_list(&["5.", "2."]);
        ListFormattingRule::from_config(&config)
            .apply(&mut ast, &ContentAnalysis::empty())
            .unwrap();
        assert_eq!(markers(&ast), vec!["5.", "2."]);
        assert_eq!(ast.nodes()[0].spacing.before, 1);
    }
}
