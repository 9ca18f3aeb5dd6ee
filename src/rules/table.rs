use super::FormattingRule;
use crate::config::FormattingConfig;
use crate::error::Result;
use crate::model::{ColumnAlignment, ContentAnalysis, MarkdownAst, NodeKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_DELIMITER_CELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:?-+:?$").unwrap());

/// Splits a table line on unescaped pipes.
///
/// The empty cells produced by leading and trailing pipes are dropped;
/// interior empty cells are kept.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in line.chars() {
        match ch {
            '|' if !escaped => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
        escaped = ch == '\\' && !escaped;
    }
    cells.push(current);

    let mut cells: Vec<String> = cells.into_iter().map(|c| c.trim().to_string()).collect();
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    cells
}

fn is_delimiter_row(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|c| RE_DELIMITER_CELL.is_match(c))
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{:<width$}", cell, width = *width)
        })
        .collect();
    format!("| {} |", padded.join(" | "))
}

/// Re-aligns `|`-delimited table text into padded columns.
///
/// Only the delimiter row right below the header is replaced; body rows
/// made of dashes are data. Columns are as wide as their widest cell, or
/// the narrowest delimiter their alignment allows.
///
/// Returns `None` when fewer than two content rows are present.
pub(crate) fn align_table(content: &str, alignments: &[ColumnAlignment]) -> Option<String> {
    let mut rows: Vec<Vec<String>> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(split_cells)
        .collect();

    if rows.len() > 1 && is_delimiter_row(&rows[1]) {
        rows.remove(1);
    }
    if rows.len() < 2 {
        return None;
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths: Vec<usize> = (0..columns)
        .map(|i| alignments.get(i).copied().unwrap_or_default().min_width())
        .collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let delimiters: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let alignment = alignments.get(i).copied().unwrap_or_default();
            alignment.delimiter(*width)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&rows[0], &widths));
    lines.push(format!("| {} |", delimiters.join(" | ")));
    lines.extend(rows[1..].iter().map(|row| format_row(row, &widths)));
    Some(lines.join("\n"))
}

/// Pads table columns to a common width and rebuilds the delimiter row.
#[derive(Debug, Clone, Copy)]
pub struct TableFormattingRule {
    enabled: bool,
}

impl Default for TableFormattingRule {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TableFormattingRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disabled when the configuration preserves the original structure.
    pub fn from_config(config: &FormattingConfig) -> Self {
        Self {
            enabled: !config.preserve_original_structure,
        }
    }
}

impl FormattingRule for TableFormattingRule {
    fn name(&self) -> &str {
        "TableFormattingRule"
    }

    fn priority(&self) -> i32 {
        70
    }

    fn can_apply(&self, _analysis: &ContentAnalysis) -> bool {
        self.enabled
    }

    fn apply(&self, ast: &mut MarkdownAst, _analysis: &ContentAnalysis) -> Result<()> {
        for node in ast.nodes_mut() {
            let NodeKind::Table { alignments } = &node.kind else {
                continue;
            };

            node.spacing.before = 1;
            node.spacing.after = 1;
            if let Some(aligned) = align_table(&node.content, alignments) {
                node.content = aligned;
            }
        }
        Ok(())
    }
}
