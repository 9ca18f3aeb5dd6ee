//! # smartmd
//!
//! A content-aware markdown formatter. Documents are parsed into a lightweight
//! block AST, classified by heuristics (API reference, tutorial, note or
//! general text) and re-serialized through a prioritized set of formatting
//! rules that normalize spacing, list markers, code block languages, table
//! alignment and blockquotes.
//!
//! ## Quick Start
//!
//! ```
//! use smartmd::{format_markdown, FormattingConfig};
//!
//! fn main() -> smartmd::Result<()> {
//!     let formatted = format_markdown("# Title\n5. one\n9. two\n", &FormattingConfig::default())?;
//!     assert_eq!(formatted, "# Title\n\n1. one\n2. two");
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`parser`]: markdown text to [`MarkdownAst`]
//! 2. [`analyzer`]: AST to [`ContentAnalysis`]
//! 3. [`rules`]: prioritized rewrites and spacing hints
//! 4. [`render`]: AST back to markdown
//!
//! ## Features
//!
//! - `async`: Tokio wrappers that run formatting on the blocking pool

pub mod analyzer;
pub mod config;
pub mod error;
pub mod formatter;
pub mod model;
pub mod parser;
pub mod render;
pub mod report;
pub mod rules;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use analyzer::ContentAnalyzer;
pub use config::{FormattingConfig, QUICK_FORMAT_RULES};
pub use error::{Error, Result};
pub use formatter::SmartMarkdownFormatter;
pub use model::{ContentAnalysis, DocumentType, MarkdownAst, MarkdownNode, NodeKind};
pub use parser::MarkdownParser;
pub use report::{FormatPreview, FormatResult, ValidationReport};
pub use rules::{FormattingRule, RuleBasedFormatter};

use rayon::prelude::*;
use std::path::Path;

/// Formats markdown text with the given configuration.
///
/// # Example
///
/// ```
/// use smartmd::{format_markdown, FormattingConfig};
///
/// let out = format_markdown("* a\n* b\n", &FormattingConfig::default())?;
/// assert_eq!(out, "- a\n- b");
/// # Ok::<(), smartmd::Error>(())
/// ```
pub fn format_markdown(text: &str, config: &FormattingConfig) -> Result<String> {
    let formatter = SmartMarkdownFormatter::new(config.clone());
    Ok(formatter.format_document(text)?.formatted)
}

/// Best-effort formatting with the default configuration.
///
/// Returns the input unchanged if formatting fails.
pub fn quick_format_markdown(text: &str) -> String {
    SmartMarkdownFormatter::default().quick_format(text)
}

/// Analyzes markdown text without formatting it.
pub fn analyze_markdown(text: &str) -> Result<ContentAnalysis> {
    SmartMarkdownFormatter::default().analyze_document(text)
}

/// Formats a markdown file.
///
/// # Example
///
/// ```no_run
/// use smartmd::{format_file, FormattingConfig};
///
/// let result = format_file("README.md", &FormattingConfig::default())?;
/// println!("{}", result.formatted);
/// # Ok::<(), smartmd::Error>(())
/// ```
pub fn format_file(path: impl AsRef<Path>, config: &FormattingConfig) -> Result<FormatResult> {
    let text = std::fs::read_to_string(path)?;
    SmartMarkdownFormatter::new(config.clone()).format_document(&text)
}

/// Formats a markdown file in place.
///
/// The file is rewritten (with a trailing newline) only when its content
/// changes. Returns whether it was rewritten.
pub fn format_file_in_place(path: impl AsRef<Path>, config: &FormattingConfig) -> Result<bool> {
    let path = path.as_ref();
    let original = std::fs::read_to_string(path)?;
    let result = SmartMarkdownFormatter::new(config.clone()).format_document(&original)?;

    let mut formatted = result.formatted;
    formatted.push('\n');
    if formatted == original {
        return Ok(false);
    }

    std::fs::write(path, formatted)?;
    log::debug!("rewrote {}", path.display());
    Ok(true)
}

/// Formats independent documents in parallel.
///
/// Results are returned in input order.
pub fn format_documents(texts: &[&str], config: &FormattingConfig) -> Vec<Result<FormatResult>> {
    let formatter = SmartMarkdownFormatter::new(config.clone());
    texts
        .par_iter()
        .map(|text| formatter.format_document(text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_headings_paragraph_and_list() {
        let out = format_markdown(
            "# Title\n## Sub\ncontent\n- b\n- a\n",
            &FormattingConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "# Title\n\n## Sub\n\ncontent\n\n- b\n- a");
    }

    #[test]
    fn test_ordered_list_renumbered() {
        let out = format_markdown("5. x\n2. y\n9. z\n", &FormattingConfig::default()).unwrap();
        assert_eq!(out, "1. x\n2. y\n3. z");
    }

    #[test]
    fn test_table_padding() {
        let out = format_markdown("| a | bb |\n|---|---|\n| ccc | d |\n", &FormattingConfig::default())
            .unwrap();
        assert_eq!(out, "| a   | bb |\n| --- | -- |\n| ccc | d  |");
    }

    #[test]
    fn test_blank_lines_collapsed() {
        let out = format_markdown("one\n\n\n\n\ntwo\n", &FormattingConfig::default()).unwrap();
        assert_eq!(out, "one\n\ntwo");
    }

    #[test]
    fn test_front_matter_passthrough() {
        let input = "---\ntitle: Notes\ntags: [a, b]\n---\n# Heading\ntext\n";
        let out = format_markdown(input, &FormattingConfig::default()).unwrap();
        assert_eq!(out, "---\ntitle: Notes\ntags: [a, b]\n---\n\n# Heading\n\ntext");
    }

    #[test]
    fn test_analyze_markdown() {
        let analysis = analyze_markdown("# Install\n\n```\nx\n```\n").unwrap();
        assert_eq!(analysis.code_blocks.len(), 1);
        assert_eq!(analysis.heading_structure.levels, vec![1]);
    }

    #[test]
    fn test_format_documents_keeps_order() {
        let texts = ["# A\nx", "- b\n- c", "plain"];
        let results = format_documents(&texts, &FormattingConfig::default());
        let formatted: Vec<String> = results.into_iter().map(|r| r.unwrap().formatted).collect();
        assert_eq!(formatted, vec!["# A\n\nx", "- b\n- c", "plain"]);
    }

    #[test]
    fn test_format_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Title\ntext").unwrap();

        let config = FormattingConfig::default();
        assert!(format_file_in_place(&path, &config).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Title\n\ntext\n");

        // Second run is a no-op
        assert!(!format_file_in_place(&path, &config).unwrap());

        let result = format_file(&path, &config).unwrap();
        assert_eq!(result.formatted, "# Title\n\ntext");
    }

    #[test]
    fn test_format_file_missing() {
        let result = format_file("does/not/exist.md", &FormattingConfig::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_empty_document() {
        assert_eq!(format_markdown("", &FormattingConfig::default()).unwrap(), "");
        assert_eq!(quick_format_markdown(""), "");
    }

    #[test]
    fn test_quick_format_unterminated_fence() {
        let input = "# Code\n```js\nconst a = 1;";
        let out = quick_format_markdown(input);
        assert_eq!(out, "# Code\n\n```js\nconst a = 1;\n```");
    }

    #[test]
    fn test_escaped_markers_keep_block_type() {
        let config = FormattingConfig::default();
        for input in ["\\- not a list", "\\# not a heading", "\\> not a quote"] {
            let out = format_markdown(input, &config).unwrap();
            assert_eq!(out, input);
        }
    }

    #[test]
    fn test_quoted_code_is_stable() {
        let config = FormattingConfig::default();
        let once = format_markdown("> ```\n> - item\n> # note\n> ```\n", &config).unwrap();
        assert_eq!(once, "> \\- item\n> \\# note");
        assert_eq!(format_markdown(&once, &config).unwrap(), once);
    }

    #[test]
    fn test_dash_table_rows_survive() {
        let input = "| name | note |\n|---|---|\n| a | - |\n| - | - |\n| b | ok |\n";
        let out = format_markdown(input, &FormattingConfig::default()).unwrap();
        assert_eq!(
            out,
            "| name | note |\n| ---- | ---- |\n| a    | -    |\n| -    | -    |\n| b    | ok   |"
        );
    }

    #[test]
    fn test_unicode_content() {
        let out = format_markdown("# 제목\n- 항목 하나\n- 항목 둘\n", &FormattingConfig::default())
            .unwrap();
        assert_eq!(out, "# 제목\n\n- 항목 하나\n- 항목 둘");
    }

    // ==================== Property Tests ====================

    const WORDS: &[&str] = &[
        "alpha", "bravo", "charlie", "delta", "river", "stone", "cloud", "garden", "window",
        "orange", "letter", "number", "yellow", "summer", "bridge", "castle",
    ];

    fn sentence(rng: &mut StdRng, len: usize) -> String {
        (0..len)
            .map(|_| *WORDS.choose(rng).unwrap_or(&"word"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn random_document(rng: &mut StdRng) -> String {
        let mut blocks: Vec<String> = Vec::new();

        for _ in 0..rng.gen_range(1..12) {
            let block = match rng.gen_range(0..11) {
                0 => {
                    let level = rng.gen_range(1..=6);
                    format!("{} {}", "#".repeat(level), sentence(rng, 3))
                }
                1 => {
                    let lines = rng.gen_range(1..4);
                    (0..lines)
                        .map(|_| sentence(rng, 5))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
                2 => {
                    let marker = *["-", "*", "+"].choose(rng).unwrap_or(&"-");
                    (0..rng.gen_range(1..5))
                        .map(|_| format!("{} {}", marker, sentence(rng, 3)))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
                3 => (0..rng.gen_range(1..5))
                    .map(|_| format!("{}. {}", rng.gen_range(1..20), sentence(rng, 3)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                4 => format!(
                    "```\n\n{}\n{}\n\n```",
                    sentence(rng, 3),
                    sentence(rng, 2)
                ),
                5 => format!(
                    "| {} | {} |\n|---|:---:|\n| {} | {} |",
                    sentence(rng, 1),
                    sentence(rng, 2),
                    sentence(rng, 2),
                    sentence(rng, 1)
                ),
                6 => format!("> {}\n> {}", sentence(rng, 4), sentence(rng, 3)),
                7 => {
                    let escape = *["\\- ", "\\* ", "\\# ", "\\> ", "4\\. ", "\\---"]
                        .choose(rng)
                        .unwrap_or(&"\\- ");
                    format!("{}{}", escape, sentence(rng, 3))
                }
                8 => format!(
                    "| {} | {} |\n|---|---|\n| - | - |\n| {} | - |",
                    sentence(rng, 1),
                    sentence(rng, 1),
                    sentence(rng, 2)
                ),
                9 => format!(
                    "> ```\n> - {}\n> # {}\n>     {}\n> 3. {}\n> ```",
                    sentence(rng, 2),
                    sentence(rng, 1),
                    sentence(rng, 2),
                    sentence(rng, 1)
                ),
                _ => format!("> > {}\n> {}", sentence(rng, 3), sentence(rng, 2)),
            };
            blocks.push(block);
        }

        let separator = if rng.gen_bool(0.5) { "\n\n" } else { "\n\n\n\n" };
        blocks.join(separator)
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let formatter = SmartMarkdownFormatter::default();

        for _ in 0..200 {
            let input = random_document(&mut rng);
            let once = formatter.format_document(&input).unwrap().formatted;
            let twice = formatter.format_document(&once).unwrap().formatted;
            assert_eq!(once, twice, "input:\n{input}");
        }
    }

    #[test]
    fn test_formatting_keeps_words() {
        let mut rng = StdRng::seed_from_u64(42);
        let formatter = SmartMarkdownFormatter::default();

        for _ in 0..100 {
            let input = random_document(&mut rng);
            let formatted = formatter.format_document(&input).unwrap().formatted;
            let report = formatter.validate_formatting(&input, &formatted);
            assert!(report.is_valid, "input:\n{input}");
            assert!(
                !report.warnings.iter().any(|w| w.contains("missing words")),
                "input:\n{input}\nwarnings: {:?}",
                report.warnings
            );
        }
    }
}
