use super::FormattingRule;
use crate::config::FormattingConfig;
use crate::error::Result;
use crate::model::{ContentAnalysis, MarkdownAst, NodeKind};
use regex::Regex;
use std::sync::LazyLock;

/// Minimum number of distinct pattern hits before a language is assigned.
const MIN_LANGUAGE_MATCHES: usize = 2;

// Checked in order; the first language reaching the threshold wins
static LANGUAGE_PATTERNS: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    let table: &[(&str, &[&str])] = &[
        (
            "javascript",
            &[
                r"function\s+\w+\s*\(",
                r"const\s+\w+\s*=",
                r"=>\s*\{",
                r"require\s*\(",
                r"import\s+.*from",
            ],
        ),
        (
            "typescript",
            &[
                r"interface\s+\w+",
                r"type\s+\w+\s*=",
                r":\s*(string|number|boolean)",
                r"export\s+(interface|type|class)",
            ],
        ),
        (
            "python",
            &[
                r"def\s+\w+\s*\(",
                r"class\s+\w+",
                r"import\s+\w+",
                r"from\s+\w+\s+import",
                r#"if\s+__name__\s*==\s*['"]__main__['"]:"#,
            ],
        ),
        (
            "java",
            &[
                r"public\s+(class|interface)",
                r"private\s+\w+",
                r"System\.out\.println",
                r"@Override",
            ],
        ),
        (
            "css",
            &[
                r"\.[a-zA-Z][\w-]*\s*\{",
                r"#[a-zA-Z][\w-]*\s*\{",
                r"[a-zA-Z-]+\s*:\s*[^;]+;",
            ],
        ),
        (
            "html",
            &[r"<[a-zA-Z][^>]*>", r"</[a-zA-Z][^>]*>", r"(?i)<!DOCTYPE"],
        ),
    ];

    table
        .iter()
        .map(|(language, patterns)| {
            let compiled = patterns.iter().map(|p| Regex::new(p).unwrap()).collect();
            (*language, compiled)
        })
        .collect()
});

/// Guesses the language of a code snippet.
///
/// Returns the first language (javascript, typescript, python, java, css,
/// html) with at least two matching patterns.
pub fn detect_language(code: &str) -> Option<&'static str> {
    LANGUAGE_PATTERNS.iter().find_map(|(language, patterns)| {
        let hits = patterns.iter().filter(|re| re.is_match(code)).count();
        (hits >= MIN_LANGUAGE_MATCHES).then_some(*language)
    })
}

/// Drops whitespace-only lines at both ends, keeping interior blank lines.
fn trim_blank_lines(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(start);
    lines[start..=end].join("\n")
}

/// Spaces code blocks, fills in missing languages and trims blank edges.
#[derive(Debug, Clone, Copy)]
pub struct CodeBlockRule {
    enabled: bool,
}

impl Default for CodeBlockRule {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CodeBlockRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FormattingConfig) -> Self {
        Self {
            enabled: config.enable_code_formatting,
        }
    }
}

impl FormattingRule for CodeBlockRule {
    fn name(&self) -> &str {
        "CodeBlockRule"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn can_apply(&self, _analysis: &ContentAnalysis) -> bool {
        self.enabled
    }

    fn apply(&self, ast: &mut MarkdownAst, _analysis: &ContentAnalysis) -> Result<()> {
        for node in ast.nodes_mut() {
            let NodeKind::CodeBlock { language, .. } = &mut node.kind else {
                continue;
            };

            if language.is_none() {
                *language = detect_language(&node.content).map(str::to_string);
            }
            node.content = trim_blank_lines(&node.content);
            node.spacing.before = 1;
            node.spacing.after = 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkdownNode;

    #[test]
    fn test_detect_language() {
        assert_eq!(
            detect_language("const x = 1;\nconst f = () => {\n};"),
            Some("javascript")
        );
        assert_eq!(
            detect_language("def main():\n    pass\n\nif __name__ == '__main__':\n    main()"),
            Some("python")
        );
        assert_eq!(
            detect_language("public class App {\n  @Override\n}"),
            Some("java")
        );
        assert_eq!(
            detect_language("<!DOCTYPE html>\n<html></html>"),
            Some("html")
        );
        assert_eq!(
            detect_language("interface User { name: string }"),
            Some("typescript")
        );
    }

    #[test]
    fn test_single_match_is_not_enough() {
        assert_eq!(detect_language("const x = 1"), None);
        assert_eq!(detect_language("just some words"), None);
    }

    #[test]
    fn test_apply_detects_and_trims() {
        let mut ast = MarkdownAst::new();
        ast.add_node(MarkdownNode::code_block(
            None,
            "\n  \nimport os\nfrom sys import argv\n\nprint(argv)\n\n",
            0,
        ));
        CodeBlockRule::new()
            .apply(&mut ast, &ContentAnalysis::empty())
            .unwrap();

        let node = &ast.nodes()[0];
        assert_eq!(node.content, "import os\nfrom sys import argv\n\nprint(argv)");
        assert_eq!(
            node.kind,
            NodeKind::CodeBlock {
                language: Some("python".into()),
                is_inline: false
            }
        );
        assert_eq!((node.spacing.before, node.spacing.after), (1, 1));
    }

    #[test]
    fn test_existing_language_kept() {
        let mut ast = MarkdownAst::new();
        ast.add_node(MarkdownNode::code_block(
            Some("text".into()),
            "def f(x):\n  class A",
            0,
        ));
        CodeBlockRule::new()
            .apply(&mut ast, &ContentAnalysis::empty())
            .unwrap();
        assert_eq!(
            ast.nodes()[0].kind,
            NodeKind::CodeBlock {
                language: Some("text".into()),
                is_inline: false
            }
        );
    }

    #[test]
    fn test_disabled_by_config() {
        let config = FormattingConfig::default().without_code_formatting();
        assert!(!CodeBlockRule::from_config(&config).can_apply(&ContentAnalysis::empty()));
    }
}
