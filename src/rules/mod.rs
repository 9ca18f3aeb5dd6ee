//! Rule engine.
//!
//! A [`FormattingRule`] inspects the AST together with the content analysis
//! and rewrites node content or annotates spacing hints. The
//! [`RuleBasedFormatter`] runs the registered rules in descending priority
//! (ties keep registration order) and serializes the result.
//!
//! Default rules, highest priority first:
//!
//! | Rule | Priority |
//! |------|----------|
//! | [`HeadingSpacingRule`] | 100 |
//! | [`ListFormattingRule`] | 90 |
//! | [`CodeBlockRule`] | 80 |
//! | [`TableFormattingRule`] | 70 |
//! | [`BlockquoteRule`] | 60 |

mod blockquote;
mod code_block;
mod heading;
mod list;
mod table;

pub use blockquote::BlockquoteRule;
pub use code_block::{detect_language, CodeBlockRule};
pub use heading::HeadingSpacingRule;
pub use list::ListFormattingRule;
pub use table::TableFormattingRule;

use crate::config::FormattingConfig;
use crate::error::{Error, Result};
use crate::model::{ContentAnalysis, MarkdownAst};
use crate::render;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Trims and collapses every whitespace run to one space.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// A named, prioritized transformation of the AST.
pub trait FormattingRule: Send + Sync {
    /// Unique rule name, matched against the `custom_rules` allow-list.
    fn name(&self) -> &str;

    /// Higher priorities run first.
    fn priority(&self) -> i32;

    /// Rewrites or annotates nodes in place.
    fn apply(&self, ast: &mut MarkdownAst, analysis: &ContentAnalysis) -> Result<()>;

    /// Whether the rule should run for this document.
    fn can_apply(&self, _analysis: &ContentAnalysis) -> bool {
        true
    }
}

/// The default rule set for a configuration.
pub fn default_rules(config: &FormattingConfig) -> Vec<Arc<dyn FormattingRule>> {
    vec![
        Arc::new(HeadingSpacingRule),
        Arc::new(ListFormattingRule::from_config(config)),
        Arc::new(CodeBlockRule::from_config(config)),
        Arc::new(TableFormattingRule::from_config(config)),
        Arc::new(BlockquoteRule),
    ]
}

/// Applies prioritized rules and serializes the annotated AST.
#[derive(Clone)]
pub struct RuleBasedFormatter {
    rules: Vec<Arc<dyn FormattingRule>>,
    config: FormattingConfig,
}

impl RuleBasedFormatter {
    /// Creates a formatter with the default rules for `config`.
    pub fn new(config: &FormattingConfig) -> Self {
        Self::with_rules(config, default_rules(config))
    }

    /// Creates a formatter with an explicit rule set.
    pub fn with_rules(config: &FormattingConfig, rules: Vec<Arc<dyn FormattingRule>>) -> Self {
        let mut formatter = Self {
            rules,
            config: config.clone(),
        };
        formatter.sort_rules();
        formatter
    }

    /// Registers an additional rule.
    pub fn add_rule(&mut self, rule: Arc<dyn FormattingRule>) {
        self.rules.push(rule);
        self.sort_rules();
    }

    /// Removes every rule with the given name. Returns true if one was removed.
    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.name() != name);
        self.rules.len() != before
    }

    /// Rule names in execution order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn rules(&self) -> &[Arc<dyn FormattingRule>] {
        &self.rules
    }

    pub fn config(&self) -> &FormattingConfig {
        &self.config
    }

    /// Runs the rules over `ast` without serializing.
    pub fn apply_rules(&self, ast: &mut MarkdownAst, analysis: &ContentAnalysis) -> Result<()> {
        for rule in &self.rules {
            if !self.config.allows_rule(rule.name()) {
                log::debug!("rule {} skipped: not in allow-list", rule.name());
                continue;
            }
            if !rule.can_apply(analysis) {
                log::debug!("rule {} skipped: not applicable", rule.name());
                continue;
            }

            log::debug!("applying rule {} (priority {})", rule.name(), rule.priority());
            rule.apply(ast, analysis).map_err(|err| match err {
                Error::Formatting { .. } => err,
                other => Error::rule(rule.name(), other.to_string()),
            })?;
        }
        Ok(())
    }

    /// Applies every allowed rule, then serializes the AST to markdown.
    pub fn format(&self, mut ast: MarkdownAst, analysis: &ContentAnalysis) -> Result<String> {
        self.apply_rules(&mut ast, analysis)?;
        render::render_ast(&ast)
    }

    // Stable, so equal priorities keep registration order
    fn sort_rules(&mut self) {
        self.rules
            .sort_by_key(|rule| std::cmp::Reverse(rule.priority()));
    }
}

impl fmt::Debug for RuleBasedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBasedFormatter")
            .field("rules", &self.rule_names())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ContentAnalyzer;
    use crate::model::MarkdownNode;
    use crate::parser::MarkdownParser;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        priority: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FormattingRule for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn apply(&self, _ast: &mut MarkdownAst, _analysis: &ContentAnalysis) -> Result<()> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl FormattingRule for Failing {
        fn name(&self) -> &str {
            "FailingRule"
        }

        fn priority(&self) -> i32 {
            0
        }

        fn apply(&self, _ast: &mut MarkdownAst, _analysis: &ContentAnalysis) -> Result<()> {
            Err(Error::Render("boom".into()))
        }
    }

    fn recorder(
        name: &'static str,
        priority: i32,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn FormattingRule> {
        Arc::new(Recorder {
            name,
            priority,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn test_default_rules_in_priority_order() {
        let formatter = RuleBasedFormatter::new(&FormattingConfig::default());
        assert_eq!(
            formatter.rule_names(),
            vec![
                "HeadingSpacingRule",
                "ListFormattingRule",
                "CodeBlockRule",
                "TableFormattingRule",
                "BlockquoteRule"
            ]
        );
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let config = FormattingConfig::default();
        let mut formatter = RuleBasedFormatter::with_rules(
            &config,
            vec![recorder("low", 1, &log), recorder("first", 5, &log)],
        );
        formatter.add_rule(recorder("second", 5, &log));

        let ast = MarkdownAst::new();
        formatter.format(ast, &ContentAnalysis::empty()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "low"]);
    }

    #[test]
    fn test_allow_list_restricts_rules() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let config = FormattingConfig::default().with_custom_rules(["b"]);
        let formatter = RuleBasedFormatter::with_rules(
            &config,
            vec![recorder("a", 2, &log), recorder("b", 1, &log)],
        );
        formatter
            .format(MarkdownAst::new(), &ContentAnalysis::empty())
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_remove_rule() {
        let mut formatter = RuleBasedFormatter::new(&FormattingConfig::default());
        assert!(formatter.remove_rule("TableFormattingRule"));
        assert!(!formatter.remove_rule("TableFormattingRule"));
        assert_eq!(formatter.rule_names().len(), 4);
    }

    #[test]
    fn test_rule_failure_aborts_with_rule_name() {
        let config = FormattingConfig::default();
        let mut formatter = RuleBasedFormatter::new(&config);
        formatter.add_rule(Arc::new(Failing));

        let ast = MarkdownParser::new().parse("# Title\n").unwrap();
        let analysis = ContentAnalyzer::new().analyze(&ast).unwrap();
        match formatter.format(ast, &analysis) {
            Err(Error::Formatting { rule, message }) => {
                assert_eq!(rule, "FailingRule");
                assert!(message.contains("boom"));
            }
            other => panic!("expected formatting error, got {other:?}"),
        }
    }

    #[test]
    fn test_format_serializes_annotated_ast() {
        let mut ast = MarkdownAst::new();
        ast.add_node(MarkdownNode::heading(1, "##  Title", 0));
        ast.add_node(MarkdownNode::paragraph("body", 1));
        let formatter = RuleBasedFormatter::new(&FormattingConfig::default());
        let out = formatter.format(ast, &ContentAnalysis::empty()).unwrap();
        assert_eq!(out, "# Title\n\nbody");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b\n c  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }
}
