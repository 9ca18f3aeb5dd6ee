//! High-level formatter façade.
//!
//! [`SmartMarkdownFormatter`] runs parse → analyze → rules → serialize and
//! offers quick formatting, analysis only, previews and validation. Its only
//! state is the current [`FormattingConfig`] and any registered custom rules;
//! every call builds a fresh AST.

use crate::analyzer::ContentAnalyzer;
use crate::config::FormattingConfig;
use crate::error::Result;
use crate::model::ContentAnalysis;
use crate::parser::MarkdownParser;
use crate::report::{detect_changes, FormatPreview, FormatResult, ValidationReport};
use crate::rules::{FormattingRule, RuleBasedFormatter};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Markdown formatter with content-aware rules.
///
/// # Example
///
/// ```
/// use smartmd::{FormattingConfig, SmartMarkdownFormatter};
///
/// let formatter = SmartMarkdownFormatter::new(FormattingConfig::default());
/// let result = formatter.format_document("# Title\ntext\n")?;
/// assert_eq!(result.formatted, "# Title\n\ntext");
/// # Ok::<(), smartmd::Error>(())
/// ```
#[derive(Clone)]
pub struct SmartMarkdownFormatter {
    config: FormattingConfig,
    parser: MarkdownParser,
    analyzer: ContentAnalyzer,
    engine: RuleBasedFormatter,
    custom_rules: Vec<Arc<dyn FormattingRule>>,
}

impl Default for SmartMarkdownFormatter {
    fn default() -> Self {
        Self::new(FormattingConfig::default())
    }
}

impl SmartMarkdownFormatter {
    /// Creates a formatter for the given configuration.
    pub fn new(config: FormattingConfig) -> Self {
        let mut formatter = Self {
            parser: MarkdownParser::new(),
            analyzer: ContentAnalyzer::new(),
            engine: RuleBasedFormatter::new(&config),
            custom_rules: Vec::new(),
            config,
        };
        formatter.rebuild();
        formatter
    }

    /// Current configuration.
    pub fn config(&self) -> &FormattingConfig {
        &self.config
    }

    /// Rule names in execution order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.engine.rule_names()
    }

    /// Adds a rule that survives configuration changes.
    pub fn register_rule(&mut self, rule: Arc<dyn FormattingRule>) {
        self.custom_rules.push(Arc::clone(&rule));
        self.engine.add_rule(rule);
    }

    /// Modifies the configuration and re-derives the rule set.
    pub fn update_config<F>(&mut self, update: F)
    where
        F: FnOnce(&mut FormattingConfig),
    {
        update(&mut self.config);
        self.rebuild();
    }

    /// Replaces the configuration and re-derives the rule set.
    pub fn set_config(&mut self, config: FormattingConfig) {
        self.config = config;
        self.rebuild();
    }

    /// Restores the default configuration.
    pub fn reset_config(&mut self) {
        self.set_config(FormattingConfig::default());
    }

    fn rebuild(&mut self) {
        self.parser = MarkdownParser::new().with_max_input_len(self.config.max_input_len);
        self.analyzer =
            ContentAnalyzer::new().with_document_type_override(self.config.document_type_override);
        self.engine = RuleBasedFormatter::new(&self.config);
        for rule in &self.custom_rules {
            self.engine.add_rule(Arc::clone(rule));
        }
    }

    /// Runs the full pipeline.
    ///
    /// Fails without partial output if any stage fails.
    pub fn format_document(&self, text: &str) -> Result<FormatResult> {
        self.run(text, &self.engine)
    }

    /// Formats with the heading, list and code block rules only.
    ///
    /// Never fails: on any error the input is returned unchanged.
    pub fn quick_format(&self, text: &str) -> String {
        let engine = RuleBasedFormatter::with_rules(&self.config.quick(), self.engine.rules().to_vec());
        match self.run(text, &engine) {
            Ok(result) => result.formatted,
            Err(err) => {
                log::warn!("quick format failed, returning input unchanged: {err}");
                text.to_string()
            }
        }
    }

    /// Parses and analyzes without applying rules.
    pub fn analyze_document(&self, text: &str) -> Result<ContentAnalysis> {
        let ast = self.parser.parse(text)?;
        self.analyzer.analyze(&ast)
    }

    /// Formats and summarizes the cosmetic changes.
    pub fn preview_formatting(&self, text: &str) -> Result<FormatPreview> {
        let result = self.format_document(text)?;
        let changes = detect_changes(text, &result.formatted);
        Ok(FormatPreview {
            original: text.to_string(),
            formatted: result.formatted,
            changes,
            analysis: result.analysis,
        })
    }

    /// Checks that `formatted` still parses and kept the original's words.
    pub fn validate_formatting(&self, original: &str, formatted: &str) -> ValidationReport {
        ValidationReport::check(&self.parser, original, formatted)
    }

    fn run(&self, text: &str, engine: &RuleBasedFormatter) -> Result<FormatResult> {
        let start = Instant::now();

        let ast = self.parser.parse(text)?;
        log::debug!("parse: {} nodes in {:?}", ast.len(), start.elapsed());

        let analysis = self.analyzer.analyze(&ast)?;
        log::debug!("analyze: {} in {:?}", analysis.document_type, start.elapsed());

        let formatted = engine.format(ast, &analysis)?;
        let processing_time = start.elapsed();
        log::debug!("format: {} chars in {:?}", formatted.len(), processing_time);

        Ok(FormatResult {
            original_length: text.chars().count(),
            formatted_length: formatted.chars().count(),
            formatted,
            analysis,
            processing_time,
        })
    }
}

impl fmt::Debug for SmartMarkdownFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartMarkdownFormatter")
            .field("config", &self.config)
            .field("rules", &self.engine.rule_names())
            .finish()
    }
}
