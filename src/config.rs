//! Formatter configuration.

use crate::error::{Error, Result};
use crate::model::DocumentType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rule names used by [`crate::SmartMarkdownFormatter::quick_format`].
pub const QUICK_FORMAT_RULES: &[&str] = &["HeadingSpacingRule", "ListFormattingRule", "CodeBlockRule"];

/// Options controlling which rules run and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormattingConfig {
    /// Hint for editor hosts that format while typing. Carried, not interpreted.
    pub enable_incremental_formatting: bool,

    /// Keep list markers and table layout as written; only spacing is touched.
    pub preserve_original_structure: bool,

    /// Run the code block rule (spacing, language detection, trimming).
    pub enable_code_formatting: bool,

    /// Allow-list of rule names. Empty means every registered rule.
    pub custom_rules: Vec<String>,

    /// Forced document type, bypassing detection.
    pub document_type_override: Option<DocumentType>,

    /// Maximum accepted input size in bytes (None = unlimited).
    pub max_input_len: Option<usize>,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            enable_incremental_formatting: true,
            preserve_original_structure: false,
            enable_code_formatting: true,
            custom_rules: Vec::new(),
            document_type_override: None,
            max_input_len: None,
        }
    }
}

impl FormattingConfig {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts formatting to the named rules.
    pub fn with_custom_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Forces the document type used by the rules.
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type_override = Some(document_type);
        self
    }

    /// Disables the code block rule.
    pub fn without_code_formatting(mut self) -> Self {
        self.enable_code_formatting = false;
        self
    }

    /// Keeps list markers and tables as written.
    pub fn preserving_structure(mut self) -> Self {
        self.preserve_original_structure = true;
        self
    }

    /// Sets the maximum accepted input size in bytes.
    pub fn with_max_input_len(mut self, bytes: usize) -> Self {
        self.max_input_len = Some(bytes);
        self
    }

    /// Returns the configuration used by quick formatting.
    pub fn quick(&self) -> Self {
        let mut config = self.clone();
        config.enable_incremental_formatting = false;
        config.custom_rules = QUICK_FORMAT_RULES.iter().map(|s| s.to_string()).collect();
        config
    }

    /// Returns true if the named rule passes the allow-list.
    pub fn allows_rule(&self, name: &str) -> bool {
        self.custom_rules.is_empty() || self.custom_rules.iter().any(|r| r == name)
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Checks the configuration for values the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_input_len == Some(0) {
            return Err(Error::Config("maxInputLen must be greater than zero".into()));
        }
        if let Some(blank) = self.custom_rules.iter().find(|r| r.trim().is_empty()) {
            return Err(Error::Config(format!("empty rule name in customRules: {blank:?}")));
        }
        Ok(())
    }
}
