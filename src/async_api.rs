//! Async API for non-blocking formatting.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! smartmd = { version = "0.1", features = ["async"] }
//! ```
//!
//! Formatting is CPU-bound, so every call runs on Tokio's blocking pool.

use crate::config::FormattingConfig;
use crate::error::{Error, Result};
use crate::formatter::SmartMarkdownFormatter;
use crate::model::ContentAnalysis;
use crate::report::FormatResult;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously formats markdown text.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> smartmd::Result<()> {
/// use smartmd::FormattingConfig;
///
/// let result = smartmd::async_api::format_document("# Title\ntext".into(), FormattingConfig::default()).await?;
/// println!("{}", result.formatted);
/// # Ok(())
/// # }
/// ```
pub async fn format_document(text: String, config: FormattingConfig) -> Result<FormatResult> {
    tokio::task::spawn_blocking(move || SmartMarkdownFormatter::new(config).format_document(&text))
        .await
        .map_err(join_error)?
}

/// Asynchronous best-effort formatting. Returns the input on failure.
pub async fn quick_format(text: String, config: FormattingConfig) -> String {
    let fallback = text.clone();
    tokio::task::spawn_blocking(move || SmartMarkdownFormatter::new(config).quick_format(&text))
        .await
        .unwrap_or_else(|e| {
            log::warn!("quick format task failed: {e}");
            fallback
        })
}

/// Asynchronously analyzes markdown text.
pub async fn analyze_document(text: String) -> Result<ContentAnalysis> {
    tokio::task::spawn_blocking(move || SmartMarkdownFormatter::default().analyze_document(&text))
        .await
        .map_err(join_error)?
}

/// Asynchronously formats a markdown file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> smartmd::Result<()> {
/// use smartmd::FormattingConfig;
///
/// let result = smartmd::async_api::format_file("README.md", FormattingConfig::default()).await?;
/// tokio::fs::write("README.md", result.formatted).await?;
/// # Ok(())
/// # }
/// ```
pub async fn format_file(path: impl AsRef<Path>, config: FormattingConfig) -> Result<FormatResult> {
    let text = fs::read_to_string(path).await?;
    format_document(text, config).await
}

/// Asynchronously formats markdown read from an async reader.
pub async fn format_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    config: FormattingConfig,
) -> Result<FormatResult> {
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    format_document(text, config).await
}
