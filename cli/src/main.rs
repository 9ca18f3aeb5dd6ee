//! smartmd CLI - content-aware Markdown formatter
//!
//! Formats, analyzes and checks Markdown files from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use smartmd::{DocumentType, FormattingConfig, SmartMarkdownFormatter};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Content-aware Markdown formatting
#[derive(Parser)]
#[command(
    name = "smartmd",
    version,
    about = "Format Markdown documents with content-aware rules",
    long_about = "smartmd - structure-aware Markdown formatter.\n\n\
                  Detects whether a document is an API reference, tutorial, note or\n\
                  general text and normalizes headings, lists, code blocks, tables\n\
                  and blockquotes accordingly.\n\n\
                  Usage:\n  \
                  smartmd format <file>           Print the formatted document\n  \
                  smartmd format <file> -i        Rewrite the file in place\n  \
                  smartmd check <files>...        Exit 1 if any file would change\n\n\
                  Use '-' as the file name to read from stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print pipeline diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a document
    #[command(visible_alias = "fmt")]
    Format {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Rewrite the input file
        #[arg(short, long)]
        in_place: bool,

        /// Run only the heading, list and code block rules
        #[arg(long)]
        quick: bool,

        #[command(flatten)]
        options: ConfigArgs,
    },

    /// Show the content analysis as JSON
    Analyze {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        options: ConfigArgs,
    },

    /// Show what formatting would change without writing anything
    Preview {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        #[command(flatten)]
        options: ConfigArgs,
    },

    /// Check that a formatted document preserved its original
    Validate {
        /// Original document
        original: PathBuf,

        /// Formatted document
        formatted: PathBuf,
    },

    /// Report files whose formatting would change
    Check {
        /// Files to check
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        options: ConfigArgs,
    },
}

/// Options shared by the formatting commands.
#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force the document type instead of detecting it
    #[arg(long)]
    doc_type: Option<DocType>,

    /// Run only the named rules (comma separated)
    #[arg(long, value_delimiter = ',')]
    rules: Vec<String>,

    /// Keep list markers and table layout as written
    #[arg(long)]
    preserve_structure: bool,

    /// Skip the code block rule
    #[arg(long)]
    no_code: bool,
}

impl ConfigArgs {
    fn build(&self) -> smartmd::Result<FormattingConfig> {
        let mut config = match &self.config {
            Some(path) => FormattingConfig::from_json_file(path)?,
            None => FormattingConfig::default(),
        };
        if let Some(doc_type) = self.doc_type.clone() {
            config = config.with_document_type(doc_type.into());
        }
        if !self.rules.is_empty() {
            config = config.with_custom_rules(self.rules.iter().map(|r| r.trim()));
        }
        if self.preserve_structure {
            config = config.preserving_structure();
        }
        if self.no_code {
            config = config.without_code_formatting();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Document type override
#[derive(Clone, ValueEnum)]
enum DocType {
    /// API reference
    Api,
    /// Step-by-step tutorial
    Tutorial,
    /// Notes and reminders
    Note,
    /// Anything else
    General,
}

impl From<DocType> for DocumentType {
    fn from(doc_type: DocType) -> Self {
        match doc_type {
            DocType::Api => DocumentType::ApiDoc,
            DocType::Tutorial => DocumentType::Tutorial,
            DocType::Note => DocumentType::Note,
            DocType::General => DocumentType::General,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Runs a command. `Ok(false)` means a check did not pass.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Format {
            input,
            output,
            in_place,
            quick,
            options,
        } => {
            let config = options.build()?;
            if in_place {
                if is_stdin(&input) {
                    return Err("--in-place needs a file path".into());
                }
                let changed = smartmd::format_file_in_place(&input, &config)?;
                let status = if changed { "Formatted" } else { "Unchanged" };
                println!("{} {}: {}", "✓".green().bold(), status, input.display());
                return Ok(true);
            }

            let text = read_input(&input)?;
            let formatter = SmartMarkdownFormatter::new(config);
            let formatted = if quick {
                formatter.quick_format(&text)
            } else {
                formatter.format_document(&text)?.formatted
            };

            write_output(output.as_ref(), &formatted)?;
            if let Some(path) = output {
                println!("{} Formatted to: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Analyze {
            input,
            compact,
            options,
        } => {
            let text = read_input(&input)?;
            let formatter = SmartMarkdownFormatter::new(options.build()?);
            let analysis = formatter.analyze_document(&text)?;
            let json = if compact {
                serde_json::to_string(&analysis)?
            } else {
                serde_json::to_string_pretty(&analysis)?
            };
            write_output(None, &json)?;
        }

        Commands::Preview { input, options } => {
            let text = read_input(&input)?;
            let formatter = SmartMarkdownFormatter::new(options.build()?);
            let preview = formatter.preview_formatting(&text)?;

            println!("{}", "Formatting Preview".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Document type".bold(), preview.analysis.document_type);
            println!("{}: {}", "Headings".bold(), preview.analysis.heading_count());
            println!("{}: {}", "Code blocks".bold(), preview.analysis.code_blocks.len());
            println!("\n{}", "Changes".cyan().bold());
            println!("{}", "─".repeat(40));
            for change in &preview.changes {
                println!("  {} {}", "•".blue(), change);
            }
        }

        Commands::Validate {
            original,
            formatted,
        } => {
            let original = read_input(&original)?;
            let formatted = read_input(&formatted)?;
            let report = SmartMarkdownFormatter::default().validate_formatting(&original, &formatted);

            for error in &report.errors {
                println!("  {} {}", "✗".red().bold(), error);
            }
            for warning in &report.warnings {
                println!("  {} {}", "!".yellow().bold(), warning);
            }
            if report.is_valid {
                println!("{} Formatting preserved the document", "✓".green().bold());
            }
            return Ok(report.is_valid);
        }

        Commands::Check { inputs, options } => {
            let formatter = SmartMarkdownFormatter::new(options.build()?);
            let pb = create_progress(inputs.len() as u64);

            let mut pending = Vec::new();
            for input in &inputs {
                pb.set_message(input.display().to_string());
                let text = read_input(input)?;
                let result = formatter.format_document(&text)?;
                if result.formatted != text.trim_end_matches('\n') {
                    pending.push(input);
                }
                pb.inc(1);
            }
            pb.finish_and_clear();

            for input in &pending {
                println!("  {} {}", "✗".red().bold(), input.display());
            }
            if pending.is_empty() {
                println!("{} {} files already formatted", "✓".green().bold(), inputs.len());
                return Ok(true);
            }
            println!(
                "{} {} of {} files would be reformatted",
                "!".yellow().bold(),
                pending.len(),
                inputs.len()
            );
            return Ok(false);
        }
    }

    Ok(true)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> io::Result<String> {
    if is_stdin(path) {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(path)
    }
}

fn create_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, format!("{content}\n"))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_args_build() {
        let cli = Cli::try_parse_from([
            "smartmd",
            "format",
            "doc.md",
            "--doc-type",
            "note",
            "--rules",
            "HeadingSpacingRule,ListFormattingRule",
            "--no-code",
        ])
        .unwrap();
        let Commands::Format { options, .. } = cli.command else {
            panic!("expected format command");
        };
        let config = options.build().unwrap();
        assert_eq!(config.document_type_override, Some(DocumentType::Note));
        assert_eq!(config.custom_rules, vec!["HeadingSpacingRule", "ListFormattingRule"]);
        assert!(!config.enable_code_formatting);
    }

    #[test]
    fn test_analyze_uses_config_args() {
        let cli = Cli::try_parse_from(["smartmd", "analyze", "doc.md", "--doc-type", "api"]).unwrap();
        let Commands::Analyze { options, .. } = cli.command else {
            panic!("expected analyze command");
        };
        let formatter = SmartMarkdownFormatter::new(options.build().unwrap());
        let analysis = formatter.analyze_document("# Steps\n\n1. one\n2. two\n").unwrap();
        assert_eq!(analysis.document_type, DocumentType::ApiDoc);
    }

    #[test]
    fn test_in_place_conflicts_with_output() {
        let result = Cli::try_parse_from(["smartmd", "format", "a.md", "-i", "-o", "b.md"]);
        assert!(result.is_err());
    }
}
