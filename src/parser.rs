//! Markdown parser.
//!
//! Tokenizes markdown with pulldown-cmark and reduces the flat event stream
//! into a [`MarkdownAst`] of block-level nodes. Line numbers come from the
//! tokenizer's byte offsets, so every node carries its exact source line.
//!
//! Constructs that have no node type (thematic breaks, HTML blocks, link
//! reference definitions, ...) are skipped. Parsing never fails on malformed
//! markdown; the only error is an input exceeding the configured size limit.

use crate::error::{Error, Result};
use crate::model::{ColumnAlignment, MarkdownAst, MarkdownNode};
use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use std::ops::Range;

/// Markdown to AST parser.
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    options: Options,
    max_input_len: Option<usize>,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    /// Creates a parser with GFM tables, strikethrough, task lists and
    /// typographic substitution enabled.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        Self {
            options,
            max_input_len: None,
        }
    }

    /// Sets the maximum accepted input size in bytes.
    pub fn with_max_input_len(mut self, limit: Option<usize>) -> Self {
        self.max_input_len = limit;
        self
    }

    /// Parses markdown text into a fresh AST.
    pub fn parse(&self, text: &str) -> Result<MarkdownAst> {
        if let Some(limit) = self.max_input_len {
            if text.len() > limit {
                return Err(Error::Parse(format!(
                    "input is {} bytes, limit is {} bytes",
                    text.len(),
                    limit
                )));
            }
        }

        let (front_matter, body_start) = match split_front_matter(text) {
            Some((front_matter, body_start)) => (Some(front_matter.to_string()), body_start),
            None => (None, 0),
        };

        let body = &text[body_start..];
        let tokens = Parser::new_ext(body, self.options)
            .into_offset_iter()
            .map(|(event, range)| (event, range.start + body_start..range.end + body_start))
            .collect();

        let reducer = Reducer {
            source: text,
            tokens,
            line_starts: line_starts(text),
        };

        let mut ast = reducer.build();
        ast.set_front_matter(front_matter);
        log::debug!("parsed {} top-level nodes", ast.len());
        Ok(ast)
    }
}

/// Splits a leading YAML front matter block off the input.
///
/// Returns the block (from the opening `---` through the closing `---` or
/// `...`) and the byte offset where the markdown body starts.
pub fn split_front_matter(text: &str) -> Option<(&str, usize)> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.trim_start_matches([' ', '\t']);
    let content = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut pos = text.len() - content.len();
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed == "---" || trimmed == "..." {
            let block_end = pos + line.trim_end_matches(['\r', '\n']).len();
            return Some((&text[..block_end], pos + line.len()));
        }
        pos += line.len();
    }

    None
}

/// Byte offsets at which each line starts.
fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// Reduces the event stream into nodes.
struct Reducer<'a> {
    source: &'a str,
    tokens: Vec<(Event<'a>, Range<usize>)>,
    line_starts: Vec<usize>,
}

impl<'a> Reducer<'a> {
    fn build(&self) -> MarkdownAst {
        let mut ast = MarkdownAst::new();
        let mut i = 0;

        while i < self.tokens.len() {
            let (event, range) = &self.tokens[i];
            let line = self.line_of(range.start);

            let node = match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    let close = self.matching_close(i);
                    let content = self.inline_text(i + 1, close);
                    Some((MarkdownNode::heading(heading_level(*level), content, line), close))
                }
                Event::Start(Tag::Paragraph) => {
                    let close = self.matching_close(i);
                    let content = self.inline_text(i + 1, close);
                    Some((MarkdownNode::paragraph(content, line), close))
                }
                Event::Start(Tag::List(first)) => {
                    let close = self.matching_close(i);
                    let mut items = Vec::new();
                    self.list_items(i, close, 0, first.is_some(), &mut items);
                    Some((MarkdownNode::list(first.is_some(), items, line), close))
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let close = self.matching_close(i);
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => Some(info.trim().to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    let content = self.code_text(i + 1, close);
                    Some((MarkdownNode::code_block(language, content, line), close))
                }
                Event::Start(Tag::BlockQuote(_)) => {
                    let close = self.matching_close(i);
                    let mut texts = Vec::new();
                    self.quote_content(i + 1, close, &mut texts);
                    let content = texts.join("\n").trim().to_string();
                    Some((MarkdownNode::blockquote(content, line), close))
                }
                Event::Start(Tag::Table(alignments)) => {
                    let close = self.matching_close(i);
                    let content = self.table_text(i + 1, close, alignments);
                    let alignments = alignments.iter().map(|a| column_alignment(*a)).collect();
                    Some((MarkdownNode::table(alignments, content, line), close))
                }
                _ => None,
            };

            match node {
                Some((node, close)) => {
                    ast.add_node(node);
                    i = close + 1;
                }
                None => i += 1,
            }
        }

        ast
    }

    /// Index of the event closing the element that starts at `start`.
    fn matching_close(&self, start: usize) -> usize {
        let mut depth = 0usize;
        for (offset, (event, _)) in self.tokens[start..].iter().enumerate() {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
            if depth == 0 {
                return start + offset;
            }
        }
        self.tokens.len().saturating_sub(1)
    }

    fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Raw inline markdown covered by `tokens[from..to]`.
    fn inline_text(&self, from: usize, to: usize) -> String {
        let span = self.tokens[from.min(to)..to]
            .iter()
            .map(|(_, range)| range.clone())
            .reduce(|a, b| a.start.min(b.start)..a.end.max(b.end));

        match span {
            Some(range) => self.span_text(self.with_leading_escape(range)),
            None => String::new(),
        }
    }

    /// Text event ranges start after a backslash escape; pull it back in.
    fn with_leading_escape(&self, range: Range<usize>) -> Range<usize> {
        let escaped = range.start > 0 && self.source.as_bytes()[range.start - 1] == b'\\';
        if escaped {
            range.start - 1..range.end
        } else {
            range
        }
    }

    /// Source slice with container prefixes removed from continuation lines.
    fn span_text(&self, range: Range<usize>) -> String {
        let raw = self.source.get(range).unwrap_or("");
        let mut lines = raw.lines();
        let mut out = String::with_capacity(raw.len());

        if let Some(first) = lines.next() {
            out.push_str(first);
        }
        for line in lines {
            out.push('\n');
            out.push_str(strip_container_prefix(line));
        }

        out.trim().to_string()
    }

    /// Index just past the inline element at `index`, if it is one.
    fn inline_extent(&self, index: usize) -> Option<usize> {
        match &self.tokens[index].0 {
            Event::Text(_)
            | Event::Code(_)
            | Event::InlineHtml(_)
            | Event::SoftBreak
            | Event::HardBreak
            | Event::FootnoteReference(_)
            | Event::TaskListMarker(_) => Some(index + 1),
            Event::Start(
                Tag::Emphasis
                | Tag::Strong
                | Tag::Strikethrough
                | Tag::Link { .. }
                | Tag::Image { .. },
            ) => Some(self.matching_close(index) + 1),
            _ => None,
        }
    }

    /// Text of a textual block (paragraph, heading, cell) or a run of bare
    /// inline events starting at `index`. Returns the text and the next index.
    fn text_block(&self, index: usize) -> Option<(String, usize)> {
        match &self.tokens[index].0 {
            Event::Start(Tag::Paragraph | Tag::Heading { .. } | Tag::TableCell) => {
                let close = self.matching_close(index);
                Some((self.inline_text(index + 1, close), close + 1))
            }
            _ => {
                let mut end = self.inline_extent(index)?;
                while end < self.tokens.len() {
                    match self.inline_extent(end) {
                        Some(next) => end = next,
                        None => break,
                    }
                }
                Some((self.inline_text(index, end), end))
            }
        }
    }

    /// Collects the items of the list spanning `start..=close`, flattening
    /// nested lists into `items` right after their parent item.
    fn list_items(
        &self,
        start: usize,
        close: usize,
        level: usize,
        ordered: bool,
        items: &mut Vec<MarkdownNode>,
    ) {
        let mut j = start + 1;
        while j < close {
            let (event, range) = &self.tokens[j];
            if !matches!(event, Event::Start(Tag::Item)) {
                j += 1;
                continue;
            }

            let item_close = self.matching_close(j);
            let mut texts = Vec::new();
            let mut nested = Vec::new();
            self.item_content(j + 1, item_close, level, &mut texts, &mut nested);

            let marker = self.source_marker(range.start, ordered);
            let content = texts.join(" ").trim().to_string();
            items.push(MarkdownNode::list_item(
                marker,
                level,
                ordered,
                content,
                self.line_of(range.start),
            ));
            items.append(&mut nested);

            j = item_close + 1;
        }
    }

    fn item_content(
        &self,
        from: usize,
        to: usize,
        level: usize,
        texts: &mut Vec<String>,
        nested: &mut Vec<MarkdownNode>,
    ) {
        let mut k = from;
        while k < to {
            match &self.tokens[k].0 {
                Event::Start(Tag::List(first)) => {
                    let close = self.matching_close(k);
                    self.list_items(k, close, level + 1, first.is_some(), nested);
                    k = close + 1;
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    // Items hold a single line of text, so code is inlined
                    let close = self.matching_close(k);
                    let code = self.code_text(k + 1, close);
                    if !code.trim().is_empty() {
                        texts.push(code);
                    }
                    k = close + 1;
                }
                _ => match self.text_block(k) {
                    Some((text, next)) => {
                        if !text.is_empty() {
                            texts.push(text);
                        }
                        k = next;
                    }
                    None => k += 1,
                },
            }
        }
    }

    fn quote_content(&self, from: usize, to: usize, texts: &mut Vec<String>) {
        let mut k = from;
        while k < to {
            if let Event::Start(Tag::CodeBlock(_)) = &self.tokens[k].0 {
                let close = self.matching_close(k);
                let code = self.code_text(k + 1, close);
                if !code.trim().is_empty() {
                    texts.push(code);
                }
                k = close + 1;
                continue;
            }

            match self.text_block(k) {
                Some((text, next)) => {
                    if !text.is_empty() {
                        texts.push(text);
                    }
                    k = next;
                }
                None => k += 1,
            }
        }
    }

    /// Literal code block text without the final line terminator.
    fn code_text(&self, from: usize, to: usize) -> String {
        let mut content = String::new();
        for (event, _) in &self.tokens[from.min(to)..to] {
            if let Event::Text(text) = event {
                content.push_str(text);
            }
        }
        if content.ends_with('\n') {
            content.pop();
            if content.ends_with('\r') {
                content.pop();
            }
        }
        content
    }

    /// Table as `|`-delimited lines: header, delimiter row, body rows.
    fn table_text(&self, from: usize, to: usize, alignments: &[Alignment]) -> String {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut k = from;

        while k < to {
            match &self.tokens[k].0 {
                Event::Start(Tag::TableHead | Tag::TableRow) => {
                    let row_close = self.matching_close(k);
                    let mut cells = Vec::new();
                    let mut c = k + 1;
                    while c < row_close {
                        if let Event::Start(Tag::TableCell) = &self.tokens[c].0 {
                            let cell_close = self.matching_close(c);
                            cells.push(self.inline_text(c + 1, cell_close));
                            c = cell_close + 1;
                        } else {
                            c += 1;
                        }
                    }
                    rows.push(cells);
                    k = row_close + 1;
                }
                _ => k += 1,
            }
        }

        let mut lines: Vec<String> = rows.iter().map(|cells| table_row(cells)).collect();
        if !lines.is_empty() {
            let delimiters: Vec<String> = alignments
                .iter()
                .map(|a| column_alignment(*a).delimiter(0))
                .collect();
            lines.insert(1, table_row(&delimiters));
        }
        lines.join("\n")
    }

    /// The list marker as written in the source, or a placeholder.
    fn source_marker(&self, offset: usize, ordered: bool) -> String {
        let rest = self
            .source
            .get(offset..)
            .unwrap_or("")
            .trim_start_matches([' ', '\t']);

        if ordered {
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            match rest[digits..].chars().next() {
                Some(delim @ ('.' | ')')) if digits > 0 => format!("{}{}", &rest[..digits], delim),
                _ => "1.".to_string(),
            }
        } else {
            match rest.chars().next() {
                Some(bullet @ ('-' | '*' | '+')) => bullet.to_string(),
                _ => "-".to_string(),
            }
        }
    }
}

fn strip_container_prefix(line: &str) -> &str {
    let mut rest = line.trim_start();
    while let Some(stripped) = rest.strip_prefix('>') {
        rest = stripped.trim_start();
    }
    rest
}

fn table_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<&str> = cells.iter().map(|c| c.as_ref()).collect();
    format!("| {} |", cells.join(" | "))
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn column_alignment(alignment: Alignment) -> ColumnAlignment {
    match alignment {
        Alignment::None => ColumnAlignment::None,
        Alignment::Left => ColumnAlignment::Left,
        Alignment::Center => ColumnAlignment::Center,
        Alignment::Right => ColumnAlignment::Right,
    }
}
