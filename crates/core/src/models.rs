use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Classification of a token produced by the tokenizer (or supplied by a host)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Reserved word (`if`, `endif`, `function`, ...)
    Keyword,
    /// Bare identifier
    Identifier,
    /// `$`-prefixed variable
    Variable,
    /// Quoted string contents, delimiters included
    String,
    /// Line or block comment
    Comment,
    /// Numeric literal
    Numeric,
    /// Operator or bracket character
    Punctuation,
    /// Region delimiter (`<?php`, `?>`, `<script ...>`)
    Tag,
    /// Anything else, including whitespace runs and raw markup
    Text,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Variable => "variable",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Numeric => "numeric",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Tag => "tag",
            TokenKind::Text => "text",
        }
    }
}

/// A single token on a row, addressable by its starting column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token classification
    pub kind: TokenKind,
    /// Verbatim source text of the token
    pub value: String,
    /// Starting column (byte offset into the line)
    pub start: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, start: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
        }
    }

    /// Column one past the last byte of the token
    pub fn end(&self) -> usize {
        self.start + self.value.len()
    }

    /// Whether the token's span contains the given column
    pub fn contains_column(&self, column: usize) -> bool {
        self.start <= column && column < self.end()
    }
}

/// Verdict of the fold widget classifier for a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldWidget {
    /// Row begins a collapsible block
    Start,
    /// Row ends a collapsible block
    End,
    /// No widget; callers cache this per row, hence a value rather than absence
    #[default]
    None,
}

impl FoldWidget {
    /// The editor-facing sentinel: `""` when no widget applies
    pub fn as_str(&self) -> &'static str {
        match self {
            FoldWidget::Start => "start",
            FoldWidget::End => "end",
            FoldWidget::None => "",
        }
    }
}

/// Which fold markers the host wants surfaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldStyle {
    /// No automatic widgets
    Manual,
    /// Mark block starts only
    #[default]
    MarkBegin,
    /// Mark both block starts and ends
    MarkBeginEnd,
}

impl FoldStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoldStyle::Manual => "manual",
            FoldStyle::MarkBegin => "markbegin",
            FoldStyle::MarkBeginEnd => "markbeginend",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(FoldStyle::Manual),
            "markbegin" => Some(FoldStyle::MarkBegin),
            "markbeginend" => Some(FoldStyle::MarkBeginEnd),
            _ => None,
        }
    }
}

/// What produced a fold range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldKind {
    /// PHP colon/`end*` keyword block
    Keyword,
    /// Brace-delimited block from the generic folder
    Brace,
    /// Block comment
    Comment,
}

impl FoldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoldKind::Keyword => "keyword",
            FoldKind::Brace => "brace",
            FoldKind::Comment => "comment",
        }
    }
}

/// The text span to collapse. Rows are 0-based, columns are byte offsets,
/// and the range is always in ascending document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldRange {
    pub start_row: usize,
    pub start_column: usize,
    pub end_row: usize,
    pub end_column: usize,
}

impl FoldRange {
    pub fn new(start_row: usize, start_column: usize, end_row: usize, end_column: usize) -> Self {
        Self {
            start_row,
            start_column,
            end_row,
            end_column,
        }
    }

    /// Number of rows the range touches
    pub fn line_count(&self) -> usize {
        self.end_row.saturating_sub(self.start_row) + 1
    }

    pub fn is_multi_row(&self) -> bool {
        self.end_row > self.start_row
    }

    /// Whether this range fully contains another
    pub fn contains(&self, other: &FoldRange) -> bool {
        (self.start_row, self.start_column) <= (other.start_row, other.start_column)
            && (other.end_row, other.end_column) <= (self.end_row, self.end_column)
    }
}

/// A foldable region discovered on one row of a scanned file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldRegion {
    /// Row hosting the widget
    pub row: usize,
    /// Widget verdict for the row
    pub widget: FoldWidget,
    /// What kind of construct produced the fold
    pub kind: FoldKind,
    /// Span to collapse
    pub range: FoldRange,
    /// Rows spanned by the range
    pub line_count: usize,
}

impl FoldRegion {
    pub fn new(row: usize, widget: FoldWidget, kind: FoldKind, range: FoldRange) -> Self {
        Self {
            row,
            widget,
            kind,
            range,
            line_count: range.line_count(),
        }
    }
}

/// A source file with its fold regions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Relative path from project root
    pub path: PathBuf,
    /// Absolute path
    pub absolute_path: PathBuf,
    /// All fold regions in this file
    pub folds: Vec<FoldRegion>,
    /// Total line count
    pub line_count: usize,
    /// Whether the file was read and tokenized successfully
    pub parsed: bool,
    /// Error message if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics about fold analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoldStats {
    pub total_files: usize,
    pub parsed_files: usize,
    pub total_lines: usize,
    pub total_folds: usize,
    pub keyword_folds: usize,
    pub brace_folds: usize,
    pub comment_folds: usize,
    pub start_widgets: usize,
    pub end_widgets: usize,
    pub foldable_lines: usize,
}

impl FoldStats {
    pub fn add_region(&mut self, region: &FoldRegion) {
        self.total_folds += 1;
        self.foldable_lines += region.line_count;
        match region.kind {
            FoldKind::Keyword => self.keyword_folds += 1,
            FoldKind::Brace => self.brace_folds += 1,
            FoldKind::Comment => self.comment_folds += 1,
        }
        match region.widget {
            FoldWidget::Start => self.start_widgets += 1,
            FoldWidget::End => self.end_widgets += 1,
            FoldWidget::None => {}
        }
    }
}

/// Scan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_duration_ms: u64,
    pub files_per_second: f64,
    pub timestamp: String,
    pub tool_version: String,
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            scan_duration_ms: 0,
            files_per_second: 0.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Aggregated fold analysis results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldMap {
    /// Project root path
    pub root: PathBuf,
    /// All source files analyzed
    pub files: Vec<SourceFile>,
    /// Fold statistics
    pub stats: FoldStats,
    /// Scan metadata
    pub metadata: ScanMetadata,
}

/// Rendered output for a single file
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
    pub fold_count: usize,
    pub lines_hidden: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_span() {
        let token = Token::new(TokenKind::Keyword, "endif", 4);
        assert_eq!(token.end(), 9);
        assert!(token.contains_column(4));
        assert!(token.contains_column(8));
        assert!(!token.contains_column(9));
    }

    #[test]
    fn test_fold_widget_sentinel() {
        assert_eq!(FoldWidget::Start.as_str(), "start");
        assert_eq!(FoldWidget::None.as_str(), "");
        assert_eq!(FoldWidget::default(), FoldWidget::None);
    }

    #[test]
    fn test_fold_range_containment() {
        let outer = FoldRange::new(0, 8, 5, 0);
        let inner = FoldRange::new(1, 10, 3, 0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(outer.line_count(), 6);
    }

    #[test]
    fn test_stats_accumulation() {
        let mut stats = FoldStats::default();
        let region = FoldRegion::new(
            0,
            FoldWidget::Start,
            FoldKind::Keyword,
            FoldRange::new(0, 8, 2, 0),
        );
        stats.add_region(&region);
        assert_eq!(stats.total_folds, 1);
        assert_eq!(stats.keyword_folds, 1);
        assert_eq!(stats.start_widgets, 1);
        assert_eq!(stats.foldable_lines, 3);
    }

    #[test]
    fn test_fold_style_parse() {
        assert_eq!(FoldStyle::parse("markbeginend"), Some(FoldStyle::MarkBeginEnd));
        assert_eq!(FoldStyle::parse("bogus"), None);
    }
}
