use crate::config::ScanConfig;
use crate::engine::scanner::{FoldScanner, ScanError};
use crate::models::{FoldKind, FoldRange, FoldRegion, RenderedFile};
use ropey::Rope;
use std::cmp::Reverse;
use std::fs;
use std::path::Path;
use termcolor::Color;

/// Renders a source document with its outermost folds collapsed into
/// placeholders.
pub struct Renderer {
    config: ScanConfig,
}

impl Renderer {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Render with folds applied, returning plain text
    pub fn render(&self, source: &str, folds: &[FoldRegion]) -> String {
        self.render_inner(source, folds, false)
    }

    /// Render with ANSI-colored fold placeholders
    pub fn render_ansi(&self, source: &str, folds: &[FoldRegion]) -> String {
        self.render_inner(source, folds, true)
    }

    fn render_inner(&self, source: &str, folds: &[FoldRegion], ansi: bool) -> String {
        if folds.is_empty() {
            return source.to_string();
        }

        let rope = Rope::from_str(source);
        let mut result = String::with_capacity(source.len());
        let mut current = 0usize;

        for fold in self.collapsed(folds) {
            let Some((start, end)) = range_bytes(&rope, &fold.range) else {
                continue;
            };
            if start < current {
                continue;
            }
            if start > current {
                let a = rope.byte_to_char(current);
                let b = rope.byte_to_char(start);
                result.push_str(&rope.slice(a..b).to_string());
            }
            result.push_str(&self.placeholder(fold, ansi));
            current = end;
        }

        if current < source.len() {
            let a = rope.byte_to_char(current);
            result.push_str(&rope.slice(a..).to_string());
        }

        result
    }

    /// The folds that actually collapse: multi-row, outermost, in document
    /// order. Nested folds and duplicate ranges (a start and an end widget
    /// of the same block) drop out.
    pub fn collapsed<'a>(&self, folds: &'a [FoldRegion]) -> Vec<&'a FoldRegion> {
        let mut sorted: Vec<&FoldRegion> = folds.iter().filter(|f| f.range.is_multi_row()).collect();
        sorted.sort_by_key(|f| {
            (
                f.range.start_row,
                f.range.start_column,
                Reverse((f.range.end_row, f.range.end_column)),
            )
        });

        let mut result: Vec<&FoldRegion> = Vec::new();
        for fold in sorted {
            let nested = result.iter().any(|f| f.range.contains(&fold.range));
            if !nested {
                result.retain(|f| !fold.range.contains(&f.range));
                result.push(fold);
            }
        }
        result.sort_by_key(|f| (f.range.start_row, f.range.start_column));
        result
    }

    fn placeholder(&self, fold: &FoldRegion, ansi: bool) -> String {
        let hidden = fold.line_count.saturating_sub(1);
        let text = format!("/* ... ({} lines) */", hidden);
        if !ansi {
            return text;
        }

        let dim = "\x1b[2m";
        let reset = "\x1b[0m";
        let fg = match fold_color(fold.kind) {
            Color::Blue => "\x1b[34m",
            Color::Green => "\x1b[32m",
            Color::Magenta => "\x1b[35m",
            _ => "\x1b[90m",
        };
        format!("{}{}{}{}", dim, fg, text, reset)
    }
}

fn fold_color(kind: FoldKind) -> Color {
    match kind {
        FoldKind::Keyword => Color::Magenta,
        FoldKind::Brace => Color::Blue,
        FoldKind::Comment => Color::Green,
    }
}

/// Byte span of a row/column range, or `None` if it falls outside the
/// document.
fn range_bytes(rope: &Rope, range: &FoldRange) -> Option<(usize, usize)> {
    let start = rope.try_line_to_byte(range.start_row).ok()? + range.start_column;
    let end = rope.try_line_to_byte(range.end_row).ok()? + range.end_column;
    (start <= end && end <= rope.len_bytes()).then_some((start, end))
}

fn render_with(path: &Path, config: &ScanConfig, ansi: bool) -> Result<RenderedFile, ScanError> {
    let content = fs::read_to_string(path)?;
    let scanner = FoldScanner::new(config.clone())?;
    let folds = scanner.analyze_source(&content);

    let renderer = Renderer::new(config.clone());
    let collapsed = renderer.collapsed(&folds);
    let fold_count = collapsed.len();
    let lines_hidden: usize = collapsed
        .iter()
        .map(|f| f.line_count.saturating_sub(1))
        .sum();
    let content = if ansi {
        renderer.render_ansi(&content, &folds)
    } else {
        renderer.render(&content, &folds)
    };

    Ok(RenderedFile {
        path: path.to_path_buf(),
        content,
        fold_count,
        lines_hidden,
    })
}

/// Render a file with folds applied (convenience function)
pub fn render_file(path: &Path, config: &ScanConfig) -> Result<RenderedFile, ScanError> {
    render_with(path, config, false)
}

/// Render a file with ANSI colors (convenience function)
pub fn render_file_ansi(path: &Path, config: &ScanConfig) -> Result<RenderedFile, ScanError> {
    render_with(path, config, true)
}
