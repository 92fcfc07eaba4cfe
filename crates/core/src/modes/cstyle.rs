use super::FoldMode;
use crate::models::{FoldRange, FoldStyle, FoldWidget, TokenKind};
use crate::session::Session;
use regex::Regex;

/// Generic brace/comment folder used as the fallback for constructs the
/// keyword matcher does not own: `{`/`[`/`(` blocks and `/* ... */` comments.
pub struct CstyleFoldMode {
    start_marker: Regex,
    stop_marker: Regex,
}

impl CstyleFoldMode {
    pub fn new() -> Self {
        Self {
            start_marker: Regex::new(r"([\{\[\(])[^\}\]\)]*$|^\s*(/\*)").unwrap(),
            stop_marker: Regex::new(r"^[^\[\{\(]*([\}\]\)])|^[\s\*]*(\*/)").unwrap(),
        }
    }

    /// Matching closer position for an opening bracket, scanning forward with
    /// depth counting. Brackets inside string/comment tokens do not count.
    fn opening_bracket_block(
        &self,
        session: &Session,
        open: u8,
        row: usize,
        column: usize,
    ) -> Option<FoldRange> {
        let close = match open {
            b'{' => b'}',
            b'[' => b']',
            b'(' => b')',
            _ => return None,
        };
        let mut depth = 1usize;
        let mut r = row;
        let mut c = column + 1;
        while r < session.row_count() {
            let bytes = session.line(r)?.as_bytes();
            while c < bytes.len() {
                let ch = bytes[c];
                if (ch == open || ch == close) && !self.in_literal(session, r, c) {
                    if ch == open {
                        depth += 1;
                    } else {
                        depth -= 1;
                        if depth == 0 {
                            return Some(FoldRange::new(row, column + 1, r, c));
                        }
                    }
                }
                c += 1;
            }
            r += 1;
            c = 0;
        }
        None
    }

    /// Matching opener position for a closing bracket, scanning backward.
    fn closing_bracket_block(
        &self,
        session: &Session,
        close: u8,
        row: usize,
        column: usize,
    ) -> Option<FoldRange> {
        let open = match close {
            b'}' => b'{',
            b']' => b'[',
            b')' => b'(',
            _ => return None,
        };
        let mut depth = 1usize;
        let mut r = row;
        let mut c = column;
        loop {
            let bytes = session.line(r)?.as_bytes();
            while c > 0 {
                c -= 1;
                let ch = bytes[c];
                if (ch == open || ch == close) && !self.in_literal(session, r, c) {
                    if ch == close {
                        depth += 1;
                    } else {
                        depth -= 1;
                        if depth == 0 {
                            return Some(FoldRange::new(r, c + 1, row, column));
                        }
                    }
                }
            }
            if r == 0 {
                return None;
            }
            r -= 1;
            c = session.line(r)?.len();
        }
    }

    /// Span of a block comment opened at `(row, column)` (column just past
    /// the `/*`), ending right before the closing `*/`.
    fn comment_range_forward(
        &self,
        session: &Session,
        row: usize,
        column: usize,
    ) -> Option<FoldRange> {
        let mut r = row;
        let mut from = column;
        while r < session.row_count() {
            let line = session.line(r)?;
            if let Some(idx) = line.get(from..).and_then(|s| s.find("*/")) {
                return Some(FoldRange::new(row, column, r, from + idx));
            }
            r += 1;
            from = 0;
        }
        None
    }

    /// Span of a block comment closing at `(row, column)` (column of the
    /// `*/`), scanning backward for its opener.
    fn comment_range_backward(
        &self,
        session: &Session,
        row: usize,
        column: usize,
    ) -> Option<FoldRange> {
        let mut r = row;
        loop {
            let line = session.line(r)?;
            let upto = if r == row { column.min(line.len()) } else { line.len() };
            if let Some(idx) = line.get(..upto).and_then(|s| s.rfind("/*")) {
                return Some(FoldRange::new(r, idx + 2, row, column));
            }
            if r == 0 {
                return None;
            }
            r -= 1;
        }
    }

    fn in_literal(&self, session: &Session, row: usize, column: usize) -> bool {
        session
            .token_at(row, column)
            .map(|t| matches!(t.kind, TokenKind::String | TokenKind::Comment))
            .unwrap_or(false)
    }
}

impl Default for CstyleFoldMode {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldMode for CstyleFoldMode {
    fn fold_widget(&self, session: &Session, fold_style: FoldStyle, row: usize) -> FoldWidget {
        let Some(line) = session.line(row) else {
            return FoldWidget::None;
        };
        if self.start_marker.is_match(line) {
            return FoldWidget::Start;
        }
        if fold_style == FoldStyle::MarkBeginEnd && self.stop_marker.is_match(line) {
            return FoldWidget::End;
        }
        FoldWidget::None
    }

    fn fold_widget_range(
        &self,
        session: &Session,
        fold_style: FoldStyle,
        row: usize,
    ) -> Option<FoldRange> {
        let line = session.line(row)?;
        if let Some(caps) = self.start_marker.captures(line) {
            if let Some(m) = caps.get(1) {
                return self.opening_bracket_block(
                    session,
                    m.as_str().as_bytes()[0],
                    row,
                    m.start(),
                );
            }
            if let Some(m) = caps.get(2) {
                return self.comment_range_forward(session, row, m.start() + 2);
            }
        }
        if fold_style != FoldStyle::MarkBeginEnd {
            return None;
        }
        if let Some(caps) = self.stop_marker.captures(line) {
            if let Some(m) = caps.get(1) {
                return self.closing_bracket_block(
                    session,
                    m.as_str().as_bytes()[0],
                    row,
                    m.start(),
                );
            }
            if let Some(m) = caps.get(2) {
                return self.comment_range_backward(session, row, m.start());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(source: &str) -> Session {
        Session::from_source(source)
    }

    #[test]
    fn test_brace_widget_and_range() {
        let s = session("<?php\nfunction f() {\n    work();\n}\n");
        let mode = CstyleFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 1), FoldWidget::Start);
        let range = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(range, FoldRange::new(1, 14, 3, 0));
    }

    #[test]
    fn test_nested_braces() {
        let s = session("<?php\nif ($a) {\n    while ($b) {\n        tick();\n    }\n}\n");
        let mode = CstyleFoldMode::new();
        let outer = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!((outer.start_row, outer.end_row), (1, 5));
        let inner = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 2).unwrap();
        assert_eq!((inner.start_row, inner.end_row), (2, 4));
    }

    #[test]
    fn test_brace_inside_string_ignored() {
        let s = session("<?php\nif ($a) {\n    $s = \"}\";\n}\n");
        let mode = CstyleFoldMode::new();
        let range = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(range.end_row, 3);
    }

    #[test]
    fn test_closing_brace_end_widget() {
        let s = session("<?php\nfunction f() {\n    work();\n}\n");
        let mode = CstyleFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 3), FoldWidget::None);
        assert_eq!(
            mode.fold_widget(&s, FoldStyle::MarkBeginEnd, 3),
            FoldWidget::End
        );
        let range = mode
            .fold_widget_range(&s, FoldStyle::MarkBeginEnd, 3)
            .unwrap();
        assert_eq!(range, FoldRange::new(1, 14, 3, 0));
    }

    #[test]
    fn test_comment_fold() {
        let s = session("<?php\n/* first\n   second\n*/\n");
        let mode = CstyleFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 1), FoldWidget::Start);
        let range = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(range, FoldRange::new(1, 2, 3, 0));
    }

    #[test]
    fn test_unmatched_brace_yields_none() {
        let s = session("<?php\nif ($a) {\n    work();\n");
        let mode = CstyleFoldMode::new();
        assert!(mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).is_none());
    }
}
