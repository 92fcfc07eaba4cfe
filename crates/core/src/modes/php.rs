use super::{CstyleFoldMode, FoldMode};
use crate::models::{FoldRange, FoldStyle, FoldWidget, TokenKind};
use crate::session::Session;
use crate::token_iterator::TokenIterator;
use regex::Regex;

/// Signed nesting weight of PHP's colon-block keywords. Openers count `+1`,
/// their `end*` counterparts `-1`, and `else`/`elseif` sit at `0`: they
/// neither open nor close a level on their own. Keywords absent from the
/// table have no effect on the balance scan.
fn indent_weight(value: &str) -> Option<i32> {
    match value {
        "if" | "while" | "for" | "foreach" | "switch" => Some(1),
        "else" | "elseif" => Some(0),
        "endif" | "endwhile" | "endfor" | "endforeach" | "endswitch" => Some(-1),
        _ => None,
    }
}

/// Folder for PHP's alternative block syntax (`if (..): ... endif;`),
/// delegating everything else to a [`CstyleFoldMode`].
///
/// The marker regexes only narrow down candidate rows; a match is confirmed
/// against the row's tokens so keywords inside strings or comments never
/// produce widgets.
pub struct PhpFoldMode {
    cstyle: CstyleFoldMode,
    start_marker: Regex,
    stop_marker: Regex,
}

impl PhpFoldMode {
    pub fn new() -> Self {
        Self {
            cstyle: CstyleFoldMode::new(),
            start_marker: Regex::new(r"(?i)(?:\s|^)(if|else|elseif|while|for|foreach|switch).*:")
                .unwrap(),
            stop_marker: Regex::new(r"(?i)(?:\s|^)(endif|endwhile|endfor|endforeach|endswitch);")
                .unwrap(),
        }
    }

    /// Whether a line carries either keyword-block marker. Used by the
    /// scanner to classify fold regions.
    pub fn is_block_marker(&self, line: &str) -> bool {
        self.start_marker.is_match(line) || self.stop_marker.is_match(line)
    }

    /// Column of the keyword captured by a marker regex
    fn marker_column(marker: &Regex, line: &str) -> Option<usize> {
        marker.captures(line).and_then(|c| c.get(1)).map(|m| m.start())
    }

    fn keyword_token_at(session: &Session, row: usize, column: usize) -> bool {
        session
            .token_at(row, column)
            .map(|t| t.kind == TokenKind::Keyword)
            .unwrap_or(false)
    }

    /// Resolve the block around the keyword token at `(row, column)`.
    ///
    /// Walks tokens away from the keyword, balancing nesting on a stack
    /// seeded with the keyword itself, until the matching construct empties
    /// the stack. Openers scan forward toward their `end*` keyword; `end*`
    /// keywords scan backward toward their opener; `else`/`elseif` always
    /// scan forward, since they open the fold covering their own branch.
    ///
    /// With `token_range` set, returns the matched token's own span instead
    /// of a fold range (bracket-highlight use). Unmatched or malformed
    /// blocks yield `None`; the scan never runs past document bounds.
    pub fn php_block(
        &self,
        session: &Session,
        row: usize,
        column: usize,
        token_range: bool,
    ) -> Option<FoldRange> {
        let mut stream = TokenIterator::new(session, row, column);

        let token = stream.current()?;
        if token.kind != TokenKind::Keyword {
            return None;
        }

        let value = token.value.as_str();
        let mut dir = indent_weight(value).unwrap_or(0);
        if value == "else" || value == "elseif" {
            dir = 1;
        }
        if dir == 0 {
            return None;
        }

        let mut stack: Vec<&str> = vec![value];
        let start_row = row;
        let start_column = if dir == -1 {
            stream.current_column()?
        } else {
            session.line(row)?.len()
        };

        loop {
            let step = if dir == -1 {
                stream.step_backward()
            } else {
                stream.step_forward()
            };
            // Stream exhausted before the stack emptied: unmatched block
            let token = step?;
            if token.kind != TokenKind::Keyword {
                continue;
            }
            let Some(weight) = indent_weight(&token.value) else {
                continue;
            };
            let level = dir * weight;
            if level > 0 {
                stack.push(&token.value);
            } else {
                stack.pop();
                if stack.is_empty() {
                    break;
                }
                // else/elseif balances the level above it but stays visible
                // as a boundary for anything still on the stack
                if level == 0 {
                    stack.push(&token.value);
                }
            }
        }

        if token_range {
            return stream.current_token_range();
        }

        let end_row = stream.current_row()?;
        if dir == -1 {
            let line_len = session.line(end_row)?.len();
            Some(FoldRange::new(end_row, line_len, start_row, start_column))
        } else {
            Some(FoldRange::new(
                start_row,
                start_column,
                end_row,
                stream.current_column()?,
            ))
        }
    }
}

impl Default for PhpFoldMode {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldMode for PhpFoldMode {
    fn fold_widget(&self, session: &Session, fold_style: FoldStyle, row: usize) -> FoldWidget {
        let Some(line) = session.line(row) else {
            return FoldWidget::None;
        };
        let is_start = self.start_marker.is_match(line);
        let is_end = self.stop_marker.is_match(line);

        if is_start && !is_end {
            if let Some(column) = Self::marker_column(&self.start_marker, line) {
                if Self::keyword_token_at(session, row, column) {
                    return FoldWidget::Start;
                }
            }
        }
        if is_end && fold_style == FoldStyle::MarkBeginEnd {
            if let Some(column) = Self::marker_column(&self.stop_marker, line) {
                if Self::keyword_token_at(session, row, column) {
                    return FoldWidget::End;
                }
            }
        }
        self.cstyle.fold_widget(session, fold_style, row)
    }

    fn fold_widget_range(
        &self,
        session: &Session,
        fold_style: FoldStyle,
        row: usize,
    ) -> Option<FoldRange> {
        let line = session.line(row)?;
        if let Some(column) = Self::marker_column(&self.start_marker, line) {
            return self.php_block(session, row, column, false);
        }
        if let Some(column) = Self::marker_column(&self.stop_marker, line) {
            return self.php_block(session, row, column, false);
        }
        self.cstyle.fold_widget_range(session, fold_style, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(source: &str) -> Session {
        Session::from_source(source)
    }

    #[test]
    fn test_start_widget() {
        let s = session("<?php\nif ($x):\n    work();\nendif;\n");
        let mode = PhpFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 1), FoldWidget::Start);
        // The end marker only surfaces under markbeginend
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 3), FoldWidget::None);
        assert_eq!(
            mode.fold_widget(&s, FoldStyle::MarkBeginEnd, 3),
            FoldWidget::End
        );
    }

    #[test]
    fn test_marker_inside_string_falls_back() {
        let s = session("<?php\n$s = \" if (x): \";\n$t = \" endif; \";\n");
        let mode = PhpFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 1), FoldWidget::None);
        assert_eq!(
            mode.fold_widget(&s, FoldStyle::MarkBeginEnd, 2),
            FoldWidget::None
        );
    }

    #[test]
    fn test_marker_inside_comment_falls_back() {
        let s = session("<?php\n// if ($x):\n");
        let mode = PhpFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 1), FoldWidget::None);
    }

    #[test]
    fn test_range_direction_symmetric() {
        let s = session("<?php\nif ($x):\n    work();\nendif;\n");
        let mode = PhpFoldMode::new();
        let from_start = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        let from_end = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 3).unwrap();
        assert_eq!(from_start, FoldRange::new(1, 8, 3, 0));
        assert_eq!(from_start, from_end);
    }

    #[test]
    fn test_nested_blocks() {
        let s = session("<?php\nif ($a):\n    if ($b):\n        work();\n    endif;\nendif;\n");
        let mode = PhpFoldMode::new();
        let inner = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 2).unwrap();
        assert_eq!(inner, FoldRange::new(2, 12, 4, 4));
        let outer = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(outer, FoldRange::new(1, 8, 5, 0));
    }

    #[test]
    fn test_else_opens_forward() {
        let s = session("<?php\nif ($a):\n    a();\nelse:\n    b();\nendif;\n");
        let mode = PhpFoldMode::new();
        // The if-branch fold ends at the else
        let if_fold = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(if_fold, FoldRange::new(1, 8, 3, 0));
        // The else-branch fold runs to the endif, never backward
        let else_fold = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 3).unwrap();
        assert_eq!(else_fold, FoldRange::new(3, 5, 5, 0));
    }

    #[test]
    fn test_else_does_not_close_enclosing_block() {
        let s = session(
            "<?php\nif ($a):\n    if ($b):\n        a();\n    else:\n        b();\n    endif;\nendif;\n",
        );
        let mode = PhpFoldMode::new();
        // Outer fold must span the inner if/else/endif entirely
        let outer = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(outer, FoldRange::new(1, 8, 7, 0));
        // Backward from the outer endif lands on the outer if
        let from_end = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 7).unwrap();
        assert_eq!(from_end, outer);
    }

    #[test]
    fn test_unmatched_block_yields_none() {
        let s = session("<?php\nif ($x):\n    work();\n");
        let mode = PhpFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 1), FoldWidget::Start);
        assert!(mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).is_none());
    }

    #[test]
    fn test_mixed_loop_keywords() {
        let s = session("<?php\nforeach ($xs as $x):\n    use_it($x);\nendforeach;\n");
        let mode = PhpFoldMode::new();
        let range = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(range, FoldRange::new(1, 20, 3, 0));
    }

    #[test]
    fn test_non_block_keywords_are_skipped() {
        let s = session("<?php\nwhile ($x):\n    return f();\n    echo $x;\nendwhile;\n");
        let mode = PhpFoldMode::new();
        let range = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(range, FoldRange::new(1, 11, 4, 0));
    }

    #[test]
    fn test_token_range_flag() {
        let s = session("<?php\nif ($x):\n    work();\nendif;\n");
        let mode = PhpFoldMode::new();
        // From the if keyword, the matched token is the endif
        let span = mode.php_block(&s, 1, 0, true).unwrap();
        assert_eq!(span, FoldRange::new(3, 0, 3, 5));
    }

    #[test]
    fn test_php_block_on_non_keyword() {
        let s = session("<?php\n$x = 1;\n");
        let mode = PhpFoldMode::new();
        assert!(mode.php_block(&s, 1, 0, false).is_none());
    }

    #[test]
    fn test_brace_fallback() {
        let s = session("<?php\nfunction f() {\n    work();\n}\n");
        let mode = PhpFoldMode::new();
        assert_eq!(mode.fold_widget(&s, FoldStyle::MarkBegin, 1), FoldWidget::Start);
        let range = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        assert_eq!(range, FoldRange::new(1, 14, 3, 0));
    }

    #[test]
    fn test_worked_example() {
        // ["if (x):", "  doStuff();", "endif;"] shifted one row by the open tag
        let s = session("<?php\nif (x):\n  doStuff();\nendif;\n");
        let mode = PhpFoldMode::new();
        let from_start = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 1).unwrap();
        let from_end = mode.fold_widget_range(&s, FoldStyle::MarkBegin, 3).unwrap();
        assert_eq!(from_start, FoldRange::new(1, 7, 3, 0));
        assert_eq!(from_start, from_end);
    }
}
