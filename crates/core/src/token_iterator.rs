use crate::models::{FoldRange, Token};
use crate::session::Session;

/// Cursor over the tokens of a [`Session`], stepping forward or backward
/// across row boundaries.
///
/// Once a step runs off either end of the document the cursor is exhausted:
/// every subsequent query returns `None`.
pub struct TokenIterator<'a> {
    session: &'a Session,
    pos: Option<(usize, usize)>,
}

impl<'a> TokenIterator<'a> {
    /// Position the cursor at the token containing `(row, column)`. If no
    /// token spans that column the cursor starts exhausted.
    pub fn new(session: &'a Session, row: usize, column: usize) -> Self {
        let pos = session
            .tokens(row)
            .iter()
            .position(|t| t.contains_column(column))
            .map(|idx| (row, idx));
        Self { session, pos }
    }

    /// The token under the cursor
    pub fn current(&self) -> Option<&'a Token> {
        let (row, idx) = self.pos?;
        self.session.tokens(row).get(idx)
    }

    pub fn current_row(&self) -> Option<usize> {
        self.pos.map(|(row, _)| row)
    }

    /// Starting column of the token under the cursor
    pub fn current_column(&self) -> Option<usize> {
        self.current().map(|t| t.start)
    }

    /// The span of the token under the cursor, as a single-row range
    pub fn current_token_range(&self) -> Option<FoldRange> {
        let (row, _) = self.pos?;
        let token = self.current()?;
        Some(FoldRange::new(row, token.start, row, token.end()))
    }

    /// Advance toward document end, returning the new current token
    pub fn step_forward(&mut self) -> Option<&'a Token> {
        let (mut row, mut idx) = self.pos?;
        idx += 1;
        while row < self.session.row_count() {
            if idx < self.session.tokens(row).len() {
                self.pos = Some((row, idx));
                return self.current();
            }
            row += 1;
            idx = 0;
        }
        self.pos = None;
        None
    }

    /// Step toward document start, returning the new current token
    pub fn step_backward(&mut self) -> Option<&'a Token> {
        let (mut row, idx) = self.pos?;
        if idx > 0 {
            self.pos = Some((row, idx - 1));
            return self.current();
        }
        while row > 0 {
            row -= 1;
            let count = self.session.tokens(row).len();
            if count > 0 {
                self.pos = Some((row, count - 1));
                return self.current();
            }
        }
        self.pos = None;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenKind;
    use crate::session::Line;

    fn session() -> Session {
        Session::new(vec![
            Line::new(
                "if:",
                vec![
                    Token::new(TokenKind::Keyword, "if", 0),
                    Token::new(TokenKind::Punctuation, ":", 2),
                ],
                "php-start",
            ),
            Line::new("", vec![], "php-start"),
            Line::new(
                "endif;",
                vec![
                    Token::new(TokenKind::Keyword, "endif", 0),
                    Token::new(TokenKind::Punctuation, ";", 5),
                ],
                "php-start",
            ),
        ])
    }

    #[test]
    fn test_positioning() {
        let s = session();
        let iter = TokenIterator::new(&s, 0, 1);
        assert_eq!(iter.current().unwrap().value, "if");
        assert_eq!(iter.current_row(), Some(0));
        assert_eq!(iter.current_column(), Some(0));

        let off = TokenIterator::new(&s, 0, 3);
        assert!(off.current().is_none());
    }

    #[test]
    fn test_step_forward_skips_empty_rows() {
        let s = session();
        let mut iter = TokenIterator::new(&s, 0, 2);
        assert_eq!(iter.step_forward().unwrap().value, "endif");
        assert_eq!(iter.current_row(), Some(2));
        assert_eq!(iter.step_forward().unwrap().value, ";");
        assert!(iter.step_forward().is_none());
        // Exhaustion is terminal
        assert!(iter.step_forward().is_none());
        assert!(iter.current().is_none());
    }

    #[test]
    fn test_step_backward_across_rows() {
        let s = session();
        let mut iter = TokenIterator::new(&s, 2, 0);
        assert_eq!(iter.step_backward().unwrap().value, ":");
        assert_eq!(iter.current_row(), Some(0));
        assert_eq!(iter.step_backward().unwrap().value, "if");
        assert!(iter.step_backward().is_none());
        assert!(iter.step_backward().is_none());
    }

    #[test]
    fn test_token_range() {
        let s = session();
        let iter = TokenIterator::new(&s, 2, 3);
        let range = iter.current_token_range().unwrap();
        assert_eq!(range, FoldRange::new(2, 0, 2, 5));
    }
}
