use crate::models::Token;
use crate::tokenizer::MixedTokenizer;

/// One row of a tokenized document.
#[derive(Debug, Clone)]
pub struct Line {
    /// Raw line text, without the trailing newline
    pub text: String,
    /// Tokens covering the line, ordered by starting column
    pub tokens: Vec<Token>,
    /// Tokenizer state tag at the end of the row (e.g. `"php-start"`)
    pub state: String,
}

impl Line {
    pub fn new(text: impl Into<String>, tokens: Vec<Token>, state: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens,
            state: state.into(),
        }
    }
}

/// Read-only snapshot of a tokenized document.
///
/// This is the input format of every fold query: line text, per-row token
/// lists, and per-row state tags. Hosts with their own tokenizer construct a
/// session via [`Session::new`]; [`Session::from_source`] runs the built-in
/// mixed-document tokenizer.
#[derive(Debug, Clone, Default)]
pub struct Session {
    lines: Vec<Line>,
}

impl Session {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn from_source(source: &str) -> Self {
        MixedTokenizer::tokenize(source)
    }

    pub fn row_count(&self) -> usize {
        self.lines.len()
    }

    /// Raw text of a row, or `None` past document end
    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|l| l.text.as_str())
    }

    /// Tokenizer state tag at the end of a row
    pub fn state(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|l| l.state.as_str())
    }

    /// Tokens of a row; empty for rows past document end
    pub fn tokens(&self, row: usize) -> &[Token] {
        self.lines.get(row).map(|l| l.tokens.as_slice()).unwrap_or(&[])
    }

    /// The token whose span contains the given column, if any
    pub fn token_at(&self, row: usize, column: usize) -> Option<&Token> {
        self.tokens(row).iter().find(|t| t.contains_column(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenKind;

    fn sample() -> Session {
        Session::new(vec![
            Line::new(
                "if ($x):",
                vec![
                    Token::new(TokenKind::Keyword, "if", 0),
                    Token::new(TokenKind::Text, " ", 2),
                    Token::new(TokenKind::Punctuation, "(", 3),
                    Token::new(TokenKind::Variable, "$x", 4),
                    Token::new(TokenKind::Punctuation, ")", 6),
                    Token::new(TokenKind::Punctuation, ":", 7),
                ],
                "php-start",
            ),
            Line::new("", vec![], "php-start"),
        ])
    }

    #[test]
    fn test_token_at_containment() {
        let session = sample();
        assert_eq!(session.token_at(0, 0).unwrap().value, "if");
        assert_eq!(session.token_at(0, 1).unwrap().value, "if");
        assert_eq!(session.token_at(0, 2).unwrap().value, " ");
        assert_eq!(session.token_at(0, 5).unwrap().value, "$x");
        assert!(session.token_at(0, 8).is_none());
        assert!(session.token_at(5, 0).is_none());
    }

    #[test]
    fn test_out_of_bounds_rows() {
        let session = sample();
        assert!(session.line(2).is_none());
        assert!(session.tokens(2).is_empty());
        assert!(session.state(2).is_none());
        assert_eq!(session.row_count(), 2);
    }
}
