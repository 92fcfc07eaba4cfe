use crate::models::{Token, TokenKind};
use crate::session::{Line, Session};

/// PHP keyword vocabulary, sorted for binary search. Classification is
/// case-insensitive; token values keep their source casing.
const KEYWORDS: &[&str] = &[
    "abstract",
    "and",
    "array",
    "as",
    "break",
    "case",
    "catch",
    "class",
    "clone",
    "const",
    "continue",
    "declare",
    "default",
    "do",
    "echo",
    "else",
    "elseif",
    "empty",
    "enddeclare",
    "endfor",
    "endforeach",
    "endif",
    "endswitch",
    "endwhile",
    "extends",
    "final",
    "finally",
    "for",
    "foreach",
    "function",
    "global",
    "goto",
    "if",
    "implements",
    "include",
    "include_once",
    "instanceof",
    "insteadof",
    "interface",
    "isset",
    "list",
    "namespace",
    "new",
    "or",
    "print",
    "private",
    "protected",
    "public",
    "require",
    "require_once",
    "return",
    "static",
    "switch",
    "throw",
    "trait",
    "try",
    "unset",
    "use",
    "var",
    "while",
    "xor",
    "yield",
];

fn is_keyword(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    KEYWORDS.binary_search(&lower.as_str()).is_ok()
}

/// Tokenizer state carried across lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Html,
    Php,
    PhpComment,
    PhpSingleQuote,
    PhpDoubleQuote,
    Script,
    Style,
}

impl State {
    fn tag(self) -> &'static str {
        match self {
            State::Html => "start",
            State::Php => "php-start",
            State::PhpComment => "php-comment",
            State::PhpSingleQuote => "php-qstring",
            State::PhpDoubleQuote => "php-qqstring",
            State::Script => "js-start",
            State::Style => "css-start",
        }
    }
}

/// Line-based tokenizer for PHP embedded in HTML, with `<script>`/`<style>`
/// region tracking for the fold router.
///
/// This is a classification tokenizer: it separates keywords, strings,
/// comments, variables, and punctuation well enough to drive fold matching.
/// It does not parse PHP.
pub struct MixedTokenizer;

impl MixedTokenizer {
    /// Tokenize a full document into a [`Session`].
    pub fn tokenize(source: &str) -> Session {
        let mut state = State::Html;
        let mut lines = Vec::new();
        for raw in source.lines() {
            let tokens = tokenize_line(raw, &mut state);
            lines.push(Line::new(raw, tokens, state.tag()));
        }
        Session::new(lines)
    }
}

fn tokenize_line(line: &str, state: &mut State) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < line.len() {
        i = match *state {
            State::Html => scan_html(line, i, &mut tokens, state),
            State::Script => scan_embedded(line, i, "</script", &mut tokens, state),
            State::Style => scan_embedded(line, i, "</style", &mut tokens, state),
            State::PhpComment => scan_comment_tail(line, i, &mut tokens, state),
            State::PhpSingleQuote => scan_string_tail(line, i, b'\'', &mut tokens, state),
            State::PhpDoubleQuote => scan_string_tail(line, i, b'"', &mut tokens, state),
            State::Php => scan_php(line, i, &mut tokens, state),
        };
    }
    tokens
}

/// Markup until the next region opener (`<?`, `<script`, `<style`).
fn scan_html(line: &str, start: usize, tokens: &mut Vec<Token>, state: &mut State) -> usize {
    let rest = &line[start..];
    let lower = rest.to_ascii_lowercase();
    let php = lower.find("<?");
    let script = lower.find("<script");
    let style = lower.find("<style");

    let off = match [php, script, style].iter().flatten().min() {
        Some(&off) => off,
        None => {
            tokens.push(Token::new(TokenKind::Text, rest, start));
            return line.len();
        }
    };
    if off > 0 {
        tokens.push(Token::new(TokenKind::Text, &rest[..off], start));
    }
    let at = start + off;
    if php == Some(off) {
        let tag_len = if lower[off..].starts_with("<?php") {
            5
        } else if lower[off..].starts_with("<?=") {
            3
        } else {
            2
        };
        tokens.push(Token::new(TokenKind::Tag, &line[at..at + tag_len], at));
        *state = State::Php;
        at + tag_len
    } else {
        let close = line[at..].find('>').map(|p| at + p + 1).unwrap_or(line.len());
        tokens.push(Token::new(TokenKind::Tag, &line[at..close], at));
        *state = if script == Some(off) {
            State::Script
        } else {
            State::Style
        };
        close
    }
}

/// Inside `<script>`/`<style>`: plain text until the closing tag.
fn scan_embedded(
    line: &str,
    start: usize,
    closer: &str,
    tokens: &mut Vec<Token>,
    state: &mut State,
) -> usize {
    let rest = &line[start..];
    let lower = rest.to_ascii_lowercase();
    match lower.find(closer) {
        Some(off) => {
            if off > 0 {
                tokens.push(Token::new(TokenKind::Text, &rest[..off], start));
            }
            let at = start + off;
            let close = line[at..].find('>').map(|p| at + p + 1).unwrap_or(line.len());
            tokens.push(Token::new(TokenKind::Tag, &line[at..close], at));
            *state = State::Html;
            close
        }
        None => {
            tokens.push(Token::new(TokenKind::Text, rest, start));
            line.len()
        }
    }
}

/// Continuation of a block comment opened on a previous line.
fn scan_comment_tail(line: &str, start: usize, tokens: &mut Vec<Token>, state: &mut State) -> usize {
    let rest = &line[start..];
    match rest.find("*/") {
        Some(off) => {
            tokens.push(Token::new(TokenKind::Comment, &rest[..off + 2], start));
            *state = State::Php;
            start + off + 2
        }
        None => {
            tokens.push(Token::new(TokenKind::Comment, rest, start));
            line.len()
        }
    }
}

/// Continuation of a string opened on a previous line.
fn scan_string_tail(
    line: &str,
    start: usize,
    quote: u8,
    tokens: &mut Vec<Token>,
    state: &mut State,
) -> usize {
    let rest = &line[start..];
    match find_string_end(rest, quote) {
        Some(end) => {
            tokens.push(Token::new(TokenKind::String, &rest[..end], start));
            *state = State::Php;
            start + end
        }
        None => {
            tokens.push(Token::new(TokenKind::String, rest, start));
            line.len()
        }
    }
}

/// Offset one past the closing quote, honoring backslash escapes.
fn find_string_end(s: &str, quote: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

fn word_end(line: &str, start: usize) -> usize {
    let bytes = line.as_bytes();
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
        end += 1;
    }
    end
}

fn scan_php(line: &str, start: usize, tokens: &mut Vec<Token>, state: &mut State) -> usize {
    let bytes = line.as_bytes();
    let rest = &line[start..];
    let c = bytes[start];

    if rest.starts_with("?>") {
        tokens.push(Token::new(TokenKind::Tag, "?>", start));
        *state = State::Html;
        return start + 2;
    }
    if rest.starts_with("//") || c == b'#' {
        tokens.push(Token::new(TokenKind::Comment, rest, start));
        return line.len();
    }
    if rest.starts_with("/*") {
        return match rest[2..].find("*/") {
            Some(off) => {
                tokens.push(Token::new(TokenKind::Comment, &rest[..off + 4], start));
                start + off + 4
            }
            None => {
                tokens.push(Token::new(TokenKind::Comment, rest, start));
                *state = State::PhpComment;
                line.len()
            }
        };
    }
    if c == b'\'' || c == b'"' {
        return match find_string_end(&rest[1..], c) {
            Some(end) => {
                tokens.push(Token::new(TokenKind::String, &rest[..end + 1], start));
                start + end + 1
            }
            None => {
                tokens.push(Token::new(TokenKind::String, rest, start));
                *state = if c == b'\'' {
                    State::PhpSingleQuote
                } else {
                    State::PhpDoubleQuote
                };
                line.len()
            }
        };
    }
    if c == b'$' {
        let end = word_end(line, start + 1);
        if end == start + 1 {
            tokens.push(Token::new(TokenKind::Punctuation, "$", start));
            return start + 1;
        }
        tokens.push(Token::new(TokenKind::Variable, &line[start..end], start));
        return end;
    }
    if c.is_ascii_digit() {
        let mut end = start + 1;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'.' || bytes[end] == b'_')
        {
            end += 1;
        }
        tokens.push(Token::new(TokenKind::Numeric, &line[start..end], start));
        return end;
    }
    if c.is_ascii_alphabetic() || c == b'_' {
        let end = word_end(line, start);
        let word = &line[start..end];
        let kind = if is_keyword(word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        tokens.push(Token::new(kind, word, start));
        return end;
    }
    if c.is_ascii_whitespace() {
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        tokens.push(Token::new(TokenKind::Text, &line[start..end], start));
        return end;
    }
    if c.is_ascii() {
        tokens.push(Token::new(TokenKind::Punctuation, &line[start..start + 1], start));
        return start + 1;
    }
    // Multi-byte characters pass through whole as text
    let ch_len = rest.chars().next().map(|ch| ch.len_utf8()).unwrap_or(1);
    tokens.push(Token::new(TokenKind::Text, &rest[..ch_len], start));
    start + ch_len
}
