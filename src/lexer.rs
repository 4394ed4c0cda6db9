//! Hand-written character scanner: source text in, token stream out.
//!
//! Promoted from the teacher's dead `src/lexer/mod.rs` experiment (there
//! unused scaffolding for a different language) into the live tokenizer
//! for RS, extended with the escape/number/identifier rules spec §4.1
//! requires.

use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::ParseError;
use crate::position::Position;
use crate::token::{Token, TokenKind};

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for lemma in [
        "if", "then", "else", "loop", "repeat", "while", "foreach", "for", "in", "break",
        "continue", "set", "def", "func", "function", "call", "return", "try", "catch", "on",
        "emit", "print", "log", "read", "write", "into", "to", "with", "default", "launch",
        "open", "close", "wait", "sleep", "focus", "minimize", "maximize", "mkdir", "delete",
        "rm", "alert", "confirm", "prompt", "notify", "play", "stop", "video", "true", "false",
        "null",
    ] {
        m.insert(lemma, TokenKind::keyword(lemma).unwrap());
    }
    m
});

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&mut self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_insignificant(&mut self) {
        loop {
            match self.peek() {
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(c) if c == '\n' => break, // newlines are tokens, not skipped
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('\r') => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_insignificant();

        let pos = self.position();

        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", "", pos));
        };

        if c == '\n' {
            self.advance();
            return Ok(Token::new(TokenKind::Newline, "\n", "\n", pos));
        }

        if c == '"' || c == '\'' {
            return self.read_string(c, pos);
        }

        if c.is_ascii_digit() {
            return self.read_number(pos);
        }

        if c == '$' {
            return self.read_variable(pos);
        }

        if is_identifier_start(c) {
            return self.read_identifier(pos);
        }

        self.read_operator(pos)
    }

    fn read_string(&mut self, quote: char, pos: Position) -> Result<Token, ParseError> {
        let mut raw = String::new();
        raw.push(quote);
        self.advance();
        let mut value = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(ParseError::new("Unterminated string literal", pos)
                        .with_hint("Add a closing quote"))
                }
                Some(c) if c == quote => {
                    raw.push(c);
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    let Some(escaped) = self.advance() else {
                        return Err(ParseError::new("Unterminated string literal", pos));
                    };
                    raw.push(escaped);
                    value.push(decode_escape(escaped));
                }
                Some(c) => {
                    raw.push(c);
                    value.push(c);
                }
            }
        }
        Ok(Token::new(TokenKind::String, value, raw, pos))
    }

    fn read_number(&mut self, pos: Position) -> Result<Token, ParseError> {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                raw.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') {
            if let Some(next) = self.peek2() {
                if next.is_ascii_digit() {
                    raw.push('.');
                    self.advance();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_digit() {
                            raw.push(c);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
            }
        }
        Ok(Token::new(TokenKind::Number, raw.clone(), raw, pos))
    }

    fn read_variable(&mut self, pos: Position) -> Result<Token, ParseError> {
        let mut raw = String::from("$");
        self.advance();
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_identifier_continue(c) || c == '.' {
                name.push(c);
                raw.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(ParseError::new("Expected identifier after '$'", pos));
        }
        Ok(Token::new(TokenKind::Variable, name, raw, pos))
    }

    fn read_identifier(&mut self, pos: Position) -> Result<Token, ParseError> {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if is_identifier_continue(c) {
                raw.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let lemma = raw.to_lowercase();
        if let Some(kind) = KEYWORDS.get(lemma.as_str()) {
            Ok(Token::new(kind.clone(), lemma, raw, pos))
        } else {
            Ok(Token::new(TokenKind::Identifier, raw.clone(), raw, pos))
        }
    }

    fn read_operator(&mut self, pos: Position) -> Result<Token, ParseError> {
        let c = self.advance().expect("checked by caller");
        macro_rules! two_char {
            ($second:expr, $two:expr, $one:expr) => {{
                if self.peek() == Some($second) {
                    self.advance();
                    Token::new($two, format!("{c}{}", $second), format!("{c}{}", $second), pos)
                } else {
                    Token::new($one, c.to_string(), c.to_string(), pos)
                }
            }};
        }
        use TokenKind::*;
        let token = match c {
            '{' => Token::new(LBrace, "{", "{", pos),
            '}' => Token::new(RBrace, "}", "}", pos),
            '(' => Token::new(LParen, "(", "(", pos),
            ')' => Token::new(RParen, ")", ")", pos),
            '[' => Token::new(LBracket, "[", "[", pos),
            ']' => Token::new(RBracket, "]", "]", pos),
            ',' => Token::new(Comma, ",", ",", pos),
            ':' => Token::new(Colon, ":", ":", pos),
            ';' => Token::new(Semicolon, ";", ";", pos),
            '.' => Token::new(Dot, ".", ".", pos),
            '+' => Token::new(Plus, "+", "+", pos),
            '-' => Token::new(Minus, "-", "-", pos),
            '*' => Token::new(Star, "*", "*", pos),
            '/' => Token::new(Slash, "/", "/", pos),
            '%' => Token::new(Percent, "%", "%", pos),
            '=' => two_char!('=', EqEq, Eq),
            '!' => two_char!('=', NotEq, Bang),
            '<' => two_char!('=', LtEq, Lt),
            '>' => two_char!('=', GtEq, Gt),
            '&' => two_char!('&', AndAnd, Amp),
            '|' => two_char!('|', OrOr, Pipe),
            other => {
                return Err(ParseError::new(format!("Unexpected character '{other}'"), pos)
                    .with_hint("Remove or escape this character"))
            }
        };
        Ok(token)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || (c as u32) > 127
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Decodes a single escape character (the character following `\`).
/// Unknown escapes return the literal character, per spec §4.1.
fn decode_escape(escaped: char) -> char {
    let candidate = format!("\\{escaped}");
    match unescape::unescape(&candidate) {
        Some(s) if s.chars().count() == 1 => s.chars().next().unwrap(),
        _ => match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            '0' => '\0',
            other => other,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn skips_comments_but_not_newlines() {
        let tokens = Lexer::tokenize("set $x = 1 # comment\nprint $x").unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Newline));
        assert!(!tokens.iter().any(|t| t.raw.contains("comment")));
    }

    #[test]
    fn decodes_string_escapes() {
        let tokens = Lexer::tokenize(r#""a\nb\qc""#).unwrap();
        assert_eq!(tokens[0].value, "a\nbqc");
    }

    #[test]
    fn unterminated_string_is_parse_error() {
        assert!(Lexer::tokenize("\"abc").is_err());
    }

    #[test]
    fn numbers_require_trailing_digit_after_dot() {
        let tokens = Lexer::tokenize("1.5 2.").unwrap();
        assert_eq!(tokens[0].value, "1.5");
        // "2." without a trailing digit: only "2" is consumed as the number.
        assert_eq!(tokens[1].value, "2");
        assert_eq!(tokens[2].kind, TokenKind::Dot);
    }

    #[test]
    fn variables_allow_dotted_paths() {
        let tokens = Lexer::tokenize("$a.b.c").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].value, "a.b.c");
    }

    #[test]
    fn identifiers_allow_non_ascii() {
        let tokens = Lexer::tokenize("café").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].value, "café");
    }

    #[test]
    fn keywords_are_case_insensitive_and_lowercased() {
        let tokens = Lexer::tokenize("IF Then").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[0].value, "if");
        assert_eq!(tokens[1].kind, TokenKind::Then);
    }

    #[test]
    fn colons_do_not_join_identifiers() {
        assert_eq!(
            kinds("window:open"),
            vec![TokenKind::Identifier, TokenKind::Colon, TokenKind::Identifier, TokenKind::Eof]
        );
    }
}
