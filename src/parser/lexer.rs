//! Hand-written lexer: source text -> token stream (§4.4).
//!
//! State machine: scanning -> in-identifier | in-number | in-string(quote) ->
//! scanning, with a terminal EOF token (§4.7).

use tracing::trace;

use crate::error::{SqlError, SqlResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Table,
    From,
    Where,
    Into,
    Values,
    Set,
    And,
    Or,
    Not,
    Primary,
    Key,
    Int,
    Varchar,
    Text,
    Decimal,
    Boolean,
    Datetime,
    Date,
    Like,
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Group,
    By,
    Having,
    As,

    Identifier,
    Number,
    String,

    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    LParen,
    RParen,
    Comma,
    Semicolon,

    Eof,
}

/// A single lexical token: kind, literal text, and source position (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

fn keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word.to_ascii_uppercase().as_str() {
        "SELECT" => Select,
        "INSERT" => Insert,
        "UPDATE" => Update,
        "DELETE" => Delete,
        "CREATE" => Create,
        "DROP" => Drop,
        "TABLE" => Table,
        "FROM" => From,
        "WHERE" => Where,
        "INTO" => Into,
        "VALUES" => Values,
        "SET" => Set,
        "AND" => And,
        "OR" => Or,
        "NOT" => Not,
        "PRIMARY" => Primary,
        "KEY" => Key,
        "INT" => Int,
        "VARCHAR" => Varchar,
        "TEXT" => Text,
        "DECIMAL" => Decimal,
        "BOOLEAN" => Boolean,
        "DATETIME" => Datetime,
        "DATE" => Date,
        "LIKE" => Like,
        "COUNT" => Count,
        "SUM" => Sum,
        "AVG" => Avg,
        "MIN" => Min,
        "MAX" => Max,
        "GROUP" => Group,
        "BY" => By,
        "HAVING" => Having,
        "AS" => As,
        _ => return None,
    })
}

pub struct Lexer<'a> {
    chars: Vec<char>,
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenizes the entire input, always ending with a single `Eof` token.
    pub fn tokenize(source: &'a str) -> SqlResult<Vec<Token>> {
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

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn make(&self, kind: TokenKind, text: String, line: usize, column: usize) -> Token {
        trace!(?kind, text = %text, line, column, "token produced");
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    fn next_token(&mut self) -> SqlResult<Token> {
        self.skip_whitespace();
        let (line, column) = (self.line, self.column);
        let Some(ch) = self.peek() else {
            return Ok(self.make(TokenKind::Eof, String::new(), line, column));
        };

        if ch.is_ascii_digit() || (ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.read_number(line, column);
        }
        if ch == '\'' || ch == '"' {
            return self.read_string(ch, line, column);
        }
        if ch.is_alphabetic() || ch == '_' {
            return self.read_identifier(line, column);
        }

        self.advance();
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Eq,
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LtEq
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    return Err(SqlError::lex_error(
                        format!("unexpected character '{ch}'"),
                        line,
                        column,
                    ));
                }
            }
            other => {
                return Err(SqlError::lex_error(
                    format!("unexpected character '{other}'"),
                    line,
                    column,
                ))
            }
        };
        Ok(self.make(kind, ch.to_string(), line, column))
    }

    fn read_identifier(&mut self, line: usize, column: usize) -> SqlResult<Token> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        Ok(self.make(kind, text, line, column))
    }

    /// Digits with an optional `.`; per §9's open question, repeated dots are
    /// accepted here and left for the parser's later numeric conversion to
    /// reject as a malformed literal.
    fn read_number(&mut self, line: usize, column: usize) -> SqlResult<Token> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Ok(self.make(TokenKind::Number, text, line, column))
    }

    /// Single- or double-quoted string, supporting `\x` escaping of the
    /// closing quote character (§4.4).
    fn read_string(&mut self, quote: char, line: usize, column: usize) -> SqlResult<Token> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(SqlError::lex_error(
                        "unterminated string literal",
                        line,
                        column,
                    ))
                }
                Some(ch) if ch == '\\' => match self.advance() {
                    Some(escaped) => value.push(escaped),
                    None => {
                        return Err(SqlError::lex_error(
                            "unterminated string literal",
                            line,
                            column,
                        ))
                    }
                },
                Some(ch) if ch == quote => {
                    return Ok(self.make(TokenKind::String, value, line, column))
                }
                Some(ch) => value.push(ch),
            }
        }
    }
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("pos", &self.pos)
            .field("remaining", &&self.source[self.pos.min(self.source.len())..])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_keywords_case_insensitively() {
        let tokens = Lexer::tokenize("select * from Users").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Select);
        assert_eq!(tokens[1].kind, TokenKind::Star);
        assert_eq!(tokens[2].kind, TokenKind::From);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].text, "Users");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn tokenizes_operators() {
        let tokens = Lexer::tokenize("<> != <= >= = < >").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Eq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_literal_supports_backslash_escape_of_quote_char() {
        let tokens = Lexer::tokenize(r#"'it\'s here'"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "it's here");
    }

    #[test]
    fn unterminated_string_is_lex_error() {
        let result = Lexer::tokenize("'unterminated");
        assert!(matches!(result, Err(SqlError::LexError { .. })));
    }

    #[test]
    fn unexpected_character_is_lex_error_with_position() {
        let result = Lexer::tokenize("SELECT @ FROM t");
        match result {
            Err(SqlError::LexError { line, column, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 8);
            }
            _ => panic!("expected LexError"),
        }
    }

    #[test]
    fn decimal_numeric_literal_keeps_fraction() {
        let tokens = Lexer::tokenize("3.14").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "3.14");
    }
}
