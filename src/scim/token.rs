//! SCIM filter tokenizer.
//!
//! Splits a filter string into the typed tokens consumed by
//! [`Stream`](super::Stream). Whitespace separates tokens and is never emitted
//! on its own, but every token remembers the whitespace around it (see
//! [`Token::raw`]) so error messages can quote the exact surrounding text.
//!
//! ## Lexical grammar
//!
//! ```text
//! SchemaUri  = "urn:" URICHAR* ; up to the last ':' before the attribute name
//! Identifier = (ALPHA / "$") *(ALPHA / DIGIT / "_" / "-")
//! String     = JSON string literal (RFC 8259)
//! Number     = ["-"] 1*DIGIT ["." 1*DIGIT] [("e" / "E") ["+" / "-"] 1*DIGIT]
//! Keyword    = "and" / "or" / "not" / "true" / "false" / "null"
//! Operator   = "eq" / "ne" / "co" / "sw" / "ew" / "gt" / "ge" / "lt" / "le" / "pr"
//! Punct      = "(" / ")" / "[" / "]" / "." / ":"
//! ```
//!
//! Keywords and operators are case-insensitive (RFC 7644 Section 3.4.2.2) and
//! only match whole words, so `order` and `prefix` stay identifiers.

use std::fmt;

use serde::Serialize;

use super::error::FilterError;

/// 1-based line and column of a token in the source filter.
///
/// Columns count characters, not bytes, and point at the first character of
/// the lexeme itself, not at the whitespace before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Token categories the parser can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Schema URI prefix of a fully qualified attribute, without the final `:`
    SchemaUri,
    /// Attribute or sub-attribute name
    Identifier,
    /// Double-quoted string literal (quotes included in the token text)
    String,
    /// Numeric literal
    Number,
    True,
    False,
    Null,
    /// One of the comparison operators, including `pr`
    Operator,
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Dot,
    Colon,
}

impl TokenKind {
    /// Kinds that can appear on the right-hand side of a comparison.
    pub const LITERALS: &'static [TokenKind] = &[
        TokenKind::String,
        TokenKind::Number,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Null,
    ];

    /// Keyword recognized for a bare word, if any.
    fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word.to_ascii_lowercase().as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "eq" | "ne" | "co" | "sw" | "ew" | "gt" | "ge" | "lt" | "le" | "pr" => {
                TokenKind::Operator
            }
            _ => return None,
        };
        Some(kind)
    }
}

/// A single lexeme of a filter string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    kind: TokenKind,
    text: String,
    raw: String,
    position: Position,
}

impl Token {
    /// Build a token whose raw text is its lexeme.
    ///
    /// Mostly useful to drive a [`Stream`](super::Stream) by hand.
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        let text = text.into();
        Self {
            kind,
            raw: text.clone(),
            text,
            position,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The lexeme exactly as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The lexeme together with the whitespace directly before and after it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Split a filter string into tokens.
///
/// # Errors
///
/// Returns [`FilterError::Lexical`] with the offending text and its position
/// when the input contains something that is not a token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
    Tokenizer::new(input).collect()
}

/// Streaming tokenizer over a filter string.
///
/// Yields `Err` at most once; iteration stops after the first error.
pub struct Tokenizer<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
            failed: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, FilterError> {
        let leading = self.offset;
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let start = self.offset;
        let position = self.here();

        let kind = match c {
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            '.' => self.single(TokenKind::Dot),
            ':' => self.single(TokenKind::Colon),
            '"' => self.read_string(position)?,
            '-' | '0'..='9' => self.read_number(position)?,
            c if c.is_ascii_alphabetic() || c == '$' => {
                if self.rest().get(..4).is_some_and(|p| p.eq_ignore_ascii_case("urn:")) {
                    self.read_schema_uri(position)?
                } else {
                    self.read_word()
                }
            }
            _ => {
                return Err(FilterError::Lexical {
                    text: c.to_string(),
                    position,
                });
            }
        };

        let end = self.offset;
        let trailing = end + self.rest().len() - self.rest().trim_start().len();
        let token = Token {
            kind,
            text: self.input[start..end].to_string(),
            raw: self.input[leading..trailing].to_string(),
            position,
        };

        tracing::trace!(kind = ?token.kind, text = %token.text, %position, "token");

        Ok(Some(token))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn read_word(&mut self) -> TokenKind {
        let start = self.offset;
        self.advance();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.advance();
        }

        TokenKind::keyword(&self.input[start..self.offset]).unwrap_or(TokenKind::Identifier)
    }

    fn read_schema_uri(&mut self, position: Position) -> Result<TokenKind, FilterError> {
        let rest = self.rest();
        let run = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '-' | '_')))
            .unwrap_or(rest.len());
        let uri = &rest[..run];

        // The attribute name follows the last colon; "urn:" alone is no schema.
        match uri.rfind(':') {
            Some(colon) if colon > "urn:".len() && colon + 1 < uri.len() => {
                for _ in 0..colon {
                    self.advance();
                }
                Ok(TokenKind::SchemaUri)
            }
            _ => Err(FilterError::Lexical {
                text: uri.to_string(),
                position,
            }),
        }
    }

    fn read_string(&mut self, position: Position) -> Result<TokenKind, FilterError> {
        let start = self.offset;
        self.advance();

        loop {
            match self.peek() {
                None => {
                    return Err(FilterError::Lexical {
                        text: self.input[start..].to_string(),
                        position,
                    });
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(_) => self.advance(),
            }
        }

        // Escapes follow JSON; let serde_json be the judge.
        let literal = &self.input[start..self.offset];
        if serde_json::from_str::<String>(literal).is_err() {
            return Err(FilterError::Lexical {
                text: literal.to_string(),
                position,
            });
        }

        Ok(TokenKind::String)
    }

    fn read_number(&mut self, position: Position) -> Result<TokenKind, FilterError> {
        let start = self.offset;

        if self.peek() == Some('-') {
            self.advance();
        }

        let mut valid = self.digits() > 0;

        if self.peek() == Some('.') {
            self.advance();
            valid &= self.digits() > 0;
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            valid &= self.digits() > 0;
        }

        if !valid {
            return Err(FilterError::Lexical {
                text: self.input[start..self.offset].to_string(),
                position,
            });
        }

        Ok(TokenKind::Number)
    }

    fn digits(&mut self) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            count += 1;
        }
        count
    }

    // Helper methods

    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.offset += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .iter()
            .map(Token::kind)
            .collect()
    }

    #[test]
    fn test_simple_comparison() {
        let tokens = tokenize("userName eq \"bjensen\"").unwrap();
        assert_eq!(tokens.len(), 3);

        assert_eq!(tokens[0].kind(), TokenKind::Identifier);
        assert_eq!(tokens[0].text(), "userName");
        assert_eq!(tokens[0].position(), Position::new(1, 1));

        assert_eq!(tokens[1].kind(), TokenKind::Operator);
        assert_eq!(tokens[1].text(), "eq");
        assert_eq!(tokens[1].raw(), " eq ");
        assert_eq!(tokens[1].position(), Position::new(1, 10));

        assert_eq!(tokens[2].kind(), TokenKind::String);
        assert_eq!(tokens[2].text(), "\"bjensen\"");
        assert_eq!(tokens[2].position(), Position::new(1, 13));
    }

    #[rstest]
    #[case::and("and", TokenKind::And)]
    #[case::or("OR", TokenKind::Or)]
    #[case::not("Not", TokenKind::Not)]
    #[case::true_("true", TokenKind::True)]
    #[case::false_("FALSE", TokenKind::False)]
    #[case::null("null", TokenKind::Null)]
    #[case::eq("eq", TokenKind::Operator)]
    #[case::pr("PR", TokenKind::Operator)]
    #[case::le("le", TokenKind::Operator)]
    #[case::prefix("prefix", TokenKind::Identifier)]
    #[case::order("order", TokenKind::Identifier)]
    #[case::dashed("x-custom_1", TokenKind::Identifier)]
    #[case::reference("$ref", TokenKind::Identifier)]
    fn test_words(#[case] input: &str, #[case] expected: TokenKind) {
        assert_eq!(kinds(input), vec![expected]);
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("( ) [ ] . :"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Dot,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn test_value_path() {
        assert_eq!(
            kinds("emails[type eq \"work\"].value"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftBracket,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::String,
                TokenKind::RightBracket,
                TokenKind::Dot,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_schema_uri() {
        let tokens =
            tokenize("urn:ietf:params:scim:schemas:core:2.0:User:name.familyName pr").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| (t.kind(), t.text())).collect();
        assert_eq!(
            texts,
            vec![
                (
                    TokenKind::SchemaUri,
                    "urn:ietf:params:scim:schemas:core:2.0:User"
                ),
                (TokenKind::Colon, ":"),
                (TokenKind::Identifier, "name"),
                (TokenKind::Dot, "."),
                (TokenKind::Identifier, "familyName"),
                (TokenKind::Operator, "pr"),
            ]
        );
        assert_eq!(tokens[1].position(), Position::new(1, 43));
    }

    #[test]
    fn test_schema_uri_without_attribute() {
        let err = tokenize("urn:ietf:params:scim:schemas:core:2.0:User: pr").unwrap_err();
        assert_eq!(
            err,
            FilterError::Lexical {
                text: "urn:ietf:params:scim:schemas:core:2.0:User:".to_string(),
                position: Position::new(1, 1),
            }
        );
    }

    #[rstest]
    #[case::integer("42")]
    #[case::negative("-7")]
    #[case::decimal("3.25")]
    #[case::exponent("1e10")]
    #[case::signed_exponent("-2.5E-3")]
    fn test_numbers(#[case] input: &str) {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::Number);
        assert_eq!(tokens[0].text(), input);
    }

    #[rstest]
    #[case::lone_minus("-", "-")]
    #[case::trailing_dot("12. ", "12.")]
    #[case::empty_exponent("1e", "1e")]
    fn test_malformed_numbers(#[case] input: &str, #[case] text: &str) {
        let err = tokenize(input).unwrap_err();
        assert_eq!(
            err,
            FilterError::Lexical {
                text: text.to_string(),
                position: Position::new(1, 1),
            }
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#"name eq "John \"Doe\" é""#).unwrap();
        assert_eq!(tokens[2].kind(), TokenKind::String);
        assert_eq!(tokens[2].text(), r#""John \"Doe\" é""#);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("userName eq \"john").unwrap_err();
        assert_eq!(
            err,
            FilterError::Lexical {
                text: "\"john".to_string(),
                position: Position::new(1, 13),
            }
        );
    }

    #[test]
    fn test_invalid_escape() {
        let err = tokenize(r#"userName eq "a\qb""#).unwrap_err();
        assert!(matches!(err, FilterError::Lexical { ref text, .. } if text == r#""a\qb""#));
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("userName == \"john\"").unwrap_err();
        assert_eq!(
            err,
            FilterError::Lexical {
                text: "=".to_string(),
                position: Position::new(1, 10),
            }
        );
        assert_eq!(err.to_string(), "Unrecognized \"=\" on line 1, column 10.");
    }

    #[test]
    fn test_multiline_positions() {
        let tokens = tokenize("userName pr\n  and\n\ttitle pr").unwrap();
        assert_eq!(tokens[2].kind(), TokenKind::And);
        assert_eq!(tokens[2].position(), Position::new(2, 3));
        assert_eq!(tokens[2].raw(), "\n  and\n\t");
        assert_eq!(tokens[3].position(), Position::new(3, 2));
    }

    #[test]
    fn test_raw_includes_surrounding_whitespace() {
        let tokens = tokenize(" and userName eq \"foobar\"").unwrap();
        assert_eq!(tokens[0].kind(), TokenKind::And);
        assert_eq!(tokens[0].text(), "and");
        assert_eq!(tokens[0].raw(), " and ");
        assert_eq!(tokens[0].position(), Position::new(1, 2));
        assert_eq!(tokens[1].raw(), " userName ");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize(" \t\n ").unwrap().is_empty());
    }

    #[test]
    fn test_unicode_columns() {
        let tokens = tokenize("displayName eq \"Zoë\" and title pr").unwrap();
        assert_eq!(tokens[3].kind(), TokenKind::And);
        assert_eq!(tokens[3].position(), Position::new(1, 22));
    }

    #[test]
    fn test_tokenizer_stops_after_error() {
        let mut tokenizer = Tokenizer::new("a # b");
        assert!(matches!(tokenizer.next(), Some(Ok(_))));
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert!(tokenizer.next().is_none());
    }
}
