//! SCIM 2.0 Filter Parser
//!
//! Recursive-descent parser for SCIM filter expressions per RFC 7644 Section
//! 3.4.2. Each grammar production is one method of a private `Grammar`, all sharing a
//! single [`Stream`] cursor and a [`FilterBuilder`].
//!
//! ## Grammar
//!
//! ```text
//! filter        = disjunction | <empty>
//! disjunction   = conjunction { "or" conjunction }
//! conjunction   = factor { "and" factor }
//! factor        = "not" factor | "(" filter ")" | comparison
//! comparison    = attributePath [ compareOp [ compValue ] ]
//! attributePath = [ schemaUri ":" ] ATTRNAME { "." ATTRNAME }
//!                 [ "[" filter "]" [ "." ATTRNAME ] ]
//! compareOp     = "eq" | "ne" | "co" | "sw" | "ew" | "gt" | "ge" | "lt" | "le" | "pr"
//! compValue     = "true" | "false" | "null" | NUMBER | STRING
//! ```
//!
//! `pr` never takes a value; every other operator requires one.
//!
//! ## Empty expressions
//!
//! `""`, `"()"` and `"not ()"` all parse to `None`: an empty group means "no
//! filter", and negating no filter is still no filter. Empty operands of
//! `and`/`or` are dropped.
//!
//! ## Examples
//!
//! ```text
//! userName eq "bjensen"
//! name.familyName co "O'Malley"
//! emails[type eq "work" and value co "@example.com"]
//! urn:ietf:params:scim:schemas:core:2.0:User:userName sw "J"
//! title pr and not (userType eq "Intern" or userType eq "Contractor")
//! ```
//!
//! ## Security Limits
//!
//! To bound the work done for hostile input, [`ParserOptions`] caps the raw
//! filter length (default 4096 bytes) and the nesting depth of groups,
//! negations and value filters (default 32 levels).

use serde::{Deserialize, Serialize};

use super::{
    ast::{AttributePath, Detached, DetachedPath, Filter, FilterBuilder, Operator, Value},
    error::FilterError,
    stream::Stream,
    token::{Position, Token, TokenKind, tokenize},
};

/// Default maximum length of a SCIM filter expression (bytes).
///
/// 4KB is generous for any real-world SCIM filter while keeping parse time
/// bounded.
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// Default maximum nesting depth of a SCIM filter expression.
///
/// Prevents stack exhaustion from inputs like `not (not (not (...)))` or
/// `a[b[c[...]]]`.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserOptions {
    /// Maximum accepted filter length in bytes.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Maximum nesting depth. Every `not`, `(` and `[` opens one level.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Parse a SCIM filter expression with the default [`ParserOptions`].
///
/// Returns `Ok(None)` for an empty expression (`""`, `"()"`, `"not ()"`).
///
/// # Errors
///
/// Returns an error if:
/// - The filter exceeds [`DEFAULT_MAX_LENGTH`] bytes
/// - The filter exceeds [`DEFAULT_MAX_DEPTH`] nesting levels
/// - The filter contains characters outside the filter language
/// - The filter has invalid syntax
///
/// # Examples
///
/// ```
/// use scim_filter::{NodeKind, parse};
///
/// let filter = parse("userName eq \"bjensen\" and active eq true").unwrap().unwrap();
/// assert_eq!(filter.root().kind(), NodeKind::Conjunction);
///
/// assert!(parse("()").unwrap().is_none());
/// ```
pub fn parse(input: &str) -> Result<Option<Filter>, FilterError> {
    Parser::default().parse(input)
}

/// Configurable filter parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a complete filter string.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    #[tracing::instrument(
        name = "scim.filter.parse",
        level = "debug",
        skip_all,
        fields(length = input.len())
    )]
    pub fn parse(&self, input: &str) -> Result<Option<Filter>, FilterError> {
        let result = self.parse_input(input);

        match &result {
            Ok(Some(filter)) => tracing::debug!(nodes = filter.len(), "Parsed SCIM filter"),
            Ok(None) => tracing::debug!("Parsed empty SCIM filter"),
            Err(e) => tracing::debug!(error = %e, "Rejected SCIM filter"),
        }

        result
    }

    fn parse_input(&self, input: &str) -> Result<Option<Filter>, FilterError> {
        // Check length limit before tokenizing
        if input.len() > self.options.max_length {
            return Err(FilterError::TooLong {
                length: input.len(),
                max: self.options.max_length,
            });
        }

        let tokens = tokenize(input)?;
        tracing::trace!(tokens = tokens.len(), "Tokenized SCIM filter");

        let mut stream = Stream::new(tokens);
        let filter = self.parse_stream(&mut stream)?;

        // Ensure we consumed all input
        stream.expect_end()?;

        Ok(filter)
    }

    /// Parse one filter expression starting at the stream's cursor.
    ///
    /// Stops before the first token that cannot continue the expression and
    /// leaves it unconsumed, so the grammar can be embedded in a larger
    /// language.
    ///
    /// # Errors
    ///
    /// Any grammar violation or exceeded nesting limit.
    pub fn parse_stream(&self, stream: &mut Stream) -> Result<Option<Filter>, FilterError> {
        let mut grammar = Grammar {
            stream,
            builder: FilterBuilder::new(),
            depth: 0,
            max_depth: self.options.max_depth,
        };

        let root = grammar.filter()?;
        root.map(|root| grammar.builder.finish(root)).transpose()
    }
}

// =============================================================================
// Grammar Implementation
// =============================================================================

struct Grammar<'s> {
    stream: &'s mut Stream,
    builder: FilterBuilder,
    depth: usize,
    max_depth: usize,
}

impl Grammar<'_> {
    // filter = disjunction | <empty>
    fn filter(&mut self) -> Result<Option<Detached>, FilterError> {
        if self.stream.is_exhausted()
            || self
                .stream
                .is_next(&[TokenKind::RightParen, TokenKind::RightBracket])
        {
            return Ok(None);
        }

        self.disjunction()
    }

    // disjunction = conjunction { "or" conjunction }
    fn disjunction(&mut self) -> Result<Option<Detached>, FilterError> {
        let mut operands: Vec<Detached> = self.conjunction()?.into_iter().collect();

        while self.stream.is_next(&[TokenKind::Or]) {
            self.stream.match_next(&[TokenKind::Or])?;
            operands.extend(self.conjunction()?);
        }

        self.combine(operands, FilterBuilder::disjunction)
    }

    // conjunction = factor { "and" factor }
    fn conjunction(&mut self) -> Result<Option<Detached>, FilterError> {
        let mut operands: Vec<Detached> = self.factor()?.into_iter().collect();

        while self.stream.is_next(&[TokenKind::And]) {
            self.stream.match_next(&[TokenKind::And])?;
            operands.extend(self.factor()?);
        }

        self.combine(operands, FilterBuilder::conjunction)
    }

    /// A single operand stays as is; only two or more get a wrapper node.
    fn combine(
        &mut self,
        mut operands: Vec<Detached>,
        wrap: fn(&mut FilterBuilder, Vec<Detached>) -> Result<Option<Detached>, FilterError>,
    ) -> Result<Option<Detached>, FilterError> {
        if operands.len() < 2 {
            return Ok(operands.pop());
        }
        wrap(&mut self.builder, operands)
    }

    // factor = "not" factor | "(" filter ")" | comparison
    fn factor(&mut self) -> Result<Option<Detached>, FilterError> {
        let kind = self.stream.peek_kind().ok_or(FilterError::UnexpectedEnd)?;

        match kind {
            TokenKind::Not => self.negation(),
            TokenKind::LeftParen => self.group(),
            TokenKind::Identifier | TokenKind::SchemaUri => self.comparison().map(Some),
            _ => Err(match self.stream.peek() {
                Some(token) => FilterError::ExpectedExpression {
                    found: token.raw().to_string(),
                    position: token.position(),
                },
                None => FilterError::UnexpectedEnd,
            }),
        }
    }

    fn negation(&mut self) -> Result<Option<Detached>, FilterError> {
        let checkpoint = self.stream.checkpoint();
        let not = self.stream.match_next(&[TokenKind::Not])?;

        // `not pr`: here "not" is an attribute name, not a negation
        if self.stream.is_next(&[TokenKind::Operator]) {
            self.stream.restore(checkpoint);
            return self.comparison().map(Some);
        }

        let inner = self.nested(not.position(), Self::factor)?;
        inner.map(|child| self.builder.negation(child)).transpose()
    }

    fn group(&mut self) -> Result<Option<Detached>, FilterError> {
        let open = self.stream.match_next(&[TokenKind::LeftParen])?;
        let inner = self.nested(open.position(), Self::filter)?;
        self.stream.match_next(&[TokenKind::RightParen])?;
        Ok(inner)
    }

    // comparison = attributePath [ compareOp [ compValue ] ]
    fn comparison(&mut self) -> Result<Detached, FilterError> {
        let path = self.attribute_path()?;

        // A bare value path such as `emails[type eq "work"]`
        if !self.stream.is_next(&[TokenKind::Operator]) {
            return Ok(path.into());
        }

        let token = self.stream.match_next(&[TokenKind::Operator])?;
        let operator = Operator::from_keyword(token.text()).ok_or_else(|| unexpected(&token))?;

        let value = if operator.takes_value() {
            Some(self.literal()?)
        } else {
            None
        };

        self.builder.comparison(path, operator, value)
    }

    fn attribute_path(&mut self) -> Result<DetachedPath, FilterError> {
        let schema = if self.stream.is_next(&[TokenKind::SchemaUri]) {
            let uri = self.stream.match_next(&[TokenKind::SchemaUri])?;
            self.stream.match_next(&[TokenKind::Colon])?;
            Some(uri.text().to_string())
        } else {
            None
        };

        let mut segments = vec![self.segment(&[TokenKind::Identifier, TokenKind::Not])?];
        while self.stream.is_next(&[TokenKind::Dot]) {
            self.stream.match_next(&[TokenKind::Dot])?;
            segments.push(self.segment(&[TokenKind::Identifier])?);
        }

        let mut path = AttributePath::new(segments)?;
        if let Some(schema) = schema {
            path = path.with_schema(schema);
        }

        if !self.stream.is_next(&[TokenKind::LeftBracket]) {
            return self.builder.attribute_path(path, None);
        }

        let open = self.stream.match_next(&[TokenKind::LeftBracket])?;
        let filter = self.nested(open.position(), Self::filter)?;
        self.stream.match_next(&[TokenKind::RightBracket])?;

        if self.stream.is_next(&[TokenKind::Dot]) {
            self.stream.match_next(&[TokenKind::Dot])?;
            path = path.with_sub_attribute(self.segment(&[TokenKind::Identifier])?);
        }

        self.builder.attribute_path(path, filter)
    }

    fn segment(&mut self, kinds: &[TokenKind]) -> Result<String, FilterError> {
        let token = self.stream.match_next(kinds)?;
        Ok(token.text().to_string())
    }

    fn literal(&mut self) -> Result<Value, FilterError> {
        let token = self.stream.match_next(TokenKind::LITERALS)?;

        let value = match token.kind() {
            TokenKind::String => serde_json::from_str::<String>(token.text())
                .map(Value::String)
                .map_err(|_| lexical(&token))?,
            TokenKind::Number => token
                .text()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .ok_or_else(|| lexical(&token))?,
            TokenKind::True => Value::Boolean(true),
            TokenKind::False => Value::Boolean(false),
            TokenKind::Null => Value::Null,
            _ => return Err(unexpected(&token)),
        };

        Ok(value)
    }

    /// Run `production` one nesting level deeper.
    fn nested<T>(
        &mut self,
        position: Position,
        production: impl FnOnce(&mut Self) -> Result<T, FilterError>,
    ) -> Result<T, FilterError> {
        if self.depth >= self.max_depth {
            return Err(FilterError::TooDeep {
                max: self.max_depth,
                position,
            });
        }

        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }
}

fn unexpected(token: &Token) -> FilterError {
    FilterError::UnexpectedToken {
        text: token.text().to_string(),
        position: token.position(),
    }
}

fn lexical(token: &Token) -> FilterError {
    FilterError::Lexical {
        text: token.text().to_string(),
        position: token.position(),
    }
}

// =============================================================================
// Tests
// =============================================================================
