//! Cursor over tokenized filter input.

use super::{
    error::FilterError,
    token::{Token, TokenKind},
};

/// Saved cursor position, see [`Stream::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// An ordered token sequence with a single read cursor.
///
/// Consumption is expectation-checked: [`Stream::match_next`] only hands out a
/// token of a kind the caller asked for.
#[derive(Debug, Clone)]
pub struct Stream {
    tokens: Vec<Token>,
    position: usize,
}

impl Stream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Consume the next token if its kind is one of `expected`.
    ///
    /// # Errors
    ///
    /// - [`FilterError::UnexpectedEnd`] if no token is left.
    /// - [`FilterError::UnexpectedToken`] with the token's text and position
    ///   if its kind is not in `expected`.
    pub fn match_next(&mut self, expected: &[TokenKind]) -> Result<Token, FilterError> {
        let token = self.tokens.get(self.position).ok_or(FilterError::UnexpectedEnd)?;

        if !expected.contains(&token.kind()) {
            return Err(unexpected(token));
        }

        self.position += 1;
        Ok(token.clone())
    }

    /// Next token, without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(Token::kind)
    }

    /// Whether the next token is of one of the given kinds.
    pub fn is_next(&self, kinds: &[TokenKind]) -> bool {
        self.peek_kind().is_some_and(|kind| kinds.contains(&kind))
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    /// Rewind (or fast-forward) the cursor to a saved position.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.0.min(self.tokens.len());
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &[Token] {
        &self.tokens[self.position.min(self.tokens.len())..]
    }

    /// # Errors
    ///
    /// Returns [`FilterError::UnexpectedToken`] for the first unconsumed token.
    pub fn expect_end(&self) -> Result<(), FilterError> {
        match self.peek() {
            Some(token) => Err(unexpected(token)),
            None => Ok(()),
        }
    }
}

fn unexpected(token: &Token) -> FilterError {
    FilterError::UnexpectedToken {
        text: token.text().to_string(),
        position: token.position(),
    }
}
