//! Filter parsing errors.
//!
//! Every failure raised while tokenizing, walking the token stream or applying
//! the grammar ends up as a [`FilterError`]. Parsing is all-or-nothing: an error
//! means no tree was produced.

use super::{ast::Operator, token::Position};

/// Errors raised while turning a filter string into a syntax tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// The tokenizer found a character sequence that is not part of the
    /// filter language (stray characters, unterminated strings, bad escapes).
    #[error("Unrecognized \"{text}\" on {position}.")]
    Lexical { text: String, position: Position },

    /// A token was present but its kind was not among the expected ones.
    #[error("Unexpected \"{text}\" on {position}.")]
    UnexpectedToken { text: String, position: Position },

    /// A token was required but the input had already been consumed.
    #[error("Unexpected end of string.")]
    UnexpectedEnd,

    /// No expression can start with the token at this position.
    #[error("Expected an attribute/value path, opening parenthesis or a negation, got '{found}'.")]
    ExpectedExpression { found: String, position: Position },

    /// The raw filter is longer than [`ParserOptions::max_length`](super::ParserOptions).
    #[error("Filter exceeds maximum length ({length} bytes, max {max})")]
    TooLong { length: usize, max: usize },

    /// Groups, negations and value filters are nested deeper than
    /// [`ParserOptions::max_depth`](super::ParserOptions).
    #[error("Filter exceeds maximum nesting depth ({max}) on {position}.")]
    TooDeep { max: usize, position: Position },

    /// A comparison was built with a value for `pr`, or without one for any
    /// other operator.
    #[error("Operator '{operator}' {}", arity_phrase(.operator))]
    OperatorArity { operator: Operator },

    /// An attribute path was given no segments, or an empty segment name.
    #[error("Attribute path must have at least one non-empty segment.")]
    EmptyAttributePath,

    /// A builder was handed a node created by a different builder.
    #[error("Node belongs to a different filter builder.")]
    ForeignNode,
}

impl FilterError {
    /// Source position the error points at, when it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            FilterError::Lexical { position, .. }
            | FilterError::UnexpectedToken { position, .. }
            | FilterError::ExpectedExpression { position, .. }
            | FilterError::TooDeep { position, .. } => Some(*position),
            FilterError::UnexpectedEnd
            | FilterError::TooLong { .. }
            | FilterError::OperatorArity { .. }
            | FilterError::EmptyAttributePath
            | FilterError::ForeignNode => None,
        }
    }

    /// Whether the error was raised before the grammar was applied.
    pub fn is_lexical(&self) -> bool {
        matches!(self, FilterError::Lexical { .. } | FilterError::TooLong { .. })
    }
}

fn arity_phrase(operator: &Operator) -> &'static str {
    if operator.takes_value() {
        "requires a value"
    } else {
        "takes no value"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let err = FilterError::UnexpectedToken {
            text: "eq".to_string(),
            position: Position::new(1, 9),
        };
        assert_eq!(err.to_string(), "Unexpected \"eq\" on line 1, column 9.");
        assert_eq!(err.position(), Some(Position::new(1, 9)));
    }

    #[test]
    fn test_unexpected_end_message() {
        assert_eq!(
            FilterError::UnexpectedEnd.to_string(),
            "Unexpected end of string."
        );
        assert_eq!(FilterError::UnexpectedEnd.position(), None);
    }

    #[test]
    fn test_expected_expression_message() {
        let err = FilterError::ExpectedExpression {
            found: " and ".to_string(),
            position: Position::new(1, 2),
        };
        assert_eq!(
            err.to_string(),
            "Expected an attribute/value path, opening parenthesis or a negation, got ' and '."
        );
    }

    #[test]
    fn test_operator_arity_message() {
        let err = FilterError::OperatorArity {
            operator: Operator::Pr,
        };
        assert_eq!(err.to_string(), "Operator 'pr' takes no value");

        let err = FilterError::OperatorArity {
            operator: Operator::Eq,
        };
        assert_eq!(err.to_string(), "Operator 'eq' requires a value");
    }

    #[test]
    fn test_is_lexical() {
        assert!(
            FilterError::TooLong {
                length: 5000,
                max: 4096
            }
            .is_lexical()
        );
        assert!(!FilterError::UnexpectedEnd.is_lexical());
    }
}
