//! SCIM 2.0 Filter Expressions
//!
//! Parses the filter language of SCIM 2.0 (System for Cross-domain Identity
//! Management) into a syntax tree whose nodes know their parents.
//!
//! ## RFC References
//!
//! - RFC 7644 Section 3.4.2.2: Filtering
//!
//! ## Module Structure
//!
//! - [`token`]: Tokenizer turning filter text into positioned tokens
//! - [`stream`]: Expectation-checked cursor over the token sequence
//! - [`parser`]: Recursive-descent grammar and resource limits
//! - [`ast`]: Arena-backed tree with parent links and ancestor queries
//! - [`error`]: Errors raised at every stage

pub mod ast;
pub mod error;
pub mod parser;
pub mod stream;
pub mod token;

pub use ast::{
    Ancestors, AttributePath, Comparison, Conjunction, Detached, DetachedPath, Disjunction,
    Filter, FilterBuilder, Negation, Node, NodeId, NodeKind, NodeRef, Operator, ParentQuery,
    Value,
};
pub use error::FilterError;
pub use parser::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH, Parser, ParserOptions, parse};
pub use stream::{Checkpoint, Stream};
pub use token::{Position, Token, TokenKind, Tokenizer, tokenize};
