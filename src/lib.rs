//! Parser for SCIM 2.0 filter expressions (RFC 7644 Section 3.4.2.2).
//!
//! [`parse`] turns a filter string such as
//! `userName eq "bjensen" and not (emails[type eq "work"] pr)` into a
//! [`Filter`]: an immutable syntax tree whose nodes can be walked downwards
//! through their children and upwards through their parents.
//!
//! ```
//! use scim_filter::{NodeKind, parse};
//!
//! let filter = parse("title pr and not (userType eq \"Intern\")")
//!     .unwrap()
//!     .unwrap();
//!
//! let negation = filter.root().child(1).unwrap();
//! let comparison = negation.child(0).unwrap();
//! assert!(comparison.has_parent_matching(NodeKind::Negation, false));
//! assert!(comparison.has_parent_matching(NodeKind::Conjunction, true));
//! assert!(!comparison.has_parent_matching(NodeKind::Conjunction, false));
//! ```
//!
//! The lower layers are public too: [`tokenize`] and [`Stream`] can drive the
//! grammar from a larger language through [`Parser::parse_stream`].

#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "cli")]
pub mod observability;
pub mod scim;

pub use scim::{
    AttributePath, Checkpoint, Comparison, Conjunction, Disjunction, Filter, FilterBuilder,
    FilterError, Negation, Node, NodeId, NodeKind, NodeRef, Operator, ParentQuery, Parser,
    ParserOptions, Position, Stream, Token, TokenKind, Tokenizer, Value, parse, tokenize,
};
