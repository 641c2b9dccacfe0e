//! Conditional attribute rewriting for Graphviz DOT graphs.
//!
//! A graph is read with [`parse`] into a normalized [`Graph`]:
//! unique nodes, single edges and root graph attributes,
//! together with enough of the original statements to write it back through [`std::fmt::Display`].
//!
//! [`Rule`]s select elements by matching their attribute values against regexes
//! and set attributes to [`Template`]s, in which `%name%` stands for the value of another attribute.
//! Rules come from command-line groups ([`Rule::from_args`]) or from a style file ([`Stylesheet`]).
//! [`rewrite`] computes the effect of a list of rules on one element from a snapshot of its attributes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod graph;
mod lexer;
mod parser;
mod rewrite;
mod rules;
mod template;
mod writer;

pub use graph::{Attributes, Edge, Endpoint, Graph, Id, Node, Target};
pub use parser::parse;
pub use rewrite::*;
pub use rules::*;
pub use template::*;

use thiserror::Error;
use xtools_core::JsonError;

/// The error type for reading DOT graphs.
#[derive(Debug, Error)]
pub enum DotError {
    /// Input that is not a DOT token.
    #[error("line {line}: unexpected '{text}'")]
    Lex {
        /// Line of the offending text.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// Tokens that do not form a DOT graph.
    #[error("line {line}: unexpected {found}")]
    Parse {
        /// Line of the offending token.
        line: usize,
        /// The offending token.
        found: String,
    },
    /// `->` in an undirected graph or `--` in a digraph.
    #[error("edge operator does not match the kind of graph (directed: {directed})")]
    EdgeOp {
        /// Whether the graph is a digraph.
        directed: bool,
    },
}

/// The error type for building rewrite rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Reading a style file failed.
    #[error(transparent)]
    Json(#[from] JsonError),
    /// A command-line rule group without arguments.
    #[error("missing condition")]
    MissingCondition,
    /// A space outside quotes in a command-line condition.
    #[error("space outside quotes in '{0}'")]
    Space(String),
    /// An unterminated quote in a command-line condition.
    #[error("unbalanced quote in '{0}'")]
    Quote(String),
    /// An argument that is not of the form `attr=value`.
    #[error("expected 'attribute=value', found '{0}'")]
    Assignment(String),
    /// A style file condition with an empty attribute or pattern.
    #[error("condition with empty arguments in rule '{0}'")]
    EmptyCondition(String),
    /// A condition pattern that is not a valid regex.
    #[error("invalid pattern for attribute '{attribute}'")]
    Regex {
        /// Attribute of the condition.
        attribute: String,
        /// Regex error.
        source: regex::Error,
    },
}
