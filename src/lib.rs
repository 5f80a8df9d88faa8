//! Earley parsing into shared packed parse forests, and lazy enumeration of
//! the derivation trees those forests hold.
//!
//! ```text
//! let grammar = Grammar::from_bnf("S ::= S S | 'a' ;")?;
//! let parser = EarleyParser::new(grammar, |t: &String| t.clone())?;
//! let result = parser.parse(&input);
//! for tree in result.trees(&tokens, TreeMaker) { ... }
//! ```
//!
//! Grammars are generic over the terminal type `T` and nonterminal type `N`.
//! The input handed to [`EarleyParser::parse`] is a slice of terminals; the
//! tokens handed to the enumerator line up with it one-to-one and are what
//! ends up in the leaves of the trees (a word and its part of speech, say).

#[macro_use]
extern crate lalrpop_util;

lalrpop_mod!(bnf); // synthesized by LALRPOP

pub mod earley;
pub mod enumerate;
pub mod grammar;
pub mod node;

mod display;
mod rendering;

pub use earley::{EarleyParser, Item, ItemSet, ParseResult};
pub use enumerate::{TreeBuilder, TreeFns, Trees};
pub use grammar::{Grammar, Rule, Symbol};
pub use node::{Family, Forest, Label, NodeId, SppfNode, Tree, TreeMaker};
pub use rendering::Rendered;

/// Why a grammar was refused.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("start symbol {start} heads no rule")]
    MissingStart { start: String },
    #[error("rule {rule} mentions {nonterminal}, which heads no rule")]
    UndeclaredNonterminal { rule: usize, nonterminal: String },
    #[error("grammar has no rules")]
    Empty,
    #[error("grammar syntax: {0}")]
    Syntax(String),
}
