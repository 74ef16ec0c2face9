//! Direct DFA construction from regular-expression syntax trees
//!
//! This library implements the classical position (followpos) method: an
//! augmented regular-expression syntax tree is annotated with `nullable`,
//! `firstpos` and `lastpos` attributes plus a global followpos table, and a
//! deterministic finite automaton is built directly from those attributes,
//! without an intermediate NFA or epsilon closures.
//!
//! The pipeline is:
//! - build a syntax tree with [`TreeBuilder`] (or translate one from a
//!   `regex-syntax` parse with [`translate`] / [`parse`])
//! - evaluate attributes and followpos with [`SyntaxTree::analyze`]
//! - construct a [`Dfa`] with [`Dfa::from_tree`]
//! - optionally compute a coarsest partition with [`minimize`]
//! - run inputs through a [`Simulator`]
//!
//! State identity in the DFA is structural: a state *is* its set of leaf
//! positions, so independently discovered equal sets always collapse into a
//! single state. Minimization reports the final Myhill-Nerode partition; it
//! does not build the quotient automaton.

pub mod dfa;
pub mod minimize;
pub mod report;
pub mod simulate;
pub mod syntax;
pub mod translate;

pub use dfa::{Dfa, StateId};
pub use minimize::{minimize, refine_round, Block, Minimization, Split};
pub use simulate::{Simulation, Simulator, TraceStep, Verdict};
pub use syntax::{
    AttributedTree, Attributes, NodeId, Position, PositionSet, Symbol, SyntaxNode, SyntaxTree,
    TreeBuilder,
};
pub use translate::{parse, translate};

/// The result of building or translating a syntax tree
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that can occur while building a syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A node id does not refer to a node of this builder
    InvalidNode(NodeId),
    /// The textual pattern did not parse
    InvalidPattern(String),
    /// The pattern uses a feature the position method cannot express here
    UnsupportedFeature(String),
    /// The pattern would expand into too many leaf positions
    TooComplex,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::InvalidNode(id) => write!(f, "node id {} is not part of this tree", id),
            BuildError::InvalidPattern(msg) => write!(f, "invalid pattern: {}", msg),
            BuildError::UnsupportedFeature(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
            BuildError::TooComplex => write!(f, "pattern expands into too many positions"),
        }
    }
}

impl std::error::Error for BuildError {}
