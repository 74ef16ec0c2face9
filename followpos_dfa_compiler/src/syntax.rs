//! Augmented regular-expression syntax trees and their attributes
//!
//! Nodes live in an arena (`Vec<SyntaxNode>` indexed by [`NodeId`]), built
//! through a [`TreeBuilder`] that owns the position counter and the leaf
//! registry. Sealing a builder appends the reserved end-marker leaf, after
//! which the tree is read-only. [`SyntaxTree::analyze`] evaluates `nullable`,
//! `firstpos` and `lastpos` for every node in one postorder pass and fills
//! the followpos table in a second, producing an immutable
//! [`AttributedTree`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{BuildError, BuildResult};

/// Index of a node in the tree arena
pub type NodeId = usize;

/// Unique integer identifying one leaf, assigned in construction order from 1
pub type Position = usize;

/// An ordered set of leaf positions
///
/// `BTreeSet` gives the canonical sorted representation the DFA relies on for
/// structural state identity.
pub type PositionSet = BTreeSet<Position>;

/// An alphabet symbol labelling a leaf
///
/// Symbols are opaque names: a leaf may stand for a single character (`"a"`)
/// or for a lexical category (`"DIGIT"`). The name `#` is reserved for the
/// end-of-string marker appended when a tree is sealed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// The reserved end-of-string marker name
    pub const END_MARKER: &'static str = "#";

    /// Create a symbol from a name
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    /// The reserved end-of-string marker symbol
    pub fn end_marker() -> Self {
        Symbol(Self::END_MARKER.to_string())
    }

    /// Whether this symbol is the reserved end marker
    pub fn is_end_marker(&self) -> bool {
        self.0 == Self::END_MARKER
    }

    /// The symbol's name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<char> for Symbol {
    fn from(ch: char) -> Self {
        Symbol(ch.to_string())
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol(name.to_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node of the augmented syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// A terminal carrying an alphabet symbol and its unique position
    Leaf { symbol: Symbol, position: Position },

    /// The empty-string leaf; nullable, contributes no positions
    Epsilon,

    /// Concatenation of two subtrees
    Concat { left: NodeId, right: NodeId },

    /// Kleene closure of a subtree
    Star { operand: NodeId },

    /// Alternation of two subtrees
    Union { left: NodeId, right: NodeId },
}

/// Computed attributes of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Whether the subtree's language contains the empty string
    pub nullable: bool,
    /// Positions that can match first in the subtree
    pub firstpos: PositionSet,
    /// Positions that can match last in the subtree
    pub lastpos: PositionSet,
}

/// Builder context owning the arena, the position counter and the leaf
/// registry during tree construction
///
/// Combinator methods return [`NodeId`]s that feed later combinators; the
/// builder is consumed by [`TreeBuilder::seal`], which appends the end-marker
/// leaf and yields the finished read-only [`SyntaxTree`].
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
    leaves: BTreeMap<Position, Symbol>,
    next_position: Position,
}

impl TreeBuilder {
    /// Create an empty builder; positions are assigned from 1
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            leaves: BTreeMap::new(),
            next_position: 1,
        }
    }

    fn add_node(&mut self, node: SyntaxNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Create a terminal leaf for `symbol`, assigning it the next position
    pub fn leaf(&mut self, symbol: impl Into<Symbol>) -> NodeId {
        let symbol = symbol.into();
        let position = self.next_position;
        self.next_position += 1;
        self.leaves.insert(position, symbol.clone());
        self.add_node(SyntaxNode::Leaf { symbol, position })
    }

    /// Create an empty-string leaf
    pub fn epsilon(&mut self) -> NodeId {
        self.add_node(SyntaxNode::Epsilon)
    }

    /// Create a concatenation node
    pub fn concat(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add_node(SyntaxNode::Concat { left, right })
    }

    /// Create a star node
    pub fn star(&mut self, operand: NodeId) -> NodeId {
        self.add_node(SyntaxNode::Star { operand })
    }

    /// Create a union node
    pub fn union(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add_node(SyntaxNode::Union { left, right })
    }

    /// Number of leaf positions assigned so far
    pub fn position_count(&self) -> usize {
        self.next_position - 1
    }

    /// Append `Concat(root, Leaf(#))` and finish the tree
    ///
    /// Every node id reachable from `root` is validated here, so analysis of
    /// a sealed tree cannot encounter a missing subtree.
    pub fn seal(mut self, root: NodeId) -> BuildResult<SyntaxTree> {
        self.check(root)?;
        let end = self.leaf(Symbol::end_marker());
        let end_position = self.next_position - 1;
        let sealed_root = self.concat(root, end);
        Ok(SyntaxTree {
            nodes: self.nodes,
            leaves: self.leaves,
            root: sealed_root,
            end_position,
        })
    }

    fn check(&self, id: NodeId) -> BuildResult<()> {
        match self.nodes.get(id) {
            None => Err(BuildError::InvalidNode(id)),
            Some(SyntaxNode::Leaf { .. }) | Some(SyntaxNode::Epsilon) => Ok(()),
            Some(SyntaxNode::Star { operand }) => self.check(*operand),
            Some(SyntaxNode::Concat { left, right }) | Some(SyntaxNode::Union { left, right }) => {
                self.check(*left)?;
                self.check(*right)
            }
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A sealed, read-only syntax tree with its end marker appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    leaves: BTreeMap<Position, Symbol>,
    root: NodeId,
    end_position: Position,
}

impl SyntaxTree {
    /// The root node id (the sealing concatenation)
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id]
    }

    /// Position → symbol table for every leaf, end marker included
    pub fn leaves(&self) -> &BTreeMap<Position, Symbol> {
        &self.leaves
    }

    /// The symbol at a leaf position
    pub fn symbol_at(&self, position: Position) -> Option<&Symbol> {
        self.leaves.get(&position)
    }

    /// The reserved end-marker position
    pub fn end_position(&self) -> Position {
        self.end_position
    }

    /// Distinct leaf symbols, end marker excluded
    pub fn alphabet(&self) -> BTreeSet<Symbol> {
        self.leaves
            .values()
            .filter(|symbol| !symbol.is_end_marker())
            .cloned()
            .collect()
    }

    /// Evaluate nullable/firstpos/lastpos and the followpos table
    ///
    /// Attributes are computed strictly postorder, so a node is only
    /// evaluated once both children are; followpos is filled in a second
    /// postorder pass over the finished attributes. Sealing already validated
    /// every node id, so evaluation cannot fail.
    pub fn analyze(self) -> AttributedTree {
        let mut attrs = BTreeMap::new();
        eval_attributes(&self, self.root, &mut attrs);

        // every position owns a (possibly empty) followpos entry
        let mut followpos: BTreeMap<Position, PositionSet> = self
            .leaves
            .keys()
            .map(|&position| (position, PositionSet::new()))
            .collect();
        fill_followpos(&self, self.root, &attrs, &mut followpos);

        AttributedTree {
            tree: self,
            attrs,
            followpos,
        }
    }
}

fn eval_attributes(
    tree: &SyntaxTree,
    id: NodeId,
    attrs: &mut BTreeMap<NodeId, Attributes>,
) -> Attributes {
    let computed = match tree.node(id) {
        SyntaxNode::Leaf { position, .. } => Attributes {
            nullable: false,
            firstpos: PositionSet::from([*position]),
            lastpos: PositionSet::from([*position]),
        },
        SyntaxNode::Epsilon => Attributes {
            nullable: true,
            firstpos: PositionSet::new(),
            lastpos: PositionSet::new(),
        },
        SyntaxNode::Concat { left, right } => {
            let l = eval_attributes(tree, *left, attrs);
            let r = eval_attributes(tree, *right, attrs);
            Attributes {
                nullable: l.nullable && r.nullable,
                firstpos: if l.nullable {
                    union(&l.firstpos, &r.firstpos)
                } else {
                    l.firstpos
                },
                lastpos: if r.nullable {
                    union(&l.lastpos, &r.lastpos)
                } else {
                    r.lastpos
                },
            }
        }
        SyntaxNode::Star { operand } => {
            let x = eval_attributes(tree, *operand, attrs);
            // unconditionally nullable, regardless of the operand
            Attributes {
                nullable: true,
                firstpos: x.firstpos,
                lastpos: x.lastpos,
            }
        }
        SyntaxNode::Union { left, right } => {
            let l = eval_attributes(tree, *left, attrs);
            let r = eval_attributes(tree, *right, attrs);
            Attributes {
                nullable: l.nullable || r.nullable,
                firstpos: union(&l.firstpos, &r.firstpos),
                lastpos: union(&l.lastpos, &r.lastpos),
            }
        }
    };
    attrs.insert(id, computed.clone());
    computed
}

fn fill_followpos(
    tree: &SyntaxTree,
    id: NodeId,
    attrs: &BTreeMap<NodeId, Attributes>,
    followpos: &mut BTreeMap<Position, PositionSet>,
) {
    match tree.node(id) {
        SyntaxNode::Leaf { .. } | SyntaxNode::Epsilon => {}
        SyntaxNode::Concat { left, right } => {
            fill_followpos(tree, *left, attrs, followpos);
            fill_followpos(tree, *right, attrs, followpos);
            let first_of_right = &attrs[right].firstpos;
            for &position in &attrs[left].lastpos {
                extend(followpos, position, first_of_right);
            }
        }
        SyntaxNode::Star { operand } => {
            fill_followpos(tree, *operand, attrs, followpos);
            let node_attrs = &attrs[&id];
            for &position in &node_attrs.lastpos {
                extend(followpos, position, &node_attrs.firstpos);
            }
        }
        SyntaxNode::Union { left, right } => {
            fill_followpos(tree, *left, attrs, followpos);
            fill_followpos(tree, *right, attrs, followpos);
        }
    }
}

fn union(a: &PositionSet, b: &PositionSet) -> PositionSet {
    a.union(b).copied().collect()
}

fn extend(followpos: &mut BTreeMap<Position, PositionSet>, position: Position, with: &PositionSet) {
    followpos
        .entry(position)
        .or_default()
        .extend(with.iter().copied());
}

/// A syntax tree together with its evaluated attributes and followpos table
///
/// Produced once by [`SyntaxTree::analyze`] and read-only afterwards; the DFA
/// constructor, the reports and the tests all consume this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedTree {
    tree: SyntaxTree,
    attrs: BTreeMap<NodeId, Attributes>,
    followpos: BTreeMap<Position, PositionSet>,
}

impl AttributedTree {
    /// The underlying tree
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Attributes of one node, if the id belongs to this tree
    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        self.attrs.get(&id)
    }

    /// Attributes of the root node
    pub fn root_attributes(&self) -> &Attributes {
        &self.attrs[&self.tree.root]
    }

    /// The positions that can immediately follow `position`
    pub fn followpos(&self, position: Position) -> Option<&PositionSet> {
        self.followpos.get(&position)
    }

    /// The whole followpos table, keyed by position
    pub fn followpos_table(&self) -> &BTreeMap<Position, PositionSet> {
        &self.followpos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(positions: &[Position]) -> PositionSet {
        positions.iter().copied().collect()
    }

    /// `(a|b)*abb` with the end marker as position 6
    fn dragon_tree() -> AttributedTree {
        let mut b = TreeBuilder::new();
        let a1 = b.leaf('a');
        let b2 = b.leaf('b');
        let alt = b.union(a1, b2);
        let closure = b.star(alt);
        let a3 = b.leaf('a');
        let b4 = b.leaf('b');
        let b5 = b.leaf('b');
        let c1 = b.concat(closure, a3);
        let c2 = b.concat(c1, b4);
        let c3 = b.concat(c2, b5);
        b.seal(c3).unwrap().analyze()
    }

    #[test]
    fn leaf_attributes() {
        let mut b = TreeBuilder::new();
        let leaf = b.leaf('a');
        let tree = b.seal(leaf).unwrap().analyze();
        let attrs = tree.attributes(0).unwrap();
        assert!(!attrs.nullable);
        assert_eq!(attrs.firstpos, set(&[1]));
        assert_eq!(attrs.lastpos, set(&[1]));
    }

    #[test]
    fn epsilon_attributes() {
        let mut b = TreeBuilder::new();
        let eps = b.epsilon();
        let tree = b.seal(eps).unwrap().analyze();
        let attrs = tree.attributes(eps).unwrap();
        assert!(attrs.nullable);
        assert!(attrs.firstpos.is_empty());
        assert!(attrs.lastpos.is_empty());
        // sealed root firstpos falls through to the end marker
        assert_eq!(tree.root_attributes().firstpos, set(&[1]));
    }

    #[test]
    fn star_is_always_nullable() {
        let mut b = TreeBuilder::new();
        let leaf = b.leaf('a');
        let closure = b.star(leaf);
        let tree = b.seal(closure).unwrap().analyze();
        assert!(tree.attributes(closure).unwrap().nullable);
    }

    #[test]
    fn union_attributes() {
        let mut b = TreeBuilder::new();
        let a = b.leaf('a');
        let eps = b.epsilon();
        let alt = b.union(a, eps);
        let tree = b.seal(alt).unwrap().analyze();
        let attrs = tree.attributes(alt).unwrap();
        assert!(attrs.nullable);
        assert_eq!(attrs.firstpos, set(&[1]));
        assert_eq!(attrs.lastpos, set(&[1]));
    }

    #[test]
    fn concat_skips_into_right_when_left_nullable() {
        let mut b = TreeBuilder::new();
        let a = b.leaf('a');
        let closure = b.star(a);
        let c = b.leaf('b');
        let cat = b.concat(closure, c);
        let tree = b.seal(cat).unwrap().analyze();
        let attrs = tree.attributes(cat).unwrap();
        assert!(!attrs.nullable);
        assert_eq!(attrs.firstpos, set(&[1, 2]));
        assert_eq!(attrs.lastpos, set(&[2]));
    }

    #[test]
    fn dragon_book_followpos() {
        let tree = dragon_tree();
        assert_eq!(tree.root_attributes().firstpos, set(&[1, 2, 3]));
        assert_eq!(tree.followpos(1), Some(&set(&[1, 2, 3])));
        assert_eq!(tree.followpos(2), Some(&set(&[1, 2, 3])));
        assert_eq!(tree.followpos(3), Some(&set(&[4])));
        assert_eq!(tree.followpos(4), Some(&set(&[5])));
        assert_eq!(tree.followpos(5), Some(&set(&[6])));
        assert_eq!(tree.followpos(6), Some(&set(&[])));
    }

    #[test]
    fn end_marker_is_reserved_and_excluded_from_alphabet() {
        let tree = dragon_tree();
        assert_eq!(tree.tree().end_position(), 6);
        assert!(tree.tree().symbol_at(6).unwrap().is_end_marker());
        let alphabet = tree.tree().alphabet();
        assert_eq!(alphabet.len(), 2);
        assert!(!alphabet.contains(&Symbol::end_marker()));
    }

    #[test]
    fn seal_rejects_foreign_node_id() {
        let b = TreeBuilder::new();
        assert_eq!(b.seal(7), Err(BuildError::InvalidNode(7)));
    }
}
