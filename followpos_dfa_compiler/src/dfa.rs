//! Direct DFA construction over leaf positions
//!
//! A DFA state is a set of leaf positions; the start state is the root's
//! firstpos and the successor of a state on symbol `a` is the union of
//! `followpos(p)` over the member positions labelled `a`. Position sets are
//! interned through a map keyed by their canonical sorted representation, so
//! two computations that reach the same set always name the same state.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::syntax::{AttributedTree, PositionSet, Symbol};

/// Dense index of a DFA state, in discovery order; state 0 is the start
pub type StateId = usize;

/// A deterministic finite automaton built from an attributed syntax tree
///
/// Immutable after construction. The minimizer and the simulator only read
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<PositionSet>,
    alphabet: BTreeSet<Symbol>,
    transitions: BTreeMap<(StateId, Symbol), StateId>,
    accepting: BTreeSet<StateId>,
}

impl Dfa {
    /// Build the DFA for an attributed tree
    ///
    /// Work-list construction to a fixed point: each discovered state is
    /// expanded once per alphabet symbol, and newly seen position sets are
    /// appended in discovery order. The alphabet is iterated in sorted order
    /// so discovery order is reproducible, but the resulting transitions and
    /// accepting set do not depend on it. An empty start firstpos yields a
    /// degenerate single-state automaton that accepts nothing.
    pub fn from_tree(tree: &AttributedTree) -> Self {
        let alphabet = tree.tree().alphabet();
        let end_position = tree.tree().end_position();

        let start = tree.root_attributes().firstpos.clone();
        let mut states = vec![start.clone()];
        let mut index: HashMap<PositionSet, StateId> = HashMap::new();
        index.insert(start, 0);
        let mut transitions = BTreeMap::new();
        let mut accepting = BTreeSet::new();
        if states[0].contains(&end_position) {
            accepting.insert(0);
        }

        let mut current = 0;
        while current < states.len() {
            let state = states[current].clone();

            for symbol in &alphabet {
                let mut target = PositionSet::new();
                for &position in &state {
                    if tree.tree().symbol_at(position) == Some(symbol) {
                        if let Some(follow) = tree.followpos(position) {
                            target.extend(follow.iter().copied());
                        }
                    }
                }
                if target.is_empty() {
                    continue;
                }

                let target_id = match index.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        debug!("discovered state S{} = {:?}", id, target);
                        if target.contains(&end_position) {
                            accepting.insert(id);
                        }
                        index.insert(target.clone(), id);
                        states.push(target);
                        id
                    }
                };
                transitions.insert((current, symbol.clone()), target_id);
            }
            current += 1;
        }

        Dfa {
            states,
            alphabet,
            transitions,
            accepting,
        }
    }

    /// The start state
    pub fn start(&self) -> StateId {
        0
    }

    /// All states in discovery order
    pub fn states(&self) -> &[PositionSet] {
        &self.states
    }

    /// The position set of one state
    pub fn state(&self, id: StateId) -> &PositionSet {
        &self.states[id]
    }

    /// Number of states
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The alphabet, end marker excluded, in canonical sorted order
    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    /// The transition table
    pub fn transitions(&self) -> &BTreeMap<(StateId, Symbol), StateId> {
        &self.transitions
    }

    /// The successor of `from` on `symbol`, if any
    pub fn transition(&self, from: StateId, symbol: &Symbol) -> Option<StateId> {
        self.transitions.get(&(from, symbol.clone())).copied()
    }

    /// The accepting states
    pub fn accepting(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    /// Whether `id` is accepting
    pub fn is_accepting(&self, id: StateId) -> bool {
        self.accepting.contains(&id)
    }
}

#[cfg(test)]
pub(crate) fn dfa_from_parts(
    states: Vec<PositionSet>,
    alphabet: BTreeSet<Symbol>,
    transitions: BTreeMap<(StateId, Symbol), StateId>,
    accepting: BTreeSet<StateId>,
) -> Dfa {
    Dfa {
        states,
        alphabet,
        transitions,
        accepting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TreeBuilder;

    fn set(positions: &[usize]) -> PositionSet {
        positions.iter().copied().collect()
    }

    /// `(a|b)*abb` sealed with the end marker as position 6
    fn dragon_dfa() -> Dfa {
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
        Dfa::from_tree(&b.seal(c3).unwrap().analyze())
    }

    #[test]
    fn dragon_book_states() {
        let dfa = dragon_dfa();
        assert_eq!(dfa.state_count(), 4);
        assert_eq!(dfa.state(0), &set(&[1, 2, 3]));
        assert_eq!(dfa.state(1), &set(&[1, 2, 3, 4]));
        assert_eq!(dfa.state(2), &set(&[1, 2, 3, 5]));
        assert_eq!(dfa.state(3), &set(&[1, 2, 3, 6]));
        assert_eq!(dfa.accepting(), &BTreeSet::from([3]));
    }

    #[test]
    fn dragon_book_transitions() {
        let dfa = dragon_dfa();
        let a = Symbol::from('a');
        let b = Symbol::from('b');
        assert_eq!(dfa.transition(0, &a), Some(1));
        assert_eq!(dfa.transition(0, &b), Some(0));
        assert_eq!(dfa.transition(1, &a), Some(1));
        assert_eq!(dfa.transition(1, &b), Some(2));
        assert_eq!(dfa.transition(2, &a), Some(1));
        assert_eq!(dfa.transition(2, &b), Some(3));
        assert_eq!(dfa.transition(3, &a), Some(1));
        assert_eq!(dfa.transition(3, &b), Some(0));
        assert_eq!(dfa.transitions().len(), 8);
    }

    #[test]
    fn equal_position_sets_share_one_state() {
        // (a|b)(a|b): both branches of each step land in the same set
        let mut b = TreeBuilder::new();
        let a1 = b.leaf('a');
        let b2 = b.leaf('b');
        let first = b.union(a1, b2);
        let a3 = b.leaf('a');
        let b4 = b.leaf('b');
        let second = b.union(a3, b4);
        let cat = b.concat(first, second);
        let dfa = Dfa::from_tree(&b.seal(cat).unwrap().analyze());

        assert_eq!(dfa.state_count(), 3);
        let a = Symbol::from('a');
        let sym_b = Symbol::from('b');
        assert_eq!(dfa.transition(0, &a), dfa.transition(0, &sym_b));
        assert_eq!(dfa.transition(1, &a), dfa.transition(1, &sym_b));
    }

    #[test]
    fn repeated_construction_is_identical() {
        assert_eq!(dragon_dfa(), dragon_dfa());
    }

    #[test]
    fn epsilon_tree_accepts_only_empty_input() {
        let mut b = TreeBuilder::new();
        let eps = b.epsilon();
        let dfa = Dfa::from_tree(&b.seal(eps).unwrap().analyze());
        assert_eq!(dfa.state_count(), 1);
        assert!(dfa.is_accepting(dfa.start()));
        assert!(dfa.transitions().is_empty());
    }
}
