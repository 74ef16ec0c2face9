//! Myhill-Nerode minimization by partition refinement
//!
//! States are split by next-block signature over the canonical sorted
//! alphabet until no block splits. The result is descriptive: the final
//! partition (plus the splits of every refinement round, for reporting) is
//! returned without building a quotient automaton and without mutating the
//! input DFA.

use std::collections::BTreeMap;

use log::debug;

use crate::dfa::{Dfa, StateId};

/// One block of a partition: a set of DFA states
pub type Block = std::collections::BTreeSet<StateId>;

/// A block that split during one refinement round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// The block before the round
    pub from: Block,
    /// The signature groups it separated into
    pub into: Vec<Block>,
}

/// The outcome of minimizing a DFA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimization {
    /// The initial accepting / non-accepting partition (empty blocks absent)
    pub initial: Vec<Block>,
    /// The splits of each refinement round, one entry per round that changed
    /// the partition
    pub rounds: Vec<Vec<Split>>,
    /// The coarsest stable partition
    pub partition: Vec<Block>,
}

/// Compute the coarsest indistinguishability partition of a DFA's states
pub fn minimize(dfa: &Dfa) -> Minimization {
    let accepting: Block = dfa.accepting().iter().copied().collect();
    let non_accepting: Block = (0..dfa.state_count())
        .filter(|id| !dfa.is_accepting(*id))
        .collect();

    let mut partition = Vec::new();
    if !accepting.is_empty() {
        partition.push(accepting);
    }
    if !non_accepting.is_empty() {
        partition.push(non_accepting);
    }
    let initial = partition.clone();

    let mut rounds = Vec::new();
    loop {
        let (splits, refined) = refine_round(dfa, &partition);
        if splits.is_empty() {
            break;
        }
        for split in &splits {
            debug!("split {:?} into {:?}", split.from, split.into);
        }
        rounds.push(splits);
        partition = refined;
    }

    Minimization {
        initial,
        rounds,
        partition,
    }
}

/// Run a single refinement pass over `partition`
///
/// Every state in a block gets a signature: for each alphabet symbol in
/// canonical order, the index of the block its successor lies in, or `None`
/// when the transition is absent (`None` is a distinct marker, never block
/// 0). Blocks whose states disagree on the signature are separated. Returns
/// the splits that occurred and the refined partition; an empty split list
/// means `partition` was already stable.
pub fn refine_round(dfa: &Dfa, partition: &[Block]) -> (Vec<Split>, Vec<Block>) {
    let mut splits = Vec::new();
    let mut refined = Vec::new();

    for block in partition {
        let mut groups: BTreeMap<Vec<Option<usize>>, Block> = BTreeMap::new();
        for &state in block {
            let signature: Vec<Option<usize>> = dfa
                .alphabet()
                .iter()
                .map(|symbol| {
                    dfa.transition(state, symbol)
                        .and_then(|target| block_of(partition, target))
                })
                .collect();
            groups.entry(signature).or_default().insert(state);
        }

        if groups.len() > 1 {
            splits.push(Split {
                from: block.clone(),
                into: groups.values().cloned().collect(),
            });
        }
        refined.extend(groups.into_values());
    }

    (splits, refined)
}

fn block_of(partition: &[Block], state: StateId) -> Option<usize> {
    partition.iter().position(|block| block.contains(&state))
}
