//! Human-readable reports over finished pipeline values
//!
//! Every function here is a pure formatter: it reads an already-computed
//! structure and returns a `String`. Nothing in the algorithmic core depends
//! on these, so the core stays testable without capturing output.

use crate::dfa::{Dfa, StateId};
use crate::minimize::{Block, Minimization};
use crate::simulate::{Simulation, Verdict};
use crate::syntax::{AttributedTree, PositionSet};

fn position_set(set: &PositionSet) -> String {
    let inner: Vec<String> = set.iter().map(|position| position.to_string()).collect();
    format!("{{{}}}", inner.join(", "))
}

fn state_set(block: &Block) -> String {
    let inner: Vec<String> = block.iter().map(|&id| format!("S{}", id)).collect();
    format!("{{{}}}", inner.join(", "))
}

/// List leaf positions, the followpos table and the root attributes
pub fn tree_report(tree: &AttributedTree) -> String {
    let mut out = String::new();
    out.push_str("=== SYNTAX TREE POSITIONS ===\n");
    for (position, symbol) in tree.tree().leaves() {
        out.push_str(&format!("Position {}: {}\n", position, symbol));
    }

    out.push_str("\n=== FOLLOWPOS TABLE ===\n");
    for (position, follow) in tree.followpos_table() {
        out.push_str(&format!(
            "followpos({}) = {}\n",
            position,
            position_set(follow)
        ));
    }

    let root = tree.root_attributes();
    out.push_str(&format!("\nRoot nullable: {}\n", root.nullable));
    out.push_str(&format!("Root firstpos: {}\n", position_set(&root.firstpos)));
    out.push_str(&format!("Root lastpos: {}\n", position_set(&root.lastpos)));
    out
}

/// List DFA states in discovery order, the transition table and the
/// accepting states
pub fn dfa_report(dfa: &Dfa) -> String {
    let mut out = String::new();
    out.push_str("=== DFA STATES ===\n");
    for (id, positions) in dfa.states().iter().enumerate() {
        out.push_str(&format!("S{} = {}\n", id, position_set(positions)));
    }

    out.push_str("\n=== DFA TRANSITIONS ===\n");
    for ((from, symbol), to) in dfa.transitions() {
        out.push_str(&format!("S{} --{}--> S{}\n", from, symbol, to));
    }

    out.push_str("\n=== ACCEPTING STATES ===\n");
    for &id in dfa.accepting() {
        out.push_str(&format!("S{} = {}\n", id, position_set(dfa.state(id))));
    }
    out
}

fn partition_line(partition: &[Block]) -> String {
    let blocks: Vec<String> = partition.iter().map(|block| state_set(block)).collect();
    format!("[{}]", blocks.join(", "))
}

/// Show the initial partition, every refinement round's splits and the final
/// partition
pub fn minimization_report(minimization: &Minimization) -> String {
    let mut out = String::new();
    out.push_str("=== DFA MINIMIZATION ===\n");
    out.push_str(&format!(
        "Initial partition: {}\n",
        partition_line(&minimization.initial)
    ));

    for (round, splits) in minimization.rounds.iter().enumerate() {
        out.push_str(&format!("\n--- Refinement round {} ---\n", round + 1));
        for split in splits {
            out.push_str(&format!(
                "Split {} into {}\n",
                state_set(&split.from),
                partition_line(&split.into)
            ));
        }
    }

    out.push_str(&format!(
        "\nFinal partition: {}\n",
        partition_line(&minimization.partition)
    ));
    out
}

fn state_label(dfa: &Dfa, id: StateId) -> String {
    format!("S{} = {}", id, position_set(dfa.state(id)))
}

/// Show every simulation step and the verdict with its reason
pub fn simulation_report(dfa: &Dfa, simulation: &Simulation) -> String {
    let mut out = String::new();
    out.push_str("=== DFA SIMULATION ===\n");
    out.push_str(&format!("Start state: {}\n", state_label(dfa, dfa.start())));

    for step in &simulation.trace {
        out.push_str(&format!("\nStep {}\n", step.step));
        match &step.symbol {
            Some(symbol) => {
                out.push_str(&format!(
                    "Read character '{}' -> symbol {}\n",
                    step.input, symbol
                ));
            }
            None => {
                out.push_str(&format!(
                    "Read character '{}' -> no symbol\n",
                    step.input
                ));
            }
        }
        match step.to {
            Some(to) => out.push_str(&format!("Transition: S{} -> S{}\n", step.from, to)),
            None => out.push_str(&format!("No transition from S{}\n", step.from)),
        }
    }

    out.push('\n');
    match &simulation.verdict {
        Verdict::Accepted => {
            out.push_str(&format!(
                "Final state {} is accepting. Input ACCEPTED.\n",
                state_label(dfa, simulation.final_state)
            ));
        }
        Verdict::NoTransition { step } => {
            out.push_str(&format!(
                "No transition at step {}. Input REJECTED.\n",
                step
            ));
        }
        Verdict::NonAcceptingFinal => {
            out.push_str(&format!(
                "Final state {} is not accepting. Input REJECTED.\n",
                state_label(dfa, simulation.final_state)
            ));
        }
    }
    out
}
