//! DFA simulation with a step-by-step trace
//!
//! A pure left-to-right deterministic walk: each input character is mapped to
//! an alphabet symbol by a caller-supplied classifier, then the transition
//! table is consulted. No backtracking, no lookahead. Rejection is a normal
//! outcome, not an error, and distinguishes "no transition mid-input" from
//! "non-accepting state at end of input".

use log::debug;

use crate::dfa::{Dfa, StateId};
use crate::syntax::Symbol;

/// The outcome of one simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// All input consumed, final state accepting
    Accepted,
    /// The run died at `step` (1-based): the character classified to no
    /// symbol, or the current state had no transition on it
    NoTransition { step: usize },
    /// All input consumed, but the final state is not accepting
    NonAcceptingFinal,
}

impl Verdict {
    /// Whether the input was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// One consumed (or fatally unconsumable) input character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// 1-based step index
    pub step: usize,
    /// The raw input character
    pub input: char,
    /// The symbol the classifier produced, if any
    pub symbol: Option<Symbol>,
    /// State before the step
    pub from: StateId,
    /// State after the step; `None` when the run died here
    pub to: Option<StateId>,
}

/// The full record of one run: verdict, ordered trace, final state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub verdict: Verdict,
    pub trace: Vec<TraceStep>,
    /// The last state reached before the run ended
    pub final_state: StateId,
}

impl Simulation {
    /// Whether the input was accepted
    pub fn accepted(&self) -> bool {
        self.verdict.is_accepted()
    }
}

/// Runs symbol sequences against a borrowed DFA
pub struct Simulator<'a> {
    dfa: &'a Dfa,
}

impl<'a> Simulator<'a> {
    /// Create a simulator for the given DFA
    pub fn new(dfa: &'a Dfa) -> Self {
        Self { dfa }
    }

    /// Run `input` through the DFA, classifying each character with
    /// `classify`
    pub fn run<C>(&self, input: &str, classify: C) -> Simulation
    where
        C: Fn(char) -> Option<Symbol>,
    {
        let mut current = self.dfa.start();
        let mut trace = Vec::new();

        for (index, ch) in input.chars().enumerate() {
            let step = index + 1;
            let symbol = classify(ch);
            let target = symbol
                .as_ref()
                .and_then(|symbol| self.dfa.transition(current, symbol));
            debug!(
                "step {}: {:?} -> {:?}, S{} -> {:?}",
                step, ch, symbol, current, target
            );
            trace.push(TraceStep {
                step,
                input: ch,
                symbol,
                from: current,
                to: target,
            });

            match target {
                Some(next) => current = next,
                None => {
                    return Simulation {
                        verdict: Verdict::NoTransition { step },
                        trace,
                        final_state: current,
                    }
                }
            }
        }

        let verdict = if self.dfa.is_accepting(current) {
            Verdict::Accepted
        } else {
            Verdict::NonAcceptingFinal
        };
        Simulation {
            verdict,
            trace,
            final_state: current,
        }
    }
}
