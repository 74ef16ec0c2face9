//! End-to-end pipeline tests for the number recognizer `[0-9]+(\.[0-9]+)?`

use anyhow::Result;
use followpos_dfa_compiler::{
    minimize, parse, refine_round, AttributedTree, Dfa, PositionSet, Simulator, Symbol,
    TreeBuilder, Verdict,
};

fn set(positions: &[usize]) -> PositionSet {
    positions.iter().copied().collect()
}

fn number_symbols(ch: char) -> Option<Symbol> {
    if ch.is_ascii_digit() {
        Some(Symbol::from("DIGIT"))
    } else if ch == '.' {
        Some(Symbol::from("DOT"))
    } else {
        None
    }
}

/// `[0-9]+(\.[0-9]+)?` wired over DIGIT/DOT symbols, sealed with `#`
fn number_tree() -> Result<AttributedTree> {
    let mut b = TreeBuilder::new();
    let digit1 = b.leaf("DIGIT");
    let digit2 = b.leaf("DIGIT");
    let digit_repeat = b.star(digit2);
    let integer_part = b.concat(digit1, digit_repeat);
    let dot = b.leaf("DOT");
    let digit3 = b.leaf("DIGIT");
    let digit4 = b.leaf("DIGIT");
    let fraction_repeat = b.star(digit4);
    let fraction_digits = b.concat(digit3, fraction_repeat);
    let fraction_part = b.concat(dot, fraction_digits);
    let epsilon = b.epsilon();
    let optional_fraction = b.union(fraction_part, epsilon);
    let full_number = b.concat(integer_part, optional_fraction);
    Ok(b.seal(full_number)?.analyze())
}

#[test]
fn followpos_table_matches_the_construction() -> Result<()> {
    let tree = number_tree()?;
    assert_eq!(tree.followpos(1), Some(&set(&[2, 3, 6])));
    assert_eq!(tree.followpos(2), Some(&set(&[2, 3, 6])));
    assert_eq!(tree.followpos(3), Some(&set(&[4])));
    assert_eq!(tree.followpos(4), Some(&set(&[5, 6])));
    assert_eq!(tree.followpos(5), Some(&set(&[5, 6])));
    assert_eq!(tree.followpos(6), Some(&set(&[])));
    assert_eq!(tree.root_attributes().firstpos, set(&[1]));
    Ok(())
}

#[test]
fn dfa_has_the_expected_states() -> Result<()> {
    let dfa = Dfa::from_tree(&number_tree()?);
    assert_eq!(dfa.state_count(), 4);
    assert_eq!(dfa.state(0), &set(&[1]));
    assert_eq!(dfa.state(1), &set(&[2, 3, 6]));
    assert_eq!(dfa.state(2), &set(&[4]));
    assert_eq!(dfa.state(3), &set(&[5, 6]));

    let digit = Symbol::from("DIGIT");
    let dot = Symbol::from("DOT");
    assert_eq!(dfa.transition(0, &digit), Some(1));
    assert_eq!(dfa.transition(0, &dot), None);
    assert_eq!(dfa.transition(1, &digit), Some(1));
    assert_eq!(dfa.transition(1, &dot), Some(2));
    assert_eq!(dfa.transition(2, &digit), Some(3));
    assert_eq!(dfa.transition(3, &digit), Some(3));
    assert_eq!(dfa.transition(3, &dot), None);

    assert!(dfa.is_accepting(1));
    assert!(dfa.is_accepting(3));
    assert!(!dfa.is_accepting(0));
    assert!(!dfa.is_accepting(2));
    Ok(())
}

#[test]
fn accepts_a_decimal_number() -> Result<()> {
    let dfa = Dfa::from_tree(&number_tree()?);
    let run = Simulator::new(&dfa).run("12.34", number_symbols);
    assert_eq!(run.verdict, Verdict::Accepted);
    // the accepting state contains the end-marker position
    assert!(dfa.state(run.final_state).contains(&6));
    Ok(())
}

#[test]
fn rejects_a_trailing_dot_as_non_accepting() -> Result<()> {
    let dfa = Dfa::from_tree(&number_tree()?);
    let run = Simulator::new(&dfa).run("12.", number_symbols);
    assert_eq!(run.verdict, Verdict::NonAcceptingFinal);
    assert_eq!(run.final_state, 2);
    Ok(())
}

#[test]
fn rejects_an_unclassifiable_letter_at_its_step() -> Result<()> {
    let dfa = Dfa::from_tree(&number_tree()?);
    let run = Simulator::new(&dfa).run("12a4", number_symbols);
    assert_eq!(run.verdict, Verdict::NoTransition { step: 3 });
    assert_eq!(run.trace.len(), 3);
    Ok(())
}

#[test]
fn minimization_reaches_a_stable_partition() -> Result<()> {
    let dfa = Dfa::from_tree(&number_tree()?);
    let result = minimize(&dfa);
    assert_eq!(result.initial.len(), 2);
    let (splits, _) = refine_round(&dfa, &result.partition);
    assert!(splits.is_empty());
    // the partition covers every state exactly once
    let covered: usize = result.partition.iter().map(|block| block.len()).sum();
    assert_eq!(covered, dfa.state_count());
    Ok(())
}

#[test]
fn textual_pattern_agrees_with_the_symbolic_tree() -> Result<()> {
    let dfa = Dfa::from_tree(&parse("[0-9]+(\\.[0-9]+)?")?.analyze());
    let simulator = Simulator::new(&dfa);
    let classify = |ch: char| Some(Symbol::from(ch));
    assert!(simulator.run("12.34", classify).accepted());
    assert!(simulator.run("0", classify).accepted());
    assert!(!simulator.run("12.", classify).accepted());
    assert!(!simulator.run("a", classify).accepted());
    Ok(())
}
