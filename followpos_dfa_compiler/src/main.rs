use followpos_dfa_compiler::report::{
    dfa_report, minimization_report, simulation_report, tree_report,
};
use followpos_dfa_compiler::{minimize, parse, Dfa, Simulator, Symbol, TreeBuilder};

/// Classifier for the symbolic number automaton
fn number_symbols(ch: char) -> Option<Symbol> {
    if ch.is_ascii_digit() {
        Some(Symbol::from("DIGIT"))
    } else if ch == '.' {
        Some(Symbol::from("DOT"))
    } else {
        None
    }
}

/// Hand-wired tree for `[0-9]+(\.[0-9]+)?` over DIGIT/DOT symbols
fn number_tree() -> followpos_dfa_compiler::AttributedTree {
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

    b.seal(full_number)
        .expect("hand-wired tree ids are valid")
        .analyze()
}

fn main() {
    env_logger::init();

    println!("Direct DFA Construction - Number Recognizer Demo");
    println!("================================================");

    let tree = number_tree();
    println!("\n{}", tree_report(&tree));

    let dfa = Dfa::from_tree(&tree);
    println!("{}", dfa_report(&dfa));

    println!("{}", minimization_report(&minimize(&dfa)));

    let simulator = Simulator::new(&dfa);
    for input in ["12.34", "12.", "12a4"] {
        println!("Input: {:?}", input);
        println!("{}", simulation_report(&dfa, &simulator.run(input, number_symbols)));
    }

    // same pipeline from the textual pattern, one leaf per character
    println!("Textual pattern pipeline");
    println!("========================");
    let pattern = "[0-9]+(\\.[0-9]+)?";
    match parse(pattern) {
        Ok(tree) => {
            let dfa = Dfa::from_tree(&tree.analyze());
            println!("Pattern {:?}: {} states", pattern, dfa.state_count());
            let simulator = Simulator::new(&dfa);
            for input in ["12.34", "12."] {
                let run = simulator.run(input, |ch| Some(Symbol::from(ch)));
                println!(
                    "  {:?} -> {}",
                    input,
                    if run.accepted() { "ACCEPTED" } else { "REJECTED" }
                );
            }
        }
        Err(err) => println!("Failed to translate pattern: {}", err),
    }
}
