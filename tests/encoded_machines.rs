//! End-to-end runs of decoded machines: decode, pick a start state, compile, execute.

use turing_flow::{
    analyze, compile, decode, encode, Halt, RunError, Status, Tape, TuringMachine,
};

const EXAMPLE: &str = "abaaabaaaababaaabababbaaabaaaabababbaaaabaabbabab";

fn example_machine(input: &str) -> TuringMachine {
    let mut diagram = decode(EXAMPLE).unwrap();
    diagram.make_sole_start("1").unwrap();

    let compilation = compile(&diagram);
    assert!(compilation.is_clean());
    assert!(analyze(&compilation.table).is_empty());

    TuringMachine::new(compilation.table, Tape::with_input(input, 50)).unwrap()
}

#[test]
fn example_accepts_a_then_b() {
    let mut machine = example_machine("ab");

    assert_eq!(machine.run_blocking(100), Halt::Accepted);
    assert_eq!(machine.step_count(), 3);
    assert_eq!(machine.state().id, "2");
    assert_eq!(machine.head(), 3);
    assert!(machine.tape().to_string().starts_with("ab_"));
}

#[test]
fn example_terminates_on_every_short_tape() {
    for input in ["", "a", "b", "aa", "ba", "bb", "abb", "bab_"] {
        let mut machine = example_machine(input);

        let halt = machine.run_blocking(100);
        assert!(
            !matches!(halt, Halt::Err(RunError::StepLimitExceeded(_))),
            "input '{}' did not terminate",
            input
        );
        assert!(matches!(machine.status(), Status::Halted(_)));
    }
}

#[test]
fn example_rejects_blank_tape() {
    let mut machine = example_machine("");

    assert_eq!(
        machine.run_blocking(100),
        Halt::Err(RunError::NoMatchingRule {
            state: "1".to_string(),
            symbol: '_',
        })
    );
    assert_eq!(machine.head(), 0);
}

#[test]
fn encoding_survives_editing_round_trip() {
    let mut diagram = decode(EXAMPLE).unwrap();
    diagram.make_sole_start("1").unwrap();

    // Start flags are not part of the encoding
    assert_eq!(encode(&diagram).unwrap(), EXAMPLE);
}
