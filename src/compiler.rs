//! This module compiles a `Diagram` into a `TransitionTable`.
//!
//! Compilation is best-effort: rules that cannot be compiled are dropped and reported as
//! `CompileWarning`s, and the remaining rules still form a usable table.

use crate::diagram::Diagram;
use crate::parser::parse_rules;
use crate::table::{Transition, TransitionTable};
use crate::types::{CompileWarning, Edge};
use tracing::warn;

/// The result of compiling a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub table: TransitionTable,
    /// Every rule that was dropped, in the order it was met.
    pub warnings: Vec<CompileWarning>,
}

impl Compilation {
    /// Returns `true` when every rule of the diagram made it into the table.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Compiles the states and edges of `diagram` into a transition table.
///
/// Edges are processed in diagram order and the rules of a label in label order. A rule is
/// dropped when its spec is malformed, when its source already reads the same symbol (the first
/// rule wins), or when its edge references a state the diagram does not contain.
pub fn compile(diagram: &Diagram) -> Compilation {
    let mut table = TransitionTable::with_states(&diagram.states);
    let mut warnings = Vec::new();

    for edge in &diagram.edges {
        let target = match (table.state(&edge.source), table.state(&edge.target)) {
            (Some(_), Some(target)) => target.clone(),
            (None, _) => {
                warnings.push(dangling(edge, &edge.source));
                continue;
            }
            (_, None) => {
                warnings.push(dangling(edge, &edge.target));
                continue;
            }
        };

        let (rules, rejected) = parse_rules(edge);
        warnings.extend(rejected);

        for rule in rules {
            if table.reads(&edge.source, rule.read) {
                warnings.push(CompileWarning::DuplicateSymbol {
                    edge: edge.id.clone(),
                    state: edge.source.clone(),
                    symbol: rule.read,
                });
                continue;
            }

            table.push(
                &edge.source,
                Transition {
                    read: rule.read,
                    write: rule.write,
                    direction: rule.direction,
                    target: target.clone(),
                },
            );
        }
    }

    for warning in &warnings {
        warn!("Dropped rule: {}", warning);
    }

    Compilation { table, warnings }
}

fn dangling(edge: &Edge, state: &str) -> CompileWarning {
    CompileWarning::DanglingEdge {
        edge: edge.id.clone(),
        state: state.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, State};

    fn states() -> Vec<State> {
        vec![
            State::new("1").start(),
            State::new("2"),
            State::new("3").accepting(),
        ]
    }

    #[test]
    fn test_compile_starter() {
        let compilation = compile(&Diagram::starter());

        assert!(compilation.is_clean());
        let table = compilation.table;
        assert_eq!(table.transition_count(), 2);

        let rule = table.find("1", '_').unwrap();
        assert_eq!(rule.write, Some('_'));
        assert_eq!(rule.direction, Direction::Right);
        assert_eq!(rule.target.id, "2");
        assert!(table.find("2", '_').unwrap().target.is_final);
        assert!(table.transitions("3").is_empty());
    }

    #[test]
    fn test_packed_label_compiles_every_rule() {
        let diagram = Diagram::new(states(), vec![Edge::new("1", "2", "a,b,>;b,<;_,_,>")]);
        let compilation = compile(&diagram);

        assert!(compilation.is_clean());
        let rules = compilation.table.transitions("1");
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1].read, 'b');
        assert_eq!(rules[1].write, None);
        assert_eq!(rules[1].direction, Direction::Left);
    }

    #[test]
    fn test_duplicate_symbol_across_edges_keeps_first() {
        let diagram = Diagram::new(
            states(),
            vec![
                Edge::new("1", "2", "a,x,>"),
                Edge::new("1", "3", "a,y,<;b,>"),
            ],
        );
        let compilation = compile(&diagram);

        assert_eq!(
            compilation.warnings,
            vec![CompileWarning::DuplicateSymbol {
                edge: "e1-3".to_string(),
                state: "1".to_string(),
                symbol: 'a',
            }]
        );

        let table = compilation.table;
        assert_eq!(table.find("1", 'a').unwrap().write, Some('x'));
        assert_eq!(table.find("1", 'b').unwrap().target.id, "3");
    }

    #[test]
    fn test_duplicate_symbol_within_label() {
        let diagram = Diagram::new(states(), vec![Edge::new("2", "2", "a,>;a,b,<")]);
        let compilation = compile(&diagram);

        assert_eq!(compilation.warnings.len(), 1);
        assert_eq!(compilation.table.transitions("2").len(), 1);
        assert_eq!(compilation.table.find("2", 'a').unwrap().write, None);
    }

    #[test]
    fn test_malformed_rules_do_not_abort_compile() {
        let diagram = Diagram::new(
            states(),
            vec![
                Edge::new("1", "2", "a;_,_,>"),
                Edge::new("2", "3", "_,_,_,>"),
            ],
        );
        let compilation = compile(&diagram);

        assert_eq!(compilation.warnings.len(), 2);
        assert!(compilation.table.find("1", '_').is_some());
        assert!(compilation.table.transitions("2").is_empty());
    }

    #[test]
    fn test_dangling_edge_is_reported() {
        let diagram = Diagram::new(
            states(),
            vec![Edge::new("1", "9", "_,>"), Edge::new("8", "1", "_,>")],
        );
        let compilation = compile(&diagram);

        assert_eq!(
            compilation.warnings,
            vec![
                CompileWarning::DanglingEdge {
                    edge: "e1-9".to_string(),
                    state: "9".to_string(),
                },
                CompileWarning::DanglingEdge {
                    edge: "e8-1".to_string(),
                    state: "8".to_string(),
                },
            ]
        );
        assert_eq!(compilation.table.transition_count(), 0);
    }

    #[test]
    fn test_edge_with_both_ends_missing_reports_source_once() {
        let diagram = Diagram::new(
            states(),
            vec![Edge::new("7", "9", "_,>"), Edge::new("1", "2", "_,>")],
        );
        let compilation = compile(&diagram);

        assert_eq!(
            compilation.warnings,
            vec![CompileWarning::DanglingEdge {
                edge: "e7-9".to_string(),
                state: "7".to_string(),
            }]
        );
        assert_eq!(compilation.table.find("1", '_').unwrap().target.id, "2");
    }

    #[test]
    fn test_permissive_direction_field() {
        let diagram = Diagram::new(states(), vec![Edge::new("1", "2", "a,1,>;b,1,?")]);
        let compilation = compile(&diagram);

        assert!(compilation.is_clean());
        let table = compilation.table;
        assert_eq!(table.find("1", 'a').unwrap().write, Some('1'));
        assert_eq!(table.find("1", 'b').unwrap().direction, Direction::Right);
    }

    #[test]
    fn test_every_state_has_an_entry() {
        let compilation = compile(&Diagram::new(states(), Vec::new()));

        assert_eq!(compilation.table.states().count(), 3);
        assert_eq!(compilation.table.export().len(), 3);
    }
}
