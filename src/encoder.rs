//! This module converts between diagrams and the compact {a,b} machine encoding.
//!
//! An encoding is a concatenation of rules, each written as
//!
//! ```text
//! a^from b a^to b <read> <write> <move>
//! ```
//!
//! where `a^n` is a run of `n` `a`s, each symbol is two characters (`aa` → `a`, `ab` → `b`,
//! `ba` → `_`, `bb` → `#`) and the move is one character (`a` → Left, `b` → Right).

use crate::compiler::compile;
use crate::diagram::Diagram;
use crate::layout::{self, Layout, Unarranged};
use crate::types::{
    edge_id, DecodeError, Direction, Edge, EncodeError, State, BLANK_SYMBOL, MAX_ENCODED_STATE,
};

/// One rule read from an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EncodedRule {
    from: u64,
    to: u64,
    read: char,
    write: char,
    direction: Direction,
}

impl EncodedRule {
    fn label_spec(&self) -> String {
        format!("{},{},{}", self.read, self.write, self.direction.symbol())
    }
}

/// Decodes an encoding into a diagram whose states stay at the origin.
///
/// See [`decode_with`].
pub fn decode(encoding: &str) -> Result<Diagram, DecodeError> {
    decode_with(encoding, &Unarranged)
}

/// Decodes an encoding into a diagram and positions it with `layout`.
///
/// States appear in the order they are first mentioned. The target of the last rule is the only
/// final state; no state is flagged as start. Rules sharing a source and target are packed into
/// one edge label, separated by `;`. Surrounding whitespace is ignored; error positions still
/// count from the start of `encoding`.
///
/// # Returns
///
/// * `Ok(Diagram)` if the whole input is a sequence of complete rules.
/// * `Err(DecodeError)` otherwise; no partial diagram is produced.
pub fn decode_with(encoding: &str, layout: &dyn Layout) -> Result<Diagram, DecodeError> {
    let offset = encoding.chars().take_while(|c| c.is_whitespace()).count();
    let rules = decode_rules(encoding.trim()).map_err(|e| e.shifted(offset))?;

    let Some(last) = rules.last() else {
        return Err(DecodeError::Empty);
    };
    let final_id = last.to.to_string();

    let mut diagram = Diagram::default();
    for rule in &rules {
        for id in [rule.from.to_string(), rule.to.to_string()] {
            if diagram.state(&id).is_none() {
                let mut state = State::new(id);
                state.is_final = state.id == final_id;
                diagram.states.push(state);
            }
        }

        let (from, to) = (rule.from.to_string(), rule.to.to_string());
        let id = edge_id(&from, &to);
        match diagram.edges.iter().position(|e| e.id == id) {
            Some(index) => {
                let label = &mut diagram.edges[index].label;
                label.push(';');
                label.push_str(&rule.label_spec());
            }
            None => diagram.edges.push(Edge::new(from, to, rule.label_spec())),
        }
    }

    layout::apply(layout, &mut diagram);
    Ok(diagram)
}

/// Splits the whole input into rules.
fn decode_rules(encoding: &str) -> Result<Vec<EncodedRule>, DecodeError> {
    if encoding.is_empty() {
        return Err(DecodeError::Empty);
    }

    if let Some((position, found)) = encoding
        .chars()
        .enumerate()
        .find(|(_, c)| *c != 'a' && *c != 'b')
    {
        return Err(DecodeError::InvalidCharacter { position, found });
    }

    let mut cursor = Cursor {
        input: encoding.as_bytes(),
        position: 0,
    };
    let mut rules = Vec::new();

    while !cursor.is_done() {
        rules.push(cursor.rule()?);
    }

    Ok(rules)
}

/// Reads rules from an input already known to contain only `a` and `b`.
struct Cursor<'a> {
    input: &'a [u8],
    position: usize,
}

impl Cursor<'_> {
    fn is_done(&self) -> bool {
        self.position >= self.input.len()
    }

    fn rule(&mut self) -> Result<EncodedRule, DecodeError> {
        let from = self.state_number("source state")?;
        self.separator("'b' after source state")?;
        let to = self.state_number("target state")?;
        self.separator("'b' after target state")?;
        let read = self.symbol("read symbol")?;
        let write = self.symbol("write symbol")?;
        let direction = match self.next("move")? {
            b'a' => Direction::Left,
            _ => Direction::Right,
        };

        Ok(EncodedRule {
            from,
            to,
            read,
            write,
            direction,
        })
    }

    /// Counts a run of `a`s. Zero is rejected since state ids are positive.
    fn state_number(&mut self, expected: &'static str) -> Result<u64, DecodeError> {
        let start = self.position;
        while self.input.get(self.position) == Some(&b'a') {
            self.position += 1;
        }

        match self.position - start {
            0 if self.is_done() => Err(DecodeError::UnexpectedEnd {
                position: start,
                expected,
            }),
            0 => Err(DecodeError::ZeroState { position: start }),
            n => Ok(n as u64),
        }
    }

    /// Skips the `b` closing a state number. The run of `a`s guarantees it is not an `a`.
    fn separator(&mut self, expected: &'static str) -> Result<(), DecodeError> {
        self.next(expected).map(|_| ())
    }

    fn symbol(&mut self, expected: &'static str) -> Result<char, DecodeError> {
        let first = self.next(expected)?;
        let second = self.next(expected)?;

        Ok(match (first, second) {
            (b'a', b'a') => 'a',
            (b'a', b'b') => 'b',
            (b'b', b'a') => BLANK_SYMBOL,
            _ => '#',
        })
    }

    fn next(&mut self, expected: &'static str) -> Result<u8, DecodeError> {
        let byte = self
            .input
            .get(self.position)
            .copied()
            .ok_or(DecodeError::UnexpectedEnd {
                position: self.position,
                expected,
            })?;

        self.position += 1;
        Ok(byte)
    }
}

/// Encodes the compiled rules of a diagram.
///
/// Rules are emitted state by state in table order. Since decoding marks the target of the last
/// rule as final, a rule entering a final state is moved to the end when there is one. Rules
/// without a write symbol are encoded as writing back the symbol they read. Rules the compiler
/// drops are not encoded.
///
/// # Returns
///
/// * `Ok(String)` with the encoding, empty when the diagram has no rules.
/// * `Err(EncodeError)` if a state id is not a positive integer, a state number exceeds
///   [`MAX_ENCODED_STATE`], or a symbol is outside `a`, `b`, `_` and `#`.
pub fn encode(diagram: &Diagram) -> Result<String, EncodeError> {
    let table = compile(diagram).table;

    let mut rules = Vec::new();
    for state in table.states() {
        for transition in table.transitions(&state.id) {
            rules.push(EncodedRule {
                from: state_number(&state.id)?,
                to: state_number(&transition.target.id)?,
                read: transition.read,
                write: transition.write.unwrap_or(transition.read),
                direction: transition.direction,
            });
        }
    }

    let is_final = |rule: &EncodedRule| {
        table
            .state(&rule.to.to_string())
            .is_some_and(|s| s.is_final)
    };
    if let Some(index) = rules.iter().rposition(is_final) {
        let rule = rules.remove(index);
        rules.push(rule);
    }

    let mut encoded = String::new();
    for rule in rules {
        push_run(&mut encoded, rule.from);
        encoded.push('b');
        push_run(&mut encoded, rule.to);
        encoded.push('b');
        encoded.push_str(encode_symbol(rule.read)?);
        encoded.push_str(encode_symbol(rule.write)?);
        encoded.push(match rule.direction {
            Direction::Left => 'a',
            Direction::Right => 'b',
        });
    }

    Ok(encoded)
}

fn state_number(id: &str) -> Result<u64, EncodeError> {
    match id.parse::<u64>() {
        Ok(n) if n > MAX_ENCODED_STATE => Err(EncodeError::StateTooLarge(n)),
        Ok(n) if n > 0 => Ok(n),
        _ => Err(EncodeError::NonNumericState(id.to_string())),
    }
}

/// Appends `n` `a`s. `n` is at most `MAX_ENCODED_STATE`.
fn push_run(encoded: &mut String, n: u64) {
    encoded.extend(std::iter::repeat('a').take(n as usize));
}

fn encode_symbol(symbol: char) -> Result<&'static str, EncodeError> {
    match symbol {
        'a' => Ok("aa"),
        'b' => Ok("ab"),
        BLANK_SYMBOL => Ok("ba"),
        '#' => Ok("bb"),
        other => Err(EncodeError::UnencodableSymbol(other)),
    }
}
