//! This module defines the core data structures and types shared by the compiler, decoder and
//! execution engine, including states, edges, directions, execution outcomes and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The blank symbol used on the tape and in edge labels.
pub const BLANK_SYMBOL: char = '_';
/// The number of cells preallocated on a fresh tape.
pub const DEFAULT_TAPE_LENGTH: usize = 50;
/// The delay between two steps of a run at 100% speed, in milliseconds.
pub const BASE_INTERVAL_MS: u64 = 500;
/// The maximum number of steps `run_blocking` executes by default.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// The label given to an edge when two states are first connected.
pub const DEFAULT_EDGE_LABEL: &str = "_,_,>";
/// The largest state number the {a,b} encoder writes out as a run of `a`s.
pub const MAX_ENCODED_STATE: u64 = 1 << 20;

/// A 2-D position on the editor canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node of the machine diagram.
///
/// The identifier is the decimal form of a positive integer and is unique within a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// The state identifier, e.g. `"3"`.
    pub id: String,
    /// Whether execution starts in this state.
    #[serde(default)]
    pub is_start: bool,
    /// Whether reaching this state accepts the input.
    #[serde(default)]
    pub is_final: bool,
    /// Where the editor draws the state. Never interpreted by the core.
    #[serde(default)]
    pub position: Position,
}

impl State {
    /// Creates a plain state that is neither start nor final.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_start: false,
            is_final: false,
            position: Position::default(),
        }
    }

    /// Marks the state as the start state.
    pub fn start(mut self) -> Self {
        self.is_start = true;
        self
    }

    /// Marks the state as final.
    pub fn accepting(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// A labeled, directed edge of the machine diagram.
///
/// The label packs every rule from `source` to `target` as `;`-separated rule specs, each being
/// `read,direction` or `read,write,direction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

impl Edge {
    /// Creates an edge with the conventional `e{source}-{target}` identifier.
    pub fn new(source: impl Into<String>, target: impl Into<String>, label: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();

        Self {
            id: edge_id(&source, &target),
            source,
            target,
            label: label.into(),
        }
    }
}

/// Returns the identifier used for the edge between `source` and `target`.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("e{source}-{target}")
}

/// Represents the possible directions the tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Interprets the direction field of an edge label.
    ///
    /// Only `<` means Left. Every other text, including `>`, `R`, `1` or an empty field, means
    /// Right. Labels are never rejected for their direction field.
    pub fn from_label(field: &str) -> Self {
        if field == "<" {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// The character used for this direction in edge labels and exports.
    pub fn symbol(self) -> char {
        match self {
            Direction::Left => '<',
            Direction::Right => '>',
        }
    }
}

/// One point of an execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The number of steps executed when the snapshot was taken.
    pub step: usize,
    /// The identifier of the current state.
    pub state: String,
    /// The whole tape, one character per cell.
    pub tape: String,
    /// The head index.
    pub head: usize,
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a step and can continue.
    Continue,
    /// The machine cannot step any further.
    Halt(Halt),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// The current state is final.
    Accepted,
    /// The run was aborted by an unrecoverable condition.
    Err(RunError),
}

impl Halt {
    /// Converts the outcome into a `Result`, with acceptance as `Ok`.
    pub fn into_result(self) -> Result<(), RunError> {
        match self {
            Halt::Accepted => Ok(()),
            Halt::Err(e) => Err(e),
        }
    }
}

/// The lifecycle of an execution context.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Positioned but no step executed since the last reset or edit.
    Idle,
    /// At least one step executed and no terminal condition reached.
    Running,
    /// Accepted or aborted.
    Halted(Halt),
}

/// A rule that was dropped while compiling a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileWarning {
    /// The rule spec does not have 2 or 3 comma-separated fields.
    #[error("edge {edge}: rule '{spec}' has {fields} fields, expected 2 or 3")]
    MalformedRule {
        edge: String,
        spec: String,
        fields: usize,
    },
    /// A read or write field is not a single character.
    #[error("edge {edge}: rule '{spec}' has invalid symbol '{field}'")]
    InvalidSymbol {
        edge: String,
        spec: String,
        field: String,
    },
    /// The source state already has an outgoing rule for this symbol.
    #[error("edge {edge}: state {state} already has a rule reading '{symbol}'")]
    DuplicateSymbol {
        edge: String,
        state: String,
        symbol: char,
    },
    /// The edge references a state that is not part of the diagram.
    #[error("edge {edge}: unknown state {state}")]
    DanglingEdge { edge: String, state: String },
    /// The label could not be split into rule specs.
    #[error("edge {edge}: unparsable label: {message}")]
    UnparsableLabel { edge: String, message: String },
}

/// Errors raised while decoding an {a,b} machine encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Nothing to decode.
    #[error("encoding is empty")]
    Empty,
    /// A character outside the {a, b} alphabet.
    #[error("invalid character '{found}' at position {position}")]
    InvalidCharacter { position: usize, found: char },
    /// The input ended in the middle of a rule.
    #[error("unexpected end of encoding at position {position}: expected {expected}")]
    UnexpectedEnd {
        position: usize,
        expected: &'static str,
    },
    /// A state number run with no `a`s.
    #[error("state number at position {position} is zero")]
    ZeroState { position: usize },
}

impl DecodeError {
    /// Moves the reported position `offset` characters to the right.
    pub(crate) fn shifted(self, offset: usize) -> Self {
        match self {
            DecodeError::InvalidCharacter { position, found } => DecodeError::InvalidCharacter {
                position: position + offset,
                found,
            },
            DecodeError::UnexpectedEnd { position, expected } => DecodeError::UnexpectedEnd {
                position: position + offset,
                expected,
            },
            DecodeError::ZeroState { position } => DecodeError::ZeroState {
                position: position + offset,
            },
            DecodeError::Empty => DecodeError::Empty,
        }
    }
}

/// Errors raised while encoding a diagram into the {a,b} format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("state id '{0}' is not a positive integer")]
    NonNumericState(String),
    #[error("symbol '{0}' cannot be encoded")]
    UnencodableSymbol(char),
    #[error("state {0} is too large to encode (limit {})", MAX_ENCODED_STATE)]
    StateTooLarge(u64),
}

/// Unrecoverable conditions that halt a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// A fresh run needs exactly one start state.
    #[error("expected exactly one start state, found {0}")]
    NoUniqueStart(usize),
    /// The current state has no rule for the symbol under the head.
    #[error("no rule in state {state} reads '{symbol}'")]
    NoMatchingRule { state: String, symbol: char },
    /// A left move was attempted at the first cell.
    #[error("can't move left from the first cell, the head fell off the tape")]
    TapeUnderflow,
    /// A right move or head placement beyond the last cell.
    #[error("tape capacity of {capacity} cells exceeded")]
    TapeOverflow { capacity: usize },
    /// The requested state is not part of the machine.
    #[error("unknown state: {0}")]
    UnknownState(String),
    /// `run_blocking` gave up before reaching a final state.
    #[error("no final state reached after {0} steps")]
    StepLimitExceeded(usize),
}

/// Errors raised by diagram editing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("unknown state: {0}")]
    UnknownState(String),
    #[error("unknown edge: {0}")]
    UnknownEdge(String),
    #[error("states {from} and {to} are already connected")]
    DuplicateEdge { from: String, to: String },
}

/// Represents the errors a library caller may want to handle as one type.
#[derive(Debug, Error)]
pub enum TuringMachineError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Run error: {0}")]
    Run(#[from] RunError),
    #[error("Diagram error: {0}")]
    Diagram(#[from] DiagramError),
    #[error("Analysis error: {0}")]
    Analysis(#[from] crate::analyzer::AnalysisError),
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),
    #[error("Invalid machine file: {0}")]
    Json(#[from] serde_json::Error),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    #[error("Machine not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_label_is_permissive() {
        assert_eq!(Direction::from_label("<"), Direction::Left);
        assert_eq!(Direction::from_label(">"), Direction::Right);
        assert_eq!(Direction::from_label("1"), Direction::Right);
        assert_eq!(Direction::from_label("L"), Direction::Right);
        assert_eq!(Direction::from_label(""), Direction::Right);
    }

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let right: Direction = serde_json::from_str("\"Right\"").unwrap();
        assert_eq!(right, Direction::Right);
    }

    #[test]
    fn test_state_uses_editor_field_names() {
        let state = State::new("1").start();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["isStart"], true);
        assert_eq!(json["isFinal"], false);
    }

    #[test]
    fn test_state_flags_default_when_missing() {
        let state: State = serde_json::from_str(r#"{"id":"7"}"#).unwrap();

        assert!(!state.is_start);
        assert!(!state.is_final);
        assert_eq!(state.position, Position::default());
    }

    #[test]
    fn test_edge_id_convention() {
        let edge = Edge::new("1", "2", DEFAULT_EDGE_LABEL);
        assert_eq!(edge.id, "e1-2");
    }

    #[test]
    fn test_error_display() {
        let error = RunError::NoMatchingRule {
            state: "4".to_string(),
            symbol: 'b',
        };

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("state 4"));
        assert!(error_msg.contains("'b'"));
    }
}
