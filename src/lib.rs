//! This crate provides the core logic of a flowchart-style Turing machine editor.
//! It includes modules for compiling edited diagrams into transition tables, decoding and
//! encoding the compact {a,b} machine format, executing machines step by step or on a paced
//! clock, analyzing machines for structural problems, and managing built-in and saved machines.

pub mod allocator;
pub mod analyzer;
pub mod compiler;
pub mod config;
pub mod diagram;
pub mod encoder;
pub mod layout;
pub mod library;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod store;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the identifier allocator used when adding states.
pub use allocator::next_state_id;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the compiler entry point and its result.
pub use compiler::{compile, Compilation};
/// Re-exports the engine configuration types.
pub use config::{ConfigError, EngineConfig, Pacing, Speed};
pub use diagram::Diagram;
/// Re-exports the encoding functions from the encoder module.
pub use encoder::{decode, decode_with, encode};
pub use layout::{Layout, Unarranged};
/// Re-exports `MachineInfo`, `MachineLibrary`, and `MACHINES` from the library module.
pub use library::{MachineInfo, MachineLibrary, MACHINES};
/// Re-exports the `MachineLoader` struct from the loader module.
pub use loader::{MachineFormat, MachineLoader};
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
pub use store::{MachineRecord, MemoryStore, Record, RecordKind, RecordStore, StoreError, TapeRecord};
pub use table::{ExportedTransition, Transition, TransitionTable};
pub use tape::Tape;
/// Re-exports the types shared by every stage from the types module.
pub use types::{
    CompileWarning, DecodeError, Direction, Edge, EncodeError, Halt, Position, RunError,
    Snapshot, State, Status, Step, TuringMachineError, BLANK_SYMBOL,
};
