//! Persisted records and the interface of the key-value store that holds them.
//!
//! Stores are add-only: putting a record whose id is already taken fails instead of
//! overwriting it.

use crate::diagram::Diagram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A saved machine: its id plus the diagram's states and edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub diagram: Diagram,
}

/// A saved tape, one symbol per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeRecord {
    pub id: String,
    pub contents: Vec<char>,
}

/// The two collections of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Machine,
    Tape,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Machine => write!(f, "machine"),
            RecordKind::Tape => write!(f, "tape"),
        }
    }
}

/// Any record a store holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Machine(MachineRecord),
    Tape(TapeRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Machine(_) => RecordKind::Machine,
            Record::Tape(_) => RecordKind::Tape,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Machine(m) => &m.id,
            Record::Tape(t) => &t.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("a {kind} with id '{id}' already exists")]
    Duplicate { kind: RecordKind, id: String },
    #[error("store backend failed: {0}")]
    Backend(String),
}

/// A key-value store of machine and tape records.
pub trait RecordStore {
    /// Adds a record. Fails with `StoreError::Duplicate` if its id is taken within its kind.
    fn put(&mut self, record: Record) -> Result<(), StoreError>;

    /// Returns every record of `kind`, ordered by id.
    fn list(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError>;

    fn save_machine(&mut self, machine: MachineRecord) -> Result<(), StoreError> {
        self.put(Record::Machine(machine))
    }

    fn save_tape(&mut self, tape: TapeRecord) -> Result<(), StoreError> {
        self.put(Record::Tape(tape))
    }

    fn machines(&self) -> Result<Vec<MachineRecord>, StoreError> {
        Ok(self
            .list(RecordKind::Machine)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Machine(m) => Some(m),
                Record::Tape(_) => None,
            })
            .collect())
    }

    fn tapes(&self) -> Result<Vec<TapeRecord>, StoreError> {
        Ok(self
            .list(RecordKind::Tape)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Tape(t) => Some(t),
                Record::Machine(_) => None,
            })
            .collect())
    }
}

/// A `RecordStore` kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<(RecordKind, String), Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn put(&mut self, record: Record) -> Result<(), StoreError> {
        let key = (record.kind(), record.id().to_string());
        if self.records.contains_key(&key) {
            return Err(StoreError::Duplicate {
                kind: key.0,
                id: key.1,
            });
        }

        self.records.insert(key, record);
        Ok(())
    }

    fn list(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, record)| record.clone())
            .collect())
    }
}
