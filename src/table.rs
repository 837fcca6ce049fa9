//! This module defines `TransitionTable`, the compiled, execution-ready form of a machine, and
//! its JSON export shape.

use crate::types::{Direction, RunError, State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single compiled rule, leaving the state it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The symbol that must be under the head.
    pub read: char,
    /// The symbol written before moving; `None` leaves the cell unchanged.
    pub write: Option<char>,
    pub direction: Direction,
    /// The state the machine enters, resolved against the compiled state set.
    pub target: Arc<State>,
}

/// A mapping from state identifier to the ordered rules leaving that state.
///
/// Within one state every rule reads a different symbol, and every rule's target is one of the
/// table's states. Built by [`crate::compiler::compile`] and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    states: BTreeMap<String, Arc<State>>,
    rules: BTreeMap<String, Vec<Transition>>,
}

/// One rule of the exported table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTransition {
    pub read_letter: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_letter: Option<char>,
    /// `<` or `>`.
    pub direction: char,
    pub target_state_id: String,
}

impl TransitionTable {
    /// Creates a table holding `states` and no rules.
    ///
    /// When two states share an identifier the first one is kept.
    pub(crate) fn with_states<'a, I>(states: I) -> Self
    where
        I: IntoIterator<Item = &'a State>,
    {
        let mut table = Self::default();
        for state in states {
            if table.states.contains_key(&state.id) {
                continue;
            }
            table
                .states
                .insert(state.id.clone(), Arc::new(state.clone()));
            table.rules.insert(state.id.clone(), Vec::new());
        }
        table
    }

    /// Appends a rule to `source`. Callers guarantee `source` exists and the symbol is fresh.
    pub(crate) fn push(&mut self, source: &str, transition: Transition) {
        if let Some(rules) = self.rules.get_mut(source) {
            rules.push(transition);
        }
    }

    /// Returns whether `source` already has a rule reading `symbol`.
    pub fn reads(&self, source: &str, symbol: char) -> bool {
        self.find(source, symbol).is_some()
    }

    /// Returns the state with the given id.
    pub fn state(&self, id: &str) -> Option<&Arc<State>> {
        self.states.get(id)
    }

    /// Iterates over every state, ordered by identifier.
    pub fn states(&self) -> impl Iterator<Item = &Arc<State>> {
        self.states.values()
    }

    /// Returns the rules leaving `state`, in label order. Unknown states have no rules.
    pub fn transitions(&self, state: &str) -> &[Transition] {
        self.rules.get(state).map(Vec::as_slice).unwrap_or_default()
    }

    /// Finds the rule of `state` that reads exactly `symbol`.
    pub fn find(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.transitions(state).iter().find(|t| t.read == symbol)
    }

    /// Returns the states flagged as start.
    pub fn start_states(&self) -> Vec<&Arc<State>> {
        self.states.values().filter(|s| s.is_start).collect()
    }

    /// Returns the start state, or `NoUniqueStart` when there are zero or several.
    pub fn unique_start(&self) -> Result<&Arc<State>, RunError> {
        let starts = self.start_states();
        if starts.len() == 1 {
            Ok(starts[0])
        } else {
            Err(RunError::NoUniqueStart(starts.len()))
        }
    }

    /// The total number of rules.
    pub fn transition_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Converts the table into its export shape: state id → rules with the target given by id.
    pub fn export(&self) -> BTreeMap<String, Vec<ExportedTransition>> {
        self.rules
            .iter()
            .map(|(state, rules)| {
                let exported = rules
                    .iter()
                    .map(|t| ExportedTransition {
                        read_letter: t.read,
                        write_letter: t.write,
                        direction: t.direction.symbol(),
                        target_state_id: t.target.id.clone(),
                    })
                    .collect();
                (state.clone(), exported)
            })
            .collect()
    }

    /// Serializes the export shape as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export())
    }
}
