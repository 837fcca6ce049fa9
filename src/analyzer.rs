//! This module provides functions for analyzing compiled machines to detect structural problems
//! before execution: a missing or ambiguous start state, missing final states, and states the
//! machine can never enter.

use crate::table::TransitionTable;
use std::collections::HashSet;
use thiserror::Error;

/// Represents the problems that can be found during the analysis of a compiled machine.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// The machine needs exactly one start state; holds the number found.
    #[error("expected exactly one start state, found {0}")]
    StartState(usize),
    /// No state is flagged as final, so no run can accept.
    #[error("no state is marked as final")]
    NoFinalState,
    /// States that no sequence of rules leads to from the start state.
    #[error("unreachable states: {}", .0.join(", "))]
    UnreachableStates(Vec<String>),
    /// Final states exist but none of them can be reached from the start state.
    #[error("no final state is reachable from the start state")]
    FinalUnreachable,
}

/// Analyzes a compiled machine and returns every problem found, in check order.
///
/// An empty result means the machine is runnable and can, at least structurally, accept.
/// Reachability checks are skipped when there is no unique start state.
pub fn analyze(table: &TransitionTable) -> Vec<AnalysisError> {
    [
        check_start_state,
        check_final_state,
        check_unreachable_states,
        check_final_reachable,
    ]
    .iter()
    .filter_map(|f| f(table).err())
    .collect()
}

fn check_start_state(table: &TransitionTable) -> Result<(), AnalysisError> {
    match table.start_states().len() {
        1 => Ok(()),
        n => Err(AnalysisError::StartState(n)),
    }
}

fn check_final_state(table: &TransitionTable) -> Result<(), AnalysisError> {
    if table.states().any(|s| s.is_final) {
        Ok(())
    } else {
        Err(AnalysisError::NoFinalState)
    }
}

/// Checks for unreachable states by traversing the rules from the start state.
fn check_unreachable_states(table: &TransitionTable) -> Result<(), AnalysisError> {
    let Some(visited) = reachable(table) else {
        return Ok(());
    };

    let mut unreachable: Vec<String> = table
        .states()
        .filter(|s| !visited.contains(s.id.as_str()))
        .map(|s| s.id.clone())
        .collect();

    if !unreachable.is_empty() {
        // Ids are decimal numbers; order them numerically rather than lexically
        unreachable.sort_by_key(|id| (id.parse::<u64>().unwrap_or(u64::MAX), id.clone()));
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

fn check_final_reachable(table: &TransitionTable) -> Result<(), AnalysisError> {
    let Some(visited) = reachable(table) else {
        return Ok(());
    };

    let mut finals = table.states().filter(|s| s.is_final).peekable();
    if finals.peek().is_none() {
        // Already reported by `check_final_state`
        return Ok(());
    }

    if finals.any(|s| visited.contains(s.id.as_str())) {
        Ok(())
    } else {
        Err(AnalysisError::FinalUnreachable)
    }
}

/// Returns the ids of every state reachable from the unique start state, the start included.
fn reachable(table: &TransitionTable) -> Option<HashSet<&str>> {
    let start = table.unique_start().ok()?;

    let mut visited = HashSet::new();
    let mut queue = vec![start.id.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for transition in table.transitions(state) {
            if !visited.contains(transition.target.id.as_str()) {
                queue.push(transition.target.id.as_str());
            }
        }
    }

    Some(visited)
}
