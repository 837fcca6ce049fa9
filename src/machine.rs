//! This module defines the `TuringMachine` struct, the execution context of a compiled machine.
//! It owns the tape, the current state and the trace of a run, and implements single steps,
//! paced runs and unpaced runs.

use crate::config::Pacing;
use crate::table::{Transition, TransitionTable};
use crate::tape::Tape;
use crate::types::{Halt, RunError, Snapshot, State, Status, Step};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An execution context: a transition table plus a tape, a head and a current state.
///
/// The context is owned by the caller. Nothing is shared between contexts, so a run can be
/// abandoned at any point and later resumed from where it stopped.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    table: TransitionTable,
    state: Arc<State>,
    tape: Tape,
    status: Status,
    step_count: usize,
    trace: Vec<Snapshot>,
    trace_limit: Option<usize>,
}

impl TuringMachine {
    /// Creates a machine positioned at the unique start state.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` in the `Idle` status.
    /// * `Err(RunError::NoUniqueStart)` if the table has zero or several start states.
    pub fn new(table: TransitionTable, tape: Tape) -> Result<Self, RunError> {
        let state = table.unique_start()?.clone();
        Ok(Self::positioned(table, tape, state))
    }

    /// Creates a machine positioned at `state`, whatever the start flags say.
    pub fn at(table: TransitionTable, tape: Tape, state: &str) -> Result<Self, RunError> {
        let state = table
            .state(state)
            .cloned()
            .ok_or_else(|| RunError::UnknownState(state.to_string()))?;
        Ok(Self::positioned(table, tape, state))
    }

    /// Recreates a machine from a snapshot taken earlier, so a host that only kept the snapshot
    /// can continue the run.
    pub fn resume(table: TransitionTable, snapshot: &Snapshot) -> Result<Self, RunError> {
        let mut tape = Tape::from_cells(snapshot.tape.chars().collect());
        tape.set_head(snapshot.head)?;

        let mut machine = Self::at(table, tape, &snapshot.state)?;
        machine.step_count = snapshot.step;
        Ok(machine)
    }

    fn positioned(table: TransitionTable, tape: Tape, state: Arc<State>) -> Self {
        Self {
            table,
            state,
            tape,
            status: Status::Idle,
            step_count: 0,
            trace: Vec::new(),
            trace_limit: None,
        }
    }

    /// Keeps at most `limit` snapshots in the trace, dropping the oldest first. `Some(0)` turns
    /// the trace off and `None`, the default, keeps every snapshot.
    ///
    /// An unbounded trace grows by one full-tape snapshot per step, so hosts running machines
    /// that may never halt should set a limit.
    pub fn set_trace_limit(&mut self, limit: Option<usize>) {
        self.trace_limit = limit;
        if let Some(limit) = limit {
            let excess = self.trace.len().saturating_sub(limit);
            self.trace.drain(..excess);
        }
    }

    pub fn trace_limit(&self) -> Option<usize> {
        self.trace_limit
    }

    /// Executes a single step.
    ///
    /// Reads the symbol under the head, finds the rule of the current state reading exactly that
    /// symbol, writes its symbol (if any), moves the head and enters the rule's target.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if the step was performed; a snapshot is appended to the trace.
    /// * `Step::Halt(Halt::Accepted)` if the current state is final.
    /// * `Step::Halt(Halt::Err(_))` if no rule matches or the head would leave the tape. The
    ///   machine keeps its last valid configuration and reports the same error until it is
    ///   reset or edited.
    pub fn step(&mut self) -> Step {
        if let Status::Halted(halt) = &self.status {
            return Step::Halt(halt.clone());
        }

        if self.state.is_final {
            return self.halt(Halt::Accepted);
        }

        let transition = match self.transition().cloned() {
            Some(t) => t,
            None => {
                return self.halt(Halt::Err(RunError::NoMatchingRule {
                    state: self.state.id.clone(),
                    symbol: self.tape.read(),
                }))
            }
        };

        if let Err(e) = self.tape.apply(transition.write, transition.direction) {
            return self.halt(Halt::Err(e));
        }

        self.state = transition.target;
        self.step_count += 1;
        self.status = Status::Running;

        let snapshot = self.snapshot();
        debug!(
            step = snapshot.step,
            state = %snapshot.state,
            head = snapshot.head,
            "Step"
        );
        self.record(snapshot);

        Step::Continue
    }

    /// Runs the machine until it halts, waiting `pacing.delay()` after every step.
    ///
    /// `on_snapshot` sees each snapshot as soon as its step completes. Dropping the returned
    /// future cancels the run between two steps; the machine keeps the configuration of the last
    /// completed step, and calling `run` again continues from there.
    pub async fn run<F>(&mut self, pacing: Pacing, mut on_snapshot: F) -> Halt
    where
        F: FnMut(&Snapshot),
    {
        let delay = pacing.delay();

        loop {
            match self.step() {
                Step::Continue => {
                    on_snapshot(&self.snapshot());
                    tokio::time::sleep(delay).await;
                }
                Step::Halt(halt) => return halt,
            }
        }
    }

    /// Runs the machine without pacing, giving up after `max_steps` steps.
    ///
    /// Hitting the limit does not halt the machine: calling `run_blocking` again continues the
    /// run.
    pub fn run_blocking(&mut self, max_steps: usize) -> Halt {
        let mut steps = 0;

        loop {
            let halted = matches!(self.status, Status::Halted(_));
            if steps == max_steps && !halted && !self.state.is_final {
                let error = RunError::StepLimitExceeded(max_steps);
                warn!("Machine stopped: {}", error);
                return Halt::Err(error);
            }

            match self.step() {
                Step::Continue => steps += 1,
                Step::Halt(halt) => return halt,
            }
        }
    }

    /// Moves the head back to the first cell and the state back to the unique start state.
    /// The tape contents are kept.
    pub fn reset(&mut self) -> Result<(), RunError> {
        self.state = self.table.unique_start()?.clone();
        self.tape.set_head(0)?;
        self.rewind();
        self.trace.clear();
        self.step_count = 0;
        Ok(())
    }

    /// Replaces the tape and clears any halt.
    pub fn set_tape(&mut self, tape: Tape) {
        self.tape = tape;
        self.rewind();
    }

    /// Overwrites one cell and clears any halt.
    pub fn set_symbol(&mut self, index: usize, symbol: char) -> Result<(), RunError> {
        self.tape.set_symbol(index, symbol)?;
        self.rewind();
        Ok(())
    }

    /// Moves the head and clears any halt.
    pub fn set_head(&mut self, index: usize) -> Result<(), RunError> {
        self.tape.set_head(index)?;
        self.rewind();
        Ok(())
    }

    /// Makes `state` the current state and clears any halt.
    pub fn set_state(&mut self, state: &str) -> Result<(), RunError> {
        self.state = self
            .table
            .state(state)
            .cloned()
            .ok_or_else(|| RunError::UnknownState(state.to_string()))?;
        self.rewind();
        Ok(())
    }

    /// Returns the current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn head(&self) -> usize {
        self.tape.head()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Returns the total number of steps executed since the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the snapshots of every step executed since the last reset.
    pub fn trace(&self) -> &[Snapshot] {
        &self.trace
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns the current configuration as a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            state: self.state.id.clone(),
            tape: self.tape.to_string(),
            head: self.tape.head(),
        }
    }

    /// Finds the rule of the current state for the symbol under the head.
    pub fn transition(&self) -> Option<&Transition> {
        self.table.find(&self.state.id, self.tape.read())
    }

    fn halt(&mut self, halt: Halt) -> Step {
        match &halt {
            Halt::Accepted => info!(
                "Machine accepted in state {} after {} steps",
                self.state.id, self.step_count
            ),
            Halt::Err(e) => warn!("Machine halted in state {}: {}", self.state.id, e),
        }

        self.status = Status::Halted(halt.clone());
        Step::Halt(halt)
    }

    fn record(&mut self, snapshot: Snapshot) {
        match self.trace_limit {
            Some(0) => {}
            Some(limit) if self.trace.len() >= limit => {
                self.trace.remove(0);
                self.trace.push(snapshot);
            }
            _ => self.trace.push(snapshot),
        }
    }

    fn rewind(&mut self) {
        self.status = Status::Idle;
    }
}
