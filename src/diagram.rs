//! This module defines `Diagram`, the authoring form of a machine: the states and labeled edges
//! the editor draws. It provides the editing operations the editor needs and keeps the edge set
//! consistent with the state set.

use crate::allocator::next_state_id;
use crate::types::{DiagramError, Edge, Position, State, DEFAULT_EDGE_LABEL};
use serde::{Deserialize, Serialize};

/// A machine as drawn: a set of states and a set of labeled edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn new(states: Vec<State>, edges: Vec<Edge>) -> Self {
        Self { states, edges }
    }

    /// The machine a fresh editor starts with: `1` (start) → `2` → `3` (final), every edge
    /// moving right over blanks.
    pub fn starter() -> Self {
        let mut states = vec![
            State::new("1").start(),
            State::new("2"),
            State::new("3").accepting(),
        ];
        for (i, state) in states.iter_mut().enumerate() {
            state.position = Position {
                x: -200.0 + 200.0 * i as f64,
                y: 0.0,
            };
        }

        Self {
            states,
            edges: vec![
                Edge::new("1", "2", DEFAULT_EDGE_LABEL),
                Edge::new("2", "3", DEFAULT_EDGE_LABEL),
            ],
        }
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Returns the edge from `source` to `target`, if the two states are connected.
    pub fn edge_between(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Returns every state flagged as start.
    pub fn start_states(&self) -> Vec<&State> {
        self.states.iter().filter(|s| s.is_start).collect()
    }

    /// Returns the id the next created state will get.
    pub fn next_id(&self) -> String {
        next_state_id(self.states.iter().map(|s| s.id.as_str()))
    }

    /// Creates a plain state at `position` with the smallest free identifier.
    pub fn add_state(&mut self, position: Position) -> &State {
        let mut state = State::new(self.next_id());
        state.position = position;

        self.states.push(state);
        &self.states[self.states.len() - 1]
    }

    /// Deletes a state together with every edge that starts or ends at it.
    pub fn remove_state(&mut self, id: &str) -> Result<State, DiagramError> {
        let index = self
            .states
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DiagramError::UnknownState(id.to_string()))?;

        self.edges.retain(|e| e.source != id && e.target != id);
        Ok(self.states.remove(index))
    }

    /// Connects two existing states with an edge carrying the default `_,_,>` label.
    ///
    /// A pair of states holds at most one edge per direction; further rules between them belong
    /// in that edge's label.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<&Edge, DiagramError> {
        for id in [source, target] {
            if self.state(id).is_none() {
                return Err(DiagramError::UnknownState(id.to_string()));
            }
        }

        if self.edge_between(source, target).is_some() {
            return Err(DiagramError::DuplicateEdge {
                from: source.to_string(),
                to: target.to_string(),
            });
        }

        self.edges
            .push(Edge::new(source, target, DEFAULT_EDGE_LABEL));
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Replaces the rule list of an edge.
    pub fn set_label(&mut self, edge: &str, label: impl Into<String>) -> Result<(), DiagramError> {
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.id == edge)
            .ok_or_else(|| DiagramError::UnknownEdge(edge.to_string()))?;

        edge.label = label.into();
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, DiagramError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DiagramError::UnknownEdge(id.to_string()))?;

        Ok(self.edges.remove(index))
    }

    /// Sets the start flag of a state. Other states keep their flags; the engine rejects
    /// diagrams that end up with more than one start state.
    pub fn set_start(&mut self, id: &str, is_start: bool) -> Result<(), DiagramError> {
        self.state_mut(id)?.is_start = is_start;
        Ok(())
    }

    /// Flags `id` as the only start state.
    pub fn make_sole_start(&mut self, id: &str) -> Result<(), DiagramError> {
        self.state_mut(id)?;
        for state in &mut self.states {
            state.is_start = state.id == id;
        }
        Ok(())
    }

    pub fn set_final(&mut self, id: &str, is_final: bool) -> Result<(), DiagramError> {
        self.state_mut(id)?.is_final = is_final;
        Ok(())
    }

    fn state_mut(&mut self, id: &str) -> Result<&mut State, DiagramError> {
        self.states
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DiagramError::UnknownState(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::edge_id;

    #[test]
    fn test_starter_machine() {
        let diagram = Diagram::starter();

        assert_eq!(diagram.states.len(), 3);
        assert_eq!(diagram.start_states().len(), 1);
        assert!(diagram.state("3").unwrap().is_final);
        assert_eq!(diagram.edge("e1-2").unwrap().label, "_,_,>");
        assert_eq!(diagram.edge("e2-3").unwrap().label, "_,_,>");
    }

    #[test]
    fn test_add_state_reuses_freed_ids() {
        let mut diagram = Diagram::starter();
        diagram.remove_state("2").unwrap();

        let created = diagram.add_state(Position { x: 5.0, y: 6.0 });
        assert_eq!(created.id, "2");
        assert!(!created.is_start && !created.is_final);

        assert_eq!(diagram.add_state(Position::default()).id, "4");
    }

    #[test]
    fn test_remove_state_cascades_to_edges() {
        let mut diagram = Diagram::starter();
        diagram.connect("3", "1").unwrap();

        let removed = diagram.remove_state("1").unwrap();

        assert_eq!(removed.id, "1");
        assert_eq!(diagram.edges.len(), 1);
        assert_eq!(diagram.edges[0].id, "e2-3");
    }

    #[test]
    fn test_remove_unknown_state() {
        let mut diagram = Diagram::starter();
        assert_eq!(
            diagram.remove_state("9"),
            Err(DiagramError::UnknownState("9".to_string()))
        );
    }

    #[test]
    fn test_connect_uses_default_label_and_rejects_duplicates() {
        let mut diagram = Diagram::starter();

        let edge = diagram.connect("2", "2").unwrap();
        assert_eq!(edge.id, edge_id("2", "2"));
        assert_eq!(edge.label, DEFAULT_EDGE_LABEL);

        assert_eq!(
            diagram.connect("1", "2").unwrap_err(),
            DiagramError::DuplicateEdge {
                from: "1".to_string(),
                to: "2".to_string(),
            }
        );
        assert!(diagram.connect("1", "7").is_err());
    }

    #[test]
    fn test_set_label_and_remove_edge() {
        let mut diagram = Diagram::starter();

        diagram.set_label("e1-2", "a,b,>;b,<").unwrap();
        assert_eq!(diagram.edge("e1-2").unwrap().label, "a,b,>;b,<");

        diagram.remove_edge("e1-2").unwrap();
        assert!(diagram.edge("e1-2").is_none());
        assert!(diagram.set_label("e1-2", "x").is_err());
    }

    #[test]
    fn test_start_and_final_flags() {
        let mut diagram = Diagram::starter();

        diagram.set_start("2", true).unwrap();
        assert_eq!(diagram.start_states().len(), 2);

        diagram.make_sole_start("3").unwrap();
        let starts = diagram.start_states();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].id, "3");

        diagram.set_final("3", false).unwrap();
        assert!(!diagram.state("3").unwrap().is_final);
    }

    #[test]
    fn test_json_shape() {
        let diagram = Diagram::starter();
        let json = serde_json::to_string(&diagram).unwrap();
        let back: Diagram = serde_json::from_str(&json).unwrap();

        assert_eq!(back, diagram);
        assert!(json.contains("\"isStart\":true"));
    }
}
