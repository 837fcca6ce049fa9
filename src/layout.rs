//! The seam to the graph-layout collaborator that positions decoded diagrams.

use crate::diagram::Diagram;
use crate::types::Position;
use std::collections::HashMap;

/// Positions the nodes of a directed graph.
///
/// Implementations receive node identifiers and the directed edge list only; any layered or DAG
/// layout fits. Nodes missing from the returned map keep their current position.
pub trait Layout {
    fn arrange(&self, nodes: &[&str], edges: &[(&str, &str)]) -> HashMap<String, Position>;
}

/// A layout that leaves every node where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unarranged;

impl Layout for Unarranged {
    fn arrange(&self, _nodes: &[&str], _edges: &[(&str, &str)]) -> HashMap<String, Position> {
        HashMap::new()
    }
}

/// Runs `layout` over `diagram` and stores the positions it returns.
pub fn apply(layout: &dyn Layout, diagram: &mut Diagram) {
    let positions = {
        let nodes: Vec<&str> = diagram.states.iter().map(|s| s.id.as_str()).collect();
        let edges: Vec<(&str, &str)> = diagram
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        layout.arrange(&nodes, &edges)
    };

    for state in &mut diagram.states {
        if let Some(position) = positions.get(&state.id) {
            state.position = *position;
        }
    }
}
