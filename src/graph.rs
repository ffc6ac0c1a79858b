//! Editable bipartite display graph.

use serde::Serialize;
use std::fmt;

/// Horizontal position of the agent column.
pub const AGENT_COLUMN_X: f64 = 0.0;
/// Horizontal position of the resource column.
pub const RESOURCE_COLUMN_X: f64 = 400.0;
/// Vertical distance between consecutive nodes of a column.
pub const ROW_SPACING: f64 = 150.0;

/// Reference to a scenario entity, as carried by a node or a connection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityRef {
    Agent(String),
    Resource(String),
}

impl EntityRef {
    pub fn agent(id: impl Into<String>) -> Self {
        Self::Agent(id.into())
    }

    pub fn resource(id: impl Into<String>) -> Self {
        Self::Resource(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Agent(id) | Self::Resource(id) => id,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent(_))
    }

    fn same_role(&self, other: &Self) -> bool {
        self.is_agent() == other.is_agent()
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent(id) => write!(f, "agent {id}"),
            Self::Resource(id) => write!(f, "resource {id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Position of the `ordinal`-th node (starting at 1) of the column `entity` belongs to.
    pub fn in_column(entity: &EntityRef, ordinal: usize) -> Self {
        let x = if entity.is_agent() {
            AGENT_COLUMN_X
        } else {
            RESOURCE_COLUMN_X
        };
        Self {
            x,
            y: ordinal as f64 * ROW_SPACING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub entity: EntityRef,
    pub position: Position,
}

/// Access edge. The source is always an agent and the target always a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn source_ref(&self) -> EntityRef {
        EntityRef::Agent(self.source.clone())
    }

    pub fn target_ref(&self) -> EntityRef {
        EntityRef::Resource(self.target.clone())
    }

    pub fn touches(&self, entity: &EntityRef) -> bool {
        match entity {
            EntityRef::Agent(id) => &self.source == id,
            EntityRef::Resource(id) => &self.target == id,
        }
    }
}

/// Nodes and edges shown to the user while editing a scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, entity: &EntityRef) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.entity == entity)
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.node(entity).is_some()
    }

    pub fn n_agents(&self) -> usize {
        self.nodes.iter().filter(|node| node.entity.is_agent()).count()
    }

    pub fn n_resources(&self) -> usize {
        self.nodes.len() - self.n_agents()
    }

    /// Append a node for `entity` at the bottom of its column.
    pub fn push_node(&mut self, entity: EntityRef) {
        let ordinal = self
            .nodes
            .iter()
            .filter(|node| node.entity.same_role(&entity))
            .count()
            + 1;
        let position = Position::in_column(&entity, ordinal);
        self.nodes.push(Node { entity, position });
    }

    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Remove the node of `entity` together with every edge touching it.
    pub fn remove_node(&mut self, entity: &EntityRef) {
        self.nodes.retain(|node| &node.entity != entity);
        self.edges.retain(|edge| !edge.touches(entity));
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}
