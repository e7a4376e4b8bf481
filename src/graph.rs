//! Declarative graph data and the node table built from it
//!
//! A [`GraphSpec`] is what the embedding application hands over: a list of
//! named nodes, each naming the nodes it attaches to. [`Graph::build`] turns
//! it into an index-addressed node table with resolved relations. Relations
//! to names that were never declared are dropped with a [`Diagnostic`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GraphResult, load_file};

/// Declarative description of a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique name, also the key other nodes use in `attach`
    pub name: String,

    /// Free text shown by the embedding page when the node is selected
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Relative visual size; the pickable cube has an edge of `0.4 * size`
    #[serde(default = "default_size")]
    pub size: f32,

    /// CSS-style color string, interpreted by the render layer
    #[serde(default)]
    pub color: String,

    /// Names of nodes this node is connected to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attach: Vec<String>,
}

fn default_size() -> f32 {
    1.0
}

impl NodeSpec {
    /// Create a node spec with default size and no relations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            size: default_size(),
            color: String::new(),
            attach: Vec::new(),
        }
    }

    /// Add relations to the named nodes
    pub fn attached_to<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach.extend(targets.into_iter().map(Into::into));
        self
    }
}

/// Complete declarative graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    pub nodes: Vec<NodeSpec>,
}

impl GraphSpec {
    /// Load a graph declaration from a `.yaml`, `.yml` or `.json` file
    ///
    /// Both a bare list of nodes and a `{ nodes: [...] }` document are accepted.
    pub fn load(path: &Path) -> GraphResult<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Wrapped(GraphSpec),
            Bare(Vec<NodeSpec>),
        }

        Ok(match load_file::<Document>(path)? {
            Document::Wrapped(spec) => spec,
            Document::Bare(nodes) => GraphSpec { nodes },
        })
    }
}

/// Stable index of a node in the node table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the table: its declaration and current position
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub spec: NodeSpec,
    pub position: Vec3,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// A resolved relation between two nodes of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub source: NodeId,
    pub target: NodeId,
}

/// Non-fatal problems found while building a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A node attaches to a name that no node declares; the relation is dropped
    UnknownRelationTarget { source: String, target: String },
    /// Two nodes share a name; lookups by name resolve to the later one
    DuplicateNodeName { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownRelationTarget { source, target } => {
                write!(f, "node '{source}' attaches to missing node '{target}'")
            }
            Diagnostic::DuplicateNodeName { name } => {
                write!(f, "node name '{name}' is declared more than once")
            }
        }
    }
}

/// Index-addressed node table with resolved relations
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    relations: Vec<Relation>,
    by_name: HashMap<String, NodeId>,
    diagnostics: Vec<Diagnostic>,
}

impl Graph {
    /// Build the node table, placing nodes on a sphere of `initial_radius`
    ///
    /// Relations whose target is not declared are skipped and reported.
    pub fn build(spec: &GraphSpec, initial_radius: f32) -> Self {
        let total = spec.nodes.len();
        let mut graph = Graph::default();

        for (i, node_spec) in spec.nodes.iter().enumerate() {
            let id = NodeId(i);
            if graph.by_name.insert(node_spec.name.clone(), id).is_some() {
                warn!(name = %node_spec.name, "duplicate node name");
                graph.diagnostics.push(Diagnostic::DuplicateNodeName {
                    name: node_spec.name.clone(),
                });
            }
            graph.nodes.push(Node {
                id,
                spec: node_spec.clone(),
                position: fibonacci_point(i, total, initial_radius),
            });
        }

        for node in &graph.nodes {
            for target_name in &node.spec.attach {
                match graph.by_name.get(target_name) {
                    Some(&target) => graph.relations.push(Relation {
                        source: node.id,
                        target,
                    }),
                    None => {
                        warn!(
                            node = %node.spec.name,
                            target = %target_name,
                            "node attaches to missing node, relation dropped"
                        );
                        graph.diagnostics.push(Diagnostic::UnknownRelationTarget {
                            source: node.spec.name.clone(),
                            target: target_name.clone(),
                        });
                    }
                }
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Look up a node by its declared name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Relations resolved at build time
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Problems recorded while building
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Point `index` of `total` on a Fibonacci lattice sphere of `radius`
fn fibonacci_point(index: usize, total: usize, radius: f32) -> Vec3 {
    if radius == 0.0 || total == 0 {
        return Vec3::ZERO;
    }

    let golden_ratio = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let i = index as f32;
    let n = total as f32;

    let theta = 2.0 * std::f32::consts::PI * i / golden_ratio;
    let phi = (1.0 - 2.0 * (i + 0.5) / n).acos();

    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}
