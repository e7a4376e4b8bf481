//! Force-directed layout simulation
//!
//! Each step integrates pairwise repulsion, spring attraction along
//! relations, a pull toward the origin and an elastic pull toward the
//! pointer for dragged nodes. Velocities decay exponentially in time so the
//! result does not depend on the frame rate, only on elapsed time.

use std::collections::HashMap;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::SegmentTransform;
use crate::graph::{Graph, Node, NodeId};

/// Squared distance below which two nodes count as overlapping
const OVERLAP_EPSILON: f32 = 0.1;

/// Softening term added to the squared distance in the repulsion falloff
const REPULSION_SOFTENING: f32 = 0.1;

/// Scale applied to `center_gravity`
const CENTER_GRAVITY_SCALE: f32 = 0.01;

/// Configuration for the layout simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Strength of the mutual repulsion between every pair of nodes
    pub repulsion: f32,
    /// Rest length of relation springs
    pub spring_length: f32,
    /// Spring constant of relation springs
    pub spring_strength: f32,
    /// Pull toward the origin
    pub center_gravity: f32,
    /// How hard a dragged node chases the pointer
    pub drag_strength: f32,
    /// Exponential velocity decay rate per time unit
    pub drag_coefficient: f32,
    /// Speed limit applied after damping
    pub max_velocity: f32,
    /// Longest time step integrated at once
    pub max_step: f32,
    /// Radius of the sphere nodes start on
    ///
    /// The default of 2 spreads nodes out before the first step. With 0 every
    /// node starts at the origin and the overlap tie-break pulls them apart.
    pub initial_radius: f32,
    /// Seed for the overlap tie-break; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion: 15.0,
            spring_length: 1.5,
            spring_strength: 5.0,
            center_gravity: 150.0,
            drag_strength: 15.0,
            drag_coefficient: 5.0,
            max_velocity: 20.0,
            max_step: 0.05,
            initial_radius: 2.0,
            seed: None,
        }
    }
}

/// Receives the placement of a relation's connecting segment every step
pub trait SegmentHandle {
    fn set_transform(&mut self, transform: &SegmentTransform);
}

impl SegmentHandle for SegmentTransform {
    fn set_transform(&mut self, transform: &SegmentTransform) {
        *self = *transform;
    }
}

/// A spring between two nodes plus the visual that spans it
#[derive(Debug, Clone)]
pub struct Connection<H> {
    pub source: NodeId,
    pub target: NodeId,
    pub handle: H,
}

/// CPU force simulation over a node table
pub struct Simulation<H: SegmentHandle = SegmentTransform> {
    graph: Graph,
    velocities: Vec<Vec3>,
    connections: Vec<Connection<H>>,
    /// Node -> the point the pointer currently holds it toward
    drag_targets: HashMap<NodeId, Vec3>,
    config: LayoutConfig,
    rng: StdRng,
}

impl<H: SegmentHandle> Simulation<H> {
    /// Create a simulation over `graph` with no connections registered
    pub fn new(graph: Graph, config: LayoutConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            velocities: vec![Vec3::ZERO; graph.len()],
            graph,
            connections: Vec::new(),
            drag_targets: HashMap::new(),
            config,
            rng,
        }
    }

    /// Register a spring between two nodes; unknown ids are ignored
    pub fn add_relation(&mut self, source: NodeId, target: NodeId, handle: H) {
        if self.graph.node(source).is_none() || self.graph.node(target).is_none() {
            debug!(%source, %target, "ignoring relation with unknown endpoint");
            return;
        }
        self.connections.push(Connection {
            source,
            target,
            handle,
        });
    }

    /// Bind a node to a pointer target; the node keeps its momentum
    pub fn drag_to(&mut self, node: NodeId, target: Vec3) {
        if self.graph.node(node).is_some() {
            self.drag_targets.insert(node, target);
        }
    }

    /// Drop a node's drag binding
    pub fn release(&mut self, node: NodeId) {
        self.drag_targets.remove(&node);
    }

    pub fn is_dragged(&self, node: NodeId) -> bool {
        self.drag_targets.contains_key(&node)
    }

    pub fn drag_target(&self, node: NodeId) -> Option<Vec3> {
        self.drag_targets.get(&node).copied()
    }

    /// Move a node to `position` and stop it
    pub fn set_position(&mut self, node: NodeId, position: Vec3) {
        if let Some(n) = self.graph.node_mut(node) {
            n.position = position;
            self.velocities[node.index()] = Vec3::ZERO;
        }
    }

    /// Zero every velocity and clear drag bindings
    pub fn reset(&mut self) {
        self.velocities.fill(Vec3::ZERO);
        self.drag_targets.clear();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.config
    }

    pub fn connections(&self) -> &[Connection<H>] {
        &self.connections
    }

    pub fn position(&self, node: NodeId) -> Option<Vec3> {
        self.graph.node(node).map(|n| n.position)
    }

    pub fn velocity(&self, node: NodeId) -> Option<Vec3> {
        self.velocities.get(node.index()).copied()
    }

    /// Sum of `0.5 * |v|^2` over all nodes (unit mass)
    pub fn kinetic_energy(&self) -> f32 {
        self.velocities
            .iter()
            .map(|v| 0.5 * v.length_squared())
            .sum()
    }

    /// Advance every node by one step of `delta` time units
    pub fn update(&mut self, delta: f32) {
        let dt = delta.max(0.0).min(self.config.max_step);

        self.apply_repulsion(dt);
        self.apply_springs(dt);
        self.apply_center_gravity(dt);
        self.apply_drag_forces(dt);
        self.integrate(dt);
        self.update_connections();

        trace!(dt, energy = self.kinetic_energy(), "layout step");
    }

    fn apply_repulsion(&mut self, dt: f32) {
        let n = self.graph.len();
        let nodes = self.graph.nodes();

        for i in 0..n {
            for j in (i + 1)..n {
                let mut diff = nodes[i].position - nodes[j].position;
                let dist_sq = diff.length_squared();

                // Overlapping nodes get a random separation direction
                if dist_sq < OVERLAP_EPSILON {
                    diff = random_unit_vector(&mut self.rng);
                }

                let force = diff.normalize_or_zero() * (self.config.repulsion * dt)
                    / (dist_sq + REPULSION_SOFTENING);

                self.velocities[i] += force;
                self.velocities[j] -= force;
            }
        }
    }

    fn apply_springs(&mut self, dt: f32) {
        let nodes = self.graph.nodes();

        for conn in &self.connections {
            let (source, target) = (conn.source.index(), conn.target.index());

            let diff = nodes[target].position - nodes[source].position;
            let displacement = diff.length() - self.config.spring_length;
            let force =
                diff.normalize_or_zero() * (displacement * self.config.spring_strength * dt);

            self.velocities[source] += force;
            self.velocities[target] -= force;
        }
    }

    fn apply_center_gravity(&mut self, dt: f32) {
        let strength = self.config.center_gravity * dt * CENTER_GRAVITY_SCALE;

        for (node, velocity) in self.graph.nodes().iter().zip(&mut self.velocities) {
            *velocity += (Vec3::ZERO - node.position) * strength;
        }
    }

    fn apply_drag_forces(&mut self, dt: f32) {
        for (&node, &target) in &self.drag_targets {
            let Some(position) = self.graph.node(node).map(|n| n.position) else {
                continue;
            };
            let Some(velocity) = self.velocities.get_mut(node.index()) else {
                continue;
            };

            // Hooke's law: the farther from the pointer, the stronger the pull
            *velocity += (target - position) * (self.config.drag_strength * dt);
        }
    }

    fn integrate(&mut self, dt: f32) {
        let friction = (-self.config.drag_coefficient * dt).exp();
        let max_velocity = self.config.max_velocity;

        for (i, velocity) in self.velocities.iter_mut().enumerate() {
            *velocity = (*velocity * friction).clamp_length_max(max_velocity);
            if let Some(node) = self.graph.node_mut(NodeId(i)) {
                node.position += *velocity * dt;
            }
        }
    }

    fn update_connections(&mut self) {
        let nodes = self.graph.nodes();

        for conn in &mut self.connections {
            let start = nodes[conn.source.index()].position;
            let end = nodes[conn.target.index()].position;
            conn.handle.set_transform(&SegmentTransform::spanning(start, end));
        }
    }
}

impl Simulation<SegmentTransform> {
    /// Build a simulation with one connection per relation of `graph`
    pub fn from_graph(graph: Graph, config: LayoutConfig) -> Self {
        let relations = graph.relations().to_vec();
        let mut sim = Self::new(graph, config);

        for relation in relations {
            let start = sim.nodes()[relation.source.index()].position;
            let end = sim.nodes()[relation.target.index()].position;
            sim.add_relation(
                relation.source,
                relation.target,
                SegmentTransform::spanning(start, end),
            );
        }
        sim
    }
}

fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
        );
        if v.length_squared() > 1e-6 {
            return v.normalize();
        }
    }
}
